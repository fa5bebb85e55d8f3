//! Composite reconciliation for graph updates.
//!
//! Existing composite rows are matched against the requested ones by natural
//! key (the endpoint that is not the graph's own record). Matched rows keep
//! their identifier and `created_at`.

use std::{collections::HashMap, hash::Hash};

/// The writes needed to turn one set of composite rows into another.
#[derive(Debug)]
pub struct Reconciliation<E, D> {
  /// Rows whose key is gone from the form; delete them.
  pub stale:   Vec<E>,
  /// Rows present on both sides with identical scalars; leave them alone.
  pub kept:    Vec<E>,
  /// Rows present on both sides whose scalars differ; update in place.
  pub changed: Vec<(E, D)>,
  /// Requested rows with no existing counterpart; insert them.
  pub added:   Vec<D>,
}

impl<E, D> Reconciliation<E, D> {
  pub fn trace(&self, composite: &'static str) {
    tracing::debug!(
      composite,
      stale = self.stale.len(),
      kept = self.kept.len(),
      changed = self.changed.len(),
      added = self.added.len(),
      "reconciled composites"
    );
  }
}

/// Plan the writes turning `existing` into `desired`.
///
/// A key repeated in `desired` is matched at most once; later repeats land in
/// `added` and are left for the UNIQUE constraint to reject.
pub fn reconcile<K, E, D>(
  existing: Vec<E>,
  desired: Vec<D>,
  existing_key: impl Fn(&E) -> K,
  desired_key: impl Fn(&D) -> K,
  unchanged: impl Fn(&E, &D) -> bool,
) -> Reconciliation<E, D>
where
  K: Eq + Hash,
{
  let index: HashMap<K, usize> = existing
    .iter()
    .enumerate()
    .map(|(i, e)| (existing_key(e), i))
    .collect();
  let mut slots: Vec<Option<E>> = existing.into_iter().map(Some).collect();

  let mut kept = Vec::new();
  let mut changed = Vec::new();
  let mut added = Vec::new();

  for d in desired {
    match index.get(&desired_key(&d)).and_then(|&i| slots[i].take()) {
      Some(e) if unchanged(&e, &d) => kept.push(e),
      Some(e) => changed.push((e, d)),
      None => added.push(d),
    }
  }

  Reconciliation {
    stale: slots.into_iter().flatten().collect(),
    kept,
    changed,
    added,
  }
}
