//! Row-level graph operations, one [`GraphFamily`](crate::coordinator::GraphFamily)
//! per entity family.
//!
//! Each family reads its rows into `Raw*` structs of plain column values and
//! converts them afterwards, so decoding failures surface as store errors
//! rather than rusqlite ones.

use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{decode_uuid, encode_uuid},
};

mod action;
mod goal;
mod measure;
mod term;
mod value;

pub use action::ActionFamily;
pub use goal::GoalFamily;
pub use measure::MeasureFamily;
pub use term::TimePeriodFamily;
pub use value::ValueFamily;

/// Follow a basic's foreign key to its abstraction, or fail with
/// [`Error::NotFound`] naming `entity`.
fn abstraction_of(
  conn: &Connection,
  table: &str,
  column: &str,
  entity: &'static str,
  id: Uuid,
) -> Result<Uuid> {
  let raw: Option<String> = conn
    .query_row(
      &format!("SELECT {column} FROM {table} WHERE id = ?1"),
      rusqlite::params![encode_uuid(id)],
      |row| row.get(0),
    )
    .optional()?;
  match raw {
    Some(s) => decode_uuid(&s),
    None => Err(Error::not_found(entity, id)),
  }
}

/// An UPDATE or DELETE of a graph's root row touched nothing.
fn require_row(affected: usize, entity: &'static str, id: Uuid) -> Result<()> {
  if affected == 0 { Err(Error::not_found(entity, id)) } else { Ok(()) }
}
