//! Measures: the catalog of units that targets and measurements refer to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ontology::{abstraction, standalone_graph};

/// A unit of measurement ("km", "hours", "pages"). Abstraction with no basic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
  pub id:           Uuid,
  pub title:        String,
  pub unit:         String,
  /// Free-form grouping, e.g. "distance", "time", "count".
  pub measure_type: String,
  pub description:  Option<String>,
  pub notes:        Option<String>,
  pub log_time:     DateTime<Utc>,
}

abstraction!(Measure);
standalone_graph!(Measure);

/// Caller-assembled input for the measure coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureFormData {
  pub title:        String,
  pub unit:         String,
  pub measure_type: String,
  #[serde(default)]
  pub description:  Option<String>,
  #[serde(default)]
  pub notes:        Option<String>,
}

impl MeasureFormData {
  pub fn new(
    title: impl Into<String>,
    unit: impl Into<String>,
    measure_type: impl Into<String>,
  ) -> Self {
    Self {
      title:        title.into(),
      unit:         unit.into(),
      measure_type: measure_type.into(),
      description:  None,
      notes:        None,
    }
  }
}
