//! Personal values: what the user holds to be worthwhile.
//!
//! Values stay separable from actions and goals; goals point at them through
//! [`GoalRelevance`](crate::goal::GoalRelevance) rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::ontology::{abstraction, standalone_graph};

/// How central a value is. Replaces a class hierarchy with a discriminator.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueLevel {
  /// Affirmed but not necessarily tracked.
  #[default]
  General,
  /// A small set of actionable values; goals and actions should reflect them.
  Major,
  /// Abstract, philosophical; rarely actionable on a daily scale.
  HighestOrder,
  /// A domain of life that motivates without being a value itself.
  LifeArea,
}

impl ValueLevel {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// A personal value. Abstraction with no basic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalValue {
  pub id:                 Uuid,
  pub title:              String,
  pub description:        Option<String>,
  pub notes:              Option<String>,
  pub log_time:           DateTime<Utc>,
  /// 1 is the highest priority, 100 the lowest.
  pub priority:           u8,
  pub level:              ValueLevel,
  /// e.g. "Health", "Career", "Relationships".
  pub life_domain:        String,
  /// How the value should show up in actions and goals; text or structured.
  pub alignment_guidance: Option<serde_json::Value>,
}

abstraction!(PersonalValue);
standalone_graph!(PersonalValue);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueFormData {
  pub title:              String,
  #[serde(default)]
  pub description:        Option<String>,
  #[serde(default)]
  pub notes:              Option<String>,
  #[serde(default = "default_priority")]
  pub priority:           u8,
  #[serde(default)]
  pub level:              ValueLevel,
  #[serde(default = "default_life_domain")]
  pub life_domain:        String,
  #[serde(default)]
  pub alignment_guidance: Option<serde_json::Value>,
}

fn default_priority() -> u8 { 50 }

fn default_life_domain() -> String { "General".to_owned() }

impl ValueFormData {
  pub fn new(title: impl Into<String>, level: ValueLevel) -> Self {
    Self {
      title: title.into(),
      description: None,
      notes: None,
      priority: default_priority(),
      level,
      life_domain: default_life_domain(),
      alignment_guidance: None,
    }
  }
}
