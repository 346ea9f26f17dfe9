//! Domain models: criteria with their quality-level gates, grade results, and
//! the stored IPA project document.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CriterionError;
use crate::project_id::ProjectId;

/// Missing and `null` both become the default value.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Gate for one quality level of a criterion.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityLevelSpec {
  #[serde(default, deserialize_with = "null_as_default")]
  pub description: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub min_requirements: u32,
  #[serde(default, deserialize_with = "null_as_default")]
  pub required_indexes: BTreeSet<u32>,
}

/// One gradeable requirement group, e.g. `A01` or `Doc03`.
///
/// Deserialization goes through [`RawCriterion`] so a criterion without
/// `qualityLevels` never exists as a value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCriterion")]
pub struct Criterion {
  pub id: String,
  pub title: String,
  pub question: String,
  pub requirements: Vec<String>,
  /// 1-based indexes of satisfied requirements.
  pub checked: BTreeSet<u32>,
  /// Keyed by level ("1", "2"; the catalogue may carry display-only "0"/"3").
  pub quality_levels: BTreeMap<String, QualityLevelSpec>,
  pub notes: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCriterion {
  id: String,
  #[serde(default, deserialize_with = "null_as_default")]
  title: String,
  #[serde(default, deserialize_with = "null_as_default")]
  question: String,
  #[serde(default, deserialize_with = "null_as_default")]
  requirements: Vec<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  checked: BTreeSet<u32>,
  #[serde(default)]
  quality_levels: Option<BTreeMap<String, QualityLevelSpec>>,
  #[serde(default, deserialize_with = "null_as_default")]
  notes: String,
}

impl TryFrom<RawCriterion> for Criterion {
  type Error = CriterionError;

  fn try_from(raw: RawCriterion) -> Result<Self, Self::Error> {
    let quality_levels = raw
      .quality_levels
      .ok_or_else(|| CriterionError::MissingQualityLevels(raw.id.clone()))?;
    Ok(Criterion {
      id: raw.id,
      title: raw.title,
      question: raw.question,
      requirements: raw.requirements,
      checked: raw.checked,
      quality_levels,
      notes: raw.notes,
    })
  }
}

/// Quality level reached by a single criterion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionGrade {
  pub criterion_id: String,
  pub criterion_title: String,
  pub quality_level: u8,
}

/// Grade and average quality level for one exam part.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeDetails {
  pub grade: f64,
  pub average_quality_level: f64,
  pub criterion_grades: Vec<CriterionGrade>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GradeResult {
  pub part1: GradeDetails,
  pub part2: GradeDetails,
}

/// Person data shared by create/update requests and stored projects.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonData {
  #[serde(default)] pub firstname: String,
  #[serde(default)] pub lastname: String,
  #[serde(default)] pub topic: String,
  #[serde(default)] pub date: String,
}

/// Stored project document. The password hash never leaves the server;
/// responses go through `protocol::ProjectOut`.
#[derive(Clone, Debug)]
pub struct IpaProject {
  pub id: ProjectId,
  pub person: PersonData,
  pub criteria: Vec<Criterion>,
  pub password_hash: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn criterion_without_quality_levels_is_rejected() {
    let json = r#"{"id":"A01","title":"t","requirements":["a"]}"#;
    let err = serde_json::from_str::<Criterion>(json).unwrap_err();
    assert!(err.to_string().contains("A01"), "{err}");

    let json = r#"{"id":"A02","requirements":["a"],"qualityLevels":null}"#;
    assert!(serde_json::from_str::<Criterion>(json).is_err());
  }

  #[test]
  fn null_collections_normalize_to_empty() {
    let json = r#"{
      "id": "Doc01",
      "title": "Docs",
      "question": "?",
      "requirements": ["a", "b"],
      "checked": null,
      "qualityLevels": {"1": {"description": "ok", "minRequirements": 1, "requiredIndexes": null}},
      "notes": null
    }"#;
    let c: Criterion = serde_json::from_str(json).unwrap();
    assert!(c.checked.is_empty());
    assert!(c.quality_levels["1"].required_indexes.is_empty());
    assert_eq!(c.quality_levels["1"].min_requirements, 1);
    assert_eq!(c.notes, "");
  }

  #[test]
  fn duplicate_checkmarks_collapse() {
    let json = r#"{"id":"A01","requirements":["a","b","c"],"checked":[1,1,2],"qualityLevels":{}}"#;
    let c: Criterion = serde_json::from_str(json).unwrap();
    assert_eq!(c.checked.len(), 2);
  }

  #[test]
  fn criterion_serializes_camel_case() {
    let json = r#"{"id":"A01","requirements":["a"],"checked":[1],"qualityLevels":{"2":{"minRequirements":1}}}"#;
    let c: Criterion = serde_json::from_str(json).unwrap();
    let v = serde_json::to_value(&c).unwrap();
    assert_eq!(v["qualityLevels"]["2"]["minRequirements"], 1);
    assert_eq!(v["qualityLevels"]["2"]["requiredIndexes"], serde_json::json!([]));
    assert_eq!(v["checked"], serde_json::json!([1]));
  }
}
