//! Criteria catalogue, loaded once at startup from a JSON file.
//!
//! Every entry must carry `qualityLevels` and ids must be unique; anything
//! else aborts startup rather than serving undefined grades later.

use std::{collections::HashSet, path::Path};

use tracing::{debug, info, instrument};

use crate::classify::{obligation, Obligation};
use crate::domain::Criterion;
use crate::error::CatalogueError;

#[derive(Clone, Debug, Default)]
pub struct Catalogue {
  all: Vec<Criterion>,
  mandatory: Vec<Criterion>,
}

impl Catalogue {
  #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
  pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogueError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    // Criterion validation (missing qualityLevels) surfaces as a parse error.
    let criteria: Vec<Criterion> = serde_json::from_str(&raw).map_err(|source| CatalogueError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    let catalogue = Self::from_criteria(criteria)?;
    info!(
      target: "catalogue",
      total = catalogue.all.len(),
      mandatory = catalogue.mandatory.len(),
      "Loaded criteria catalogue"
    );
    Ok(catalogue)
  }

  pub fn from_criteria(criteria: Vec<Criterion>) -> Result<Self, CatalogueError> {
    let mut seen = HashSet::new();
    for c in &criteria {
      if c.id.trim().is_empty() {
        return Err(CatalogueError::Configuration("criterion with empty id".into()));
      }
      if !seen.insert(c.id.as_str()) {
        return Err(CatalogueError::Configuration(format!("duplicate criterion id {:?}", c.id)));
      }
    }

    let mandatory: Vec<Criterion> = criteria
      .iter()
      .filter(|c| obligation(&c.id) == Obligation::Mandatory)
      .cloned()
      .collect();
    for c in &mandatory {
      debug!(target: "catalogue", id = %c.id, "mandatory criterion");
    }

    Ok(Self { all: criteria, mandatory })
  }

  pub fn all(&self) -> &[Criterion] {
    &self.all
  }

  /// Criteria every new project starts with.
  pub fn mandatory(&self) -> &[Criterion] {
    &self.mandatory
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  fn write_catalogue(json: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(json.as_bytes()).unwrap();
    f
  }

  const CATALOGUE: &str = r#"[
    {"id": "A01", "title": "Auftrag", "question": "?", "requirements": ["a", "b"],
     "qualityLevels": {"1": {"description": "d", "minRequirements": 1}}},
    {"id": "A13", "title": "Optional", "requirements": ["a"],
     "qualityLevels": {"1": {"minRequirements": 1}}},
    {"id": "Doc01", "title": "Doku", "requirements": ["a"], "checked": null,
     "qualityLevels": {}}
  ]"#;

  #[test]
  fn loads_and_splits_mandatory() {
    let f = write_catalogue(CATALOGUE);
    let cat = Catalogue::load(f.path()).unwrap();
    assert_eq!(cat.all().len(), 3);
    let ids: Vec<&str> = cat.mandatory().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["A01", "Doc01"]);
    assert!(cat.all()[2].checked.is_empty());
  }

  #[test]
  fn missing_quality_levels_is_fatal() {
    let f = write_catalogue(r#"[{"id": "A02", "requirements": ["a"]}]"#);
    let err = Catalogue::load(f.path()).unwrap_err();
    assert!(matches!(err, CatalogueError::Parse { .. }));
    assert!(err.to_string().contains("qualityLevels"), "{err}");
  }

  #[test]
  fn duplicate_ids_are_fatal() {
    let f = write_catalogue(
      r#"[{"id": "A01", "qualityLevels": {}}, {"id": "A01", "qualityLevels": {}}]"#,
    );
    assert!(matches!(
      Catalogue::load(f.path()),
      Err(CatalogueError::Configuration(_))
    ));
  }

  #[test]
  fn unreadable_file_is_reported() {
    let err = Catalogue::load("/definitely/not/here/criteria.json").unwrap_err();
    assert!(matches!(err, CatalogueError::Read { .. }));
  }
}
