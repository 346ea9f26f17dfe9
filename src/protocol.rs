//! Public HTTP request/response structs (serde ready, camelCase on the wire).

use serde::{Deserialize, Serialize};

use crate::domain::{Criterion, IpaProject, PersonData};
use crate::project_id::ProjectId;

/// Full project as returned to its owner.
#[derive(Debug, Serialize)]
pub struct ProjectOut {
    pub id: ProjectId,
    #[serde(flatten)]
    pub person: PersonData,
    pub criteria: Vec<Criterion>,
}

impl From<&IpaProject> for ProjectOut {
    fn from(p: &IpaProject) -> Self {
        Self {
            id: p.id,
            person: p.person.clone(),
            criteria: p.criteria.clone(),
        }
    }
}

/// Project without its criteria.
#[derive(Debug, Serialize)]
pub struct PersonDataOut {
    pub id: ProjectId,
    #[serde(flatten)]
    pub person: PersonData,
}

impl From<&IpaProject> for PersonDataOut {
    fn from(p: &IpaProject) -> Self {
        Self {
            id: p.id,
            person: p.person.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectIn {
    #[serde(flatten)]
    pub person: PersonData,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginIn {
    pub id: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginOut {
    pub project: ProjectOut,
}

#[derive(Serialize)]
pub struct MessageOut {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
