//! Application state: the criteria catalogue, the in-memory project store,
//! the identifier counter and the token signer.
//!
//! Projects are keyed by their integer identifier. The counter hands out
//! identifiers starting at 1 and refuses to go past the last display code.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::auth::TokenSigner;
use crate::catalogue::Catalogue;
use crate::config::AppConfig;
use crate::domain::{Criterion, IpaProject, PersonData};
use crate::error::{ApiError, ProjectIdError};
use crate::project_id::{ProjectId, MAX_PROJECT_ID};

#[derive(Clone)]
pub struct AppState {
    pub catalogue: Arc<Catalogue>,
    projects: Arc<RwLock<HashMap<u32, IpaProject>>>,
    counter: Arc<AtomicU32>,
    pub signer: TokenSigner,
    pub secure_cookie: bool,
}

impl AppState {
    #[instrument(level = "info", skip_all)]
    pub fn new(cfg: &AppConfig, catalogue: Catalogue) -> Self {
        info!(
            target: "ipa_backend",
            criteria = catalogue.all().len(),
            mandatory = catalogue.mandatory().len(),
            secure_cookie = cfg.secure_cookie,
            "Application state ready"
        );
        Self {
            catalogue: Arc::new(catalogue),
            projects: Arc::new(RwLock::new(HashMap::new())),
            counter: Arc::new(AtomicU32::new(0)),
            signer: TokenSigner::new(&cfg.token_secret),
            secure_cookie: cfg.secure_cookie,
        }
    }

    /// Next identifier. Monotonic; fails once every display code is taken.
    pub fn allocate_project_id(&self) -> Result<ProjectId, ProjectIdError> {
        let prev = self
            .counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < MAX_PROJECT_ID).then_some(n + 1)
            })
            .map_err(|n| ProjectIdError::OutOfRange(n.saturating_add(1)))?;
        ProjectId::new(prev + 1)
    }

    #[instrument(level = "debug", skip(self, project), fields(id = %project.id))]
    pub async fn insert_project(&self, project: IpaProject) {
        self.projects.write().await.insert(project.id.value(), project);
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_project(&self, id: ProjectId) -> Result<IpaProject, ApiError> {
        self.projects
            .read()
            .await
            .get(&id.value())
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Replace the person fields. Criteria and password stay untouched.
    #[instrument(level = "debug", skip(self, person), fields(%id))]
    pub async fn update_person_data(&self, id: ProjectId, person: PersonData) -> Result<IpaProject, ApiError> {
        let mut projects = self.projects.write().await;
        let project = projects.get_mut(&id.value()).ok_or_else(|| not_found(id))?;
        project.person = person;
        Ok(project.clone())
    }

    #[instrument(level = "debug", skip(self, criterion), fields(%id, criterion = %criterion.id))]
    pub async fn add_criterion(&self, id: ProjectId, criterion: Criterion) -> Result<(), ApiError> {
        let mut projects = self.projects.write().await;
        let project = projects.get_mut(&id.value()).ok_or_else(|| not_found(id))?;
        if project.criteria.iter().any(|c| c.id == criterion.id) {
            return Err(ApiError::Conflict(format!(
                "Criterion {} already exists in project {id}",
                criterion.id
            )));
        }
        project.criteria.push(criterion);
        Ok(())
    }

    /// Replace the criterion stored under `criterion_id`, keeping its position.
    #[instrument(level = "debug", skip(self, criterion), fields(%id, %criterion_id))]
    pub async fn update_criterion(
        &self,
        id: ProjectId,
        criterion_id: &str,
        criterion: Criterion,
    ) -> Result<(), ApiError> {
        let mut projects = self.projects.write().await;
        let project = projects.get_mut(&id.value()).ok_or_else(|| not_found(id))?;
        if criterion.id != criterion_id && project.criteria.iter().any(|c| c.id == criterion.id) {
            return Err(ApiError::Conflict(format!(
                "Criterion {} already exists in project {id}",
                criterion.id
            )));
        }
        let slot = project
            .criteria
            .iter_mut()
            .find(|c| c.id == criterion_id)
            .ok_or_else(|| ApiError::NotFound(format!("No criterion {criterion_id} in project {id}")))?;
        *slot = criterion;
        Ok(())
    }

    #[instrument(level = "debug", skip(self), fields(%id, %criterion_id))]
    pub async fn delete_criterion(&self, id: ProjectId, criterion_id: &str) -> Result<(), ApiError> {
        let mut projects = self.projects.write().await;
        let project = projects.get_mut(&id.value()).ok_or_else(|| not_found(id))?;
        let before = project.criteria.len();
        project.criteria.retain(|c| c.id != criterion_id);
        if project.criteria.len() == before {
            return Err(ApiError::NotFound(format!("No criterion {criterion_id} in project {id}")));
        }
        Ok(())
    }
}

fn not_found(id: ProjectId) -> ApiError {
    ApiError::NotFound(format!("No IPA project found with id {id}"))
}
