//! Project workflows behind the HTTP handlers: creation, login and grading.
//! Handlers stay thin and forward here.

use tracing::{info, instrument, warn};

use crate::auth::{dummy_hash, hash_password, verify_password};
use crate::domain::{GradeResult, IpaProject, PersonData};
use crate::error::ApiError;
use crate::grade::calculate_grade;
use crate::project_id::ProjectId;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Create a project seeded with the mandatory criteria. Returns the stored
/// project and a fresh session token for it.
#[instrument(level = "info", skip(state, person, password))]
pub async fn create_project(
  state: &AppState,
  person: PersonData,
  password: &str,
) -> Result<(IpaProject, String), ApiError> {
  if password.is_empty() {
    return Err(ApiError::BadRequest("Password is required".into()));
  }

  let password = password.to_owned();
  let password_hash = run_blocking(move || hash_password(&password)).await?;
  let id = state.allocate_project_id()?;
  let project = IpaProject {
    id,
    person,
    criteria: state.catalogue.mandatory().to_vec(),
    password_hash,
  };
  state.insert_project(project.clone()).await;

  let token = state.signer.issue(&id.to_string());
  info!(target: "ipa_backend", %id, criteria = project.criteria.len(), "IPA project created");
  Ok((project, token))
}

/// Check a login request. Unknown ids and wrong passwords look the same to
/// the caller.
#[instrument(level = "info", skip(state, password), fields(%code))]
pub async fn login(state: &AppState, code: &str, password: &str) -> Result<(IpaProject, String), ApiError> {
  let Ok(id) = code.parse::<ProjectId>() else {
    warn!(target: "auth", %code, "login with malformed project id");
    return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
  };
  let project = match state.get_project(id).await {
    Ok(p) => p,
    Err(ApiError::NotFound(_)) => {
      // Same PBKDF2 cost as a wrong password.
      let password = password.to_owned();
      let _ = run_blocking(move || verify_password(&password, dummy_hash())).await?;
      warn!(target: "auth", %id, "login for unknown project");
      return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
    }
    Err(e) => return Err(e),
  };

  let password = password.to_owned();
  let stored = project.password_hash.clone();
  let ok = run_blocking(move || verify_password(&password, &stored))
    .await?
    .map_err(|e| ApiError::Internal(format!("Cannot check password: {e}")))?;
  if !ok {
    warn!(target: "auth", %id, "invalid password");
    return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
  }

  let token = state.signer.issue(&id.to_string());
  info!(target: "auth", %id, "login succeeded");
  Ok((project, token))
}

/// Password hashing is CPU bound; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
  F: FnOnce() -> T + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .map_err(|e| ApiError::Internal(format!("Password task failed: {e}")))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn project_grade(state: &AppState, id: ProjectId) -> Result<GradeResult, ApiError> {
  let project = state.get_project(id).await?;
  let result = calculate_grade(&project.criteria);
  info!(
    target: "grade",
    %id,
    part1 = result.part1.grade,
    part2 = result.part2.grade,
    "grade served"
  );
  Ok(result)
}
