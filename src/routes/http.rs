//! HTTP endpoint handlers. These are thin wrappers that forward to state and
//! core logic. Routes under `/api/ipa/:id` receive the `ProjectId` checked by
//! the auth guard.

use std::sync::Arc;

use axum::{
  extract::{rejection::JsonRejection, Path, State},
  http::{header, StatusCode},
  response::IntoResponse,
  Extension, Json,
};
use tracing::{info, instrument};

use crate::auth::{auth_cookie, clear_cookie};
use crate::domain::{Criterion, PersonData};
use crate::error::ApiError;
use crate::logic::{create_project, login, project_grade};
use crate::project_id::ProjectId;
use crate::protocol::*;
use crate::state::AppState;

/// Turn axum's JSON rejection into our `{ "error": .. }` 400.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  payload
    .map(|Json(v)| v)
    .map_err(|e| ApiError::BadRequest(format!("Invalid input: {}", e.body_text())))
}

pub async fn http_version() -> &'static str { env!("CARGO_PKG_VERSION") }

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_catalogue(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.catalogue.all().to_vec())
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_post_project(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<CreateProjectIn>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let input = body(payload)?;
  let (project, token) = create_project(&state, input.person, &input.password).await?;
  Ok((
    [(header::SET_COOKIE, auth_cookie(&token, state.secure_cookie))],
    Json(ProjectOut::from(&project)),
  ))
}

#[instrument(level = "info", skip(state, payload))]
pub async fn http_post_login(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<LoginIn>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let input = body(payload)?;
  let (project, token) = login(&state, &input.id, &input.password).await?;
  Ok((
    [(header::SET_COOKIE, auth_cookie(&token, state.secure_cookie))],
    Json(LoginOut { project: ProjectOut::from(&project) }),
  ))
}

#[instrument(level = "info")]
pub async fn http_post_logout() -> impl IntoResponse {
  (
    [(header::SET_COOKIE, clear_cookie())],
    Json(MessageOut { message: "Logged out".into() }),
  )
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_project(
  State(state): State<Arc<AppState>>,
  Extension(id): Extension<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
  let project = state.get_project(id).await?;
  Ok(Json(ProjectOut::from(&project)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_project_criteria(
  State(state): State<Arc<AppState>>,
  Extension(id): Extension<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
  let project = state.get_project(id).await?;
  Ok(Json(project.criteria))
}

#[instrument(level = "info", skip(state, payload), fields(%id))]
pub async fn http_post_criterion(
  State(state): State<Arc<AppState>>,
  Extension(id): Extension<ProjectId>,
  payload: Result<Json<Criterion>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let criterion = body(payload)?;
  state.add_criterion(id, criterion.clone()).await?;
  info!(target: "ipa_backend", %id, criterion = %criterion.id, "criterion added");
  Ok((StatusCode::CREATED, Json(criterion)))
}

#[instrument(level = "info", skip(state, payload), fields(%id, %criterion_id))]
pub async fn http_put_criterion(
  State(state): State<Arc<AppState>>,
  Extension(id): Extension<ProjectId>,
  Path((_, criterion_id)): Path<(String, String)>,
  payload: Result<Json<Criterion>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let criterion = body(payload)?;
  state.update_criterion(id, &criterion_id, criterion.clone()).await?;
  Ok(Json(criterion))
}

#[instrument(level = "info", skip(state), fields(%id, %criterion_id))]
pub async fn http_delete_criterion(
  State(state): State<Arc<AppState>>,
  Extension(id): Extension<ProjectId>,
  Path((_, criterion_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
  state.delete_criterion(id, &criterion_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_person_data(
  State(state): State<Arc<AppState>>,
  Extension(id): Extension<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
  let project = state.get_project(id).await?;
  Ok(Json(PersonDataOut::from(&project)))
}

#[instrument(level = "info", skip(state, payload), fields(%id))]
pub async fn http_put_person_data(
  State(state): State<Arc<AppState>>,
  Extension(id): Extension<ProjectId>,
  payload: Result<Json<PersonData>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let person = body(payload)?;
  let project = state.update_person_data(id, person).await?;
  Ok(Json(PersonDataOut::from(&project)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_grade(
  State(state): State<Arc<AppState>>,
  Extension(id): Extension<ProjectId>,
) -> Result<impl IntoResponse, ApiError> {
  Ok(Json(project_grade(&state, id).await?))
}
