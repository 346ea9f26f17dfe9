//! Auth guard for `/api/ipa/:id/...`.
//!
//! The token comes from the auth cookie, falling back to `Authorization:
//! Bearer`. It must be valid and issued for the project in the path. On
//! success the parsed `ProjectId` is stored as a request extension.

use std::{collections::HashMap, sync::Arc};

use axum::{
  extract::{Path, Request, State},
  http::{header, HeaderMap},
  middleware::Next,
  response::Response,
};
use tracing::{debug, warn};

use crate::auth::token_from_cookie_header;
use crate::error::ApiError;
use crate::project_id::ProjectId;
use crate::state::AppState;

fn request_token(headers: &HeaderMap) -> Result<String, ApiError> {
  let from_cookie = headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .find_map(token_from_cookie_header);
  if let Some(token) = from_cookie {
    return Ok(token.to_string());
  }

  let auth = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::Unauthorized("Authorization required".into()))?;
  auth
    .strip_prefix("Bearer ")
    .map(str::to_string)
    .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".into()))
}

pub async fn require_project_token(
  State(state): State<Arc<AppState>>,
  Path(params): Path<HashMap<String, String>>,
  mut request: Request,
  next: Next,
) -> Result<Response, ApiError> {
  let code = params
    .get("id")
    .ok_or_else(|| ApiError::BadRequest("Project id missing".into()))?;
  let id: ProjectId = code.parse()?;

  let token = request_token(request.headers())?;
  let token_code = state.signer.validate(&token).map_err(|e| {
    warn!(target: "auth", %id, error = %e, "token rejected");
    ApiError::Unauthorized("Invalid or expired token".into())
  })?;
  if token_code != code.as_str() {
    warn!(target: "auth", %id, token_for = %token_code, "token belongs to another project");
    return Err(ApiError::Forbidden("Token does not belong to this project".into()));
  }

  debug!(target: "auth", %id, "request authorized");
  request.extensions_mut().insert(id);
  Ok(next.run(request).await)
}
