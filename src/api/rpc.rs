//! RPC endpoints called by the Data Collector

use axum::extract::State;
use tracing::debug;

use crate::domain::idempotency::{IdempotencyKey, StoredResponse};
use crate::domain::DomainError;

use super::state::{AppState, UserServiceTrait};
use super::types::{ApiError, CheckUserRequest, CheckUserResponse, Json};
use super::users::warn_uncached;

/// POST /rpc/check-user
///
/// Deduplicated on `(client_id, message_id)`. Storage failures are returned
/// as errors and never cached, so a retry asks the store again.
pub async fn check_user(
    State(state): State<AppState>,
    Json(request): Json<CheckUserRequest>,
) -> Result<Json<CheckUserResponse>, ApiError> {
    let key = IdempotencyKey::new(request.client_id, request.message_id)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let service = &state.user_service;
    let email = &request.email;

    let execution = state
        .executor
        .execute(&key, || async move {
            let exists = service
                .exists(email)
                .await
                .inspect_err(|e| warn_uncached("check_user", e))?;
            Ok::<_, DomainError>(StoredResponse::check_user(exists))
        })
        .await?;

    match execution.response {
        StoredResponse::CheckUser { exists } => {
            debug!(
                client_id = %key.caller_id(),
                message_id = %key.request_id(),
                exists,
                replayed = execution.replayed,
                "CheckUser answered"
            );
            Ok(Json(CheckUserResponse { exists }))
        }
        StoredResponse::Http { .. } => Err(ApiError::conflict(
            "message_id was already used for a different operation",
        )
        .with_param("message_id")),
    }
}
