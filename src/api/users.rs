//! User registration and deletion endpoints

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::domain::idempotency::{IdempotencyKey, ResponseStore, StoredResponse};
use crate::domain::DomainError;
use crate::infrastructure::idempotency::Execution;
use crate::infrastructure::user::{RegisterUserRequest, RegistrationOutcome};

use super::state::{AppState, UserServiceTrait};
use super::types::{
    parse_json, ApiError, DeleteUserBody, DeleteUserResponse, Json, RegisterUserBody,
    RegistrationResponse,
};

pub const REQUEST_ID_HEADER: &str = "request-id";
pub const CALLER_ID_HEADER: &str = "x-caller-id";
/// Set to `true` on responses served from the idempotency cache
pub const REPLAYED_HEADER: &str = "idempotent-replayed";

/// POST /users
///
/// The body is only parsed when the key misses: a retry of a request that was
/// already answered gets the stored response whatever body it carries.
pub async fn register_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request_id = header_value(&headers, REQUEST_ID_HEADER).ok_or_else(|| {
        ApiError::bad_request("Missing Request-ID header").with_param("Request-ID")
    })?;
    let key = idempotency_key(&state, &headers, request_id)?;

    let service = state.user_service.clone();

    let execution = state
        .executor
        .execute(&key, move || async move {
            let body: RegisterUserBody = parse_json(&body)?;
            let email = body.email.clone();
            let request = RegisterUserRequest {
                email: body.email,
                password: body.password,
                first_name: body.first_name,
                last_name: body.last_name,
            };

            let outcome = service
                .register(request)
                .await
                .inspect_err(|e| warn_uncached("registration", e))?;

            Ok::<_, ApiError>(registration_response(&outcome, &email))
        })
        .await?;

    if execution.replayed {
        info!(
            caller_id = %key.caller_id(),
            request_id = %key.request_id(),
            "Duplicate registration request answered from cache"
        );
    }

    replay_http(execution)
}

/// DELETE /users
pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<DeleteUserBody>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let removed = state
        .user_service
        .delete(&body.email, &body.password)
        .await?;

    if !removed {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    // The registration may be retried under the same Request-ID later; it must
    // run again instead of replaying the stale "created" answer
    let cache_evicted = match header_value(&headers, REQUEST_ID_HEADER) {
        Some(request_id) => match idempotency_key(&state, &headers, request_id) {
            Ok(key) => state.response_cache.evict(&key),
            Err(_) => false,
        },
        None => false,
    };

    match state.data_collector.delete_user_data(&body.email).await {
        Ok(success) => info!(email = %body.email, success, "Data Collector notified"),
        Err(e) => warn!(email = %body.email, error = %e, "Failed to notify Data Collector"),
    }

    info!(email = %body.email, cache_evicted, "User deleted");

    Ok(Json(DeleteUserResponse {
        message: "User deleted".to_string(),
        email: body.email,
        cache_evicted,
    }))
}

/// Transient failures are worth a warning: the caller is expected to retry
pub(super) fn warn_uncached(operation: &'static str, error: &DomainError) {
    if error.is_transient() {
        warn!(operation, error = %error, "Operation failed, response not cached");
    }
}

fn registration_response(outcome: &RegistrationOutcome, email: &str) -> StoredResponse {
    let (status, body) = match outcome {
        RegistrationOutcome::Created(_) => {
            (StatusCode::CREATED, RegistrationResponse::completed(email))
        }
        RegistrationOutcome::AlreadyRegistered => {
            (StatusCode::OK, RegistrationResponse::already_registered(email))
        }
    };

    StoredResponse::http(
        status.as_u16(),
        serde_json::json!({ "message": body.message, "email": body.email }),
    )
}

fn replay_http(execution: Execution) -> Result<Response, ApiError> {
    let StoredResponse::Http { status, body } = execution.response else {
        return Err(ApiError::conflict(
            "Request-ID was already used for a different operation",
        )
        .with_param("Request-ID"));
    };

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, Json(body)).into_response();

    if execution.replayed {
        response.headers_mut().insert(
            HeaderName::from_static(REPLAYED_HEADER),
            HeaderValue::from_static("true"),
        );
    }

    Ok(response)
}

fn idempotency_key(
    state: &AppState,
    headers: &HeaderMap,
    request_id: String,
) -> Result<IdempotencyKey, ApiError> {
    let caller_id =
        header_value(headers, CALLER_ID_HEADER).unwrap_or_else(|| state.default_caller_id.clone());

    IdempotencyKey::new(caller_id, request_id).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Trimmed, non-empty header value
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_ignores_blank() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("   "));
        headers.insert(CALLER_ID_HEADER, HeaderValue::from_static(" svcX "));

        assert_eq!(header_value(&headers, REQUEST_ID_HEADER), None);
        assert_eq!(header_value(&headers, CALLER_ID_HEADER).as_deref(), Some("svcX"));
    }

    #[test]
    fn test_registration_response_shapes() {
        let created = registration_response(
            &RegistrationOutcome::AlreadyRegistered,
            "mario@test.com",
        );

        assert_eq!(
            created,
            StoredResponse::http(
                200,
                serde_json::json!({
                    "message": "User already registered",
                    "email": "mario@test.com"
                })
            )
        );
    }

    #[test]
    fn test_replay_of_foreign_variant_conflicts() {
        let execution = Execution {
            response: StoredResponse::check_user(true),
            replayed: true,
        };

        let err = replay_http(execution).unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
