//! API request, response and error types

pub mod error;
pub mod json;
pub mod rpc;
pub mod users;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::{parse_json, Json};
pub use rpc::{CheckUserRequest, CheckUserResponse};
pub use users::{DeleteUserBody, DeleteUserResponse, RegisterUserBody, RegistrationResponse};
