//! Bodies of the RPC-style endpoints

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CheckUserRequest {
    pub client_id: String,
    pub message_id: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckUserResponse {
    pub exists: bool,
}
