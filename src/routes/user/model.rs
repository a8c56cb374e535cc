use serde::{Deserialize, Serialize};

use crate::user::{Sourced, User};

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub message: String,
    pub users: Vec<User>,
}

impl From<Sourced<Vec<User>>> for UsersResponse {
    fn from(sourced: Sourced<Vec<User>>) -> Self {
        Self {
            message: sourced.source.message().to_string(),
            users: sourced.data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub message: String,
}

impl DeleteUserResponse {
    pub fn deleted() -> Self {
        Self {
            message: "User deleted successfully and cache refreshed".to_string(),
        }
    }
}
