use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload used for authentication. Attached to the request by the
/// auth gate after verification; never persisted server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,        // user ID
    pub username: String, // display name
    pub email: String,    // user email
    pub iat: usize,       // issued at (unix timestamp)
    pub exp: usize,       // expires at (unix timestamp)
}
