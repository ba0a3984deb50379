use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload asserting an account's identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,         // account ID
    pub email: String,
    pub full_name: String,
    pub iat: usize,        // issued at (unix timestamp)
    pub exp: usize,        // expires at (unix timestamp)
    pub iss: String,       // issuer
    pub aud: String,       // audience
}
