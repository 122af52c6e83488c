use serde::{Deserialize, Serialize};

/// JWT payload used for authentication. The subject is the account email;
/// the caller is re-resolved from it on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // account email
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
}
