//! Credential issuance and verification

mod bearer;
mod credentials;
mod token;

pub use bearer::extract_bearer;
pub use credentials::authenticate;
pub use token::{ClaimSet, Claims, IssuedToken, TokenService};

/// Why a request could not be authenticated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing header")]
    MissingHeader,
    #[error("invalid scheme")]
    InvalidScheme,
    #[error("missing token")]
    MissingToken,
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("invalid credentials")]
    BadCredentials,
    #[error("{0}")]
    Signing(String),
}
