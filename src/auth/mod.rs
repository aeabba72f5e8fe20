//! Authentication and authorization core: password hashing, token
//! issuance/verification, credential resolution and access checks.

pub mod password;
pub mod session;
pub mod token;

use crate::cli::globals::GlobalArgs;
use secrecy::ExposeSecret;
use token::TokenSigner;

pub const SESSION_COOKIE_NAME: &str = "appunti_session";
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 30 * 60;

/// Read-only authentication state shared by all request handlers.
#[derive(Clone)]
pub struct AuthState {
    signer: TokenSigner,
    cookie_secure: bool,
}

impl AuthState {
    #[must_use]
    pub fn new(signer: TokenSigner, cookie_secure: bool) -> Self {
        Self {
            signer,
            cookie_secure,
        }
    }

    #[must_use]
    pub fn from_globals(globals: &GlobalArgs) -> Self {
        Self::new(
            TokenSigner::new(globals.secret.expose_secret(), globals.token_ttl_seconds),
            globals.cookie_secure,
        )
    }

    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}
