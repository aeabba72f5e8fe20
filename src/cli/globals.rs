use secrecy::SecretString;

/// Process-wide configuration, built once from the CLI/environment and
/// passed explicitly into the router. There is no ambient global lookup.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub secret: SecretString,
    pub origins: Vec<String>,
    pub token_ttl_seconds: i64,
    pub cookie_secure: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            origins: Vec::new(),
            token_ttl_seconds: crate::auth::DEFAULT_TOKEN_TTL_SECONDS,
            cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_origins(mut self, origins: Vec<String>) -> Self {
        self.origins = origins;
        self
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }
}
