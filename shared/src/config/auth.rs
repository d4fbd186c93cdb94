//! Authentication configuration: signing key, token lifetimes and session cookies

use serde::{Deserialize, Serialize};

use super::{env_flag, env_value, ConfigError};

/// Minimum HMAC-SHA256 key length in bytes (256 bits)
pub const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted token or session lifetime (10 years)
pub const MAX_LIFETIME_SECONDS: i64 = 10 * 365 * 86_400;

const DEFAULT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT authentication configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens (UTF-8, at least 32 bytes)
    pub secret: String,

    /// JWT issuer claim, generally the API's domain
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// JWT audience claim, generally the client application's domain
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Access token expiry time in seconds
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,

    /// Renew the refresh token expiry on every rotation instead of keeping
    /// the absolute expiry set at login
    #[serde(default)]
    pub sliding_refresh_expiry: bool,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_token_expiry", &self.access_token_expiry)
            .field("refresh_token_expiry", &self.refresh_token_expiry)
            .field("sliding_refresh_expiry", &self.sliding_refresh_expiry)
            .finish()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            issuer: default_issuer(),
            audience: default_audience(),
            access_token_expiry: default_access_token_expiry(),
            refresh_token_expiry: default_refresh_token_expiry(),
            sliding_refresh_expiry: false,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set issuer and audience
    pub fn with_issuer_audience(mut self, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self.audience = audience.into();
        self
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes.saturating_mul(60);
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days.saturating_mul(86_400);
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }

    /// Validate key length and lifetimes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Invalid {
                field: "auth.jwt.secret".to_string(),
                message: format!(
                    "signing key must be at least {} bytes, got {}",
                    MIN_SECRET_BYTES,
                    self.secret.len()
                ),
            });
        }
        check_lifetime("auth.jwt.access_token_expiry", self.access_token_expiry)?;
        check_lifetime("auth.jwt.refresh_token_expiry", self.refresh_token_expiry)?;
        if self.refresh_token_expiry <= self.access_token_expiry {
            return Err(ConfigError::Invalid {
                field: "auth.jwt.refresh_token_expiry".to_string(),
                message: "must be longer than the access token expiry".to_string(),
            });
        }
        Ok(())
    }
}

/// Session cookie configuration for cookie-based sign-in
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Session cookie name
    pub cookie_name: String,

    /// Cookie path
    #[serde(default = "default_cookie_path")]
    pub path: String,

    /// Session cookie secure flag (HTTPS only)
    pub secure: bool,

    /// Session cookie SameSite attribute
    pub same_site: String,

    /// Session cookie HttpOnly flag
    #[serde(default = "default_http_only")]
    pub http_only: bool,

    /// Ticket lifetime in seconds when sign-in passes no expiration
    #[serde(default = "default_session_lifetime")]
    pub lifetime: i64,
}

impl SessionConfig {
    /// Validate the ticket lifetime
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_lifetime("auth.session.lifetime", self.lifetime)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: String::from("reelauth_session"),
            path: default_cookie_path(),
            secure: false, // Set to true in production
            same_site: String::from("Lax"),
            http_only: default_http_only(),
            lifetime: default_session_lifetime(),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

impl AuthConfig {
    /// Create from environment variables
    ///
    /// Unset variables keep their defaults; a set but unparsable value is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut jwt = JwtConfig::default();
        if let Some(secret) = env_value("JWT_SECRET")? {
            jwt.secret = secret;
        }
        if let Some(issuer) = env_value("JWT_ISSUER")? {
            jwt.issuer = issuer;
        }
        if let Some(audience) = env_value("JWT_AUDIENCE")? {
            jwt.audience = audience;
        }
        if let Some(expiry) = env_value("JWT_ACCESS_TOKEN_EXPIRY")? {
            jwt.access_token_expiry = expiry;
        }
        if let Some(expiry) = env_value("JWT_REFRESH_TOKEN_EXPIRY")? {
            jwt.refresh_token_expiry = expiry;
        }
        if let Some(sliding) = env_flag("JWT_SLIDING_REFRESH")? {
            jwt.sliding_refresh_expiry = sliding;
        }

        let mut session = SessionConfig::default();
        if let Some(secure) = env_flag("SESSION_COOKIE_SECURE")? {
            session.secure = secure;
        }
        if let Some(lifetime) = env_value("SESSION_LIFETIME")? {
            session.lifetime = lifetime;
        }

        Ok(Self { jwt, session })
    }

    /// Validate both sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()?;
        self.session.validate()
    }
}

fn check_lifetime(field: &str, seconds: i64) -> Result<(), ConfigError> {
    if (1..=MAX_LIFETIME_SECONDS).contains(&seconds) {
        return Ok(());
    }
    Err(ConfigError::Invalid {
        field: field.to_string(),
        message: format!("must be between 1 and {} seconds, got {}", MAX_LIFETIME_SECONDS, seconds),
    })
}

fn default_issuer() -> String {
    String::from("reelauth-api")
}

fn default_audience() -> String {
    String::from("reelauth-client")
}

fn default_access_token_expiry() -> i64 {
    300 // 5 minutes
}

fn default_refresh_token_expiry() -> i64 {
    604800 // 7 days
}

fn default_cookie_path() -> String {
    String::from("/")
}

fn default_http_only() -> bool {
    true
}

fn default_session_lifetime() -> i64 {
    1209600 // 14 days
}
