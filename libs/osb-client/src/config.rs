use std::fmt;
use std::time::Duration;

use crate::error::ClientError;
use crate::version::ApiVersion;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Basic auth credentials for a broker.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// How the client authenticates to the broker. Only basic auth exists today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    Basic(BasicAuthConfig),
}

/// TLS options handed to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
    /// Skip certificate verification.
    pub insecure: bool,
    /// Extra trusted CA, PEM encoded.
    pub ca_cert_pem: Option<Vec<u8>>,
}

/// Configuration of a broker client. Fixed for the client's lifetime.
#[derive(Debug, Clone)]
pub struct ClientConfiguration {
    /// Used in log messages and metrics; the broker's logical name is a good choice.
    pub name: String,
    pub url: String,
    /// Features adopted after 2.11 are only sent when this version supports them.
    pub api_version: ApiVersion,
    pub auth: Option<AuthConfig>,
    pub tls: TlsConfig,
    pub timeout: Duration,
    /// Send and return fields for features accepted into the OSB API but not
    /// yet part of a released version.
    pub enable_alpha_features: bool,
    /// Log raw response bodies at trace level.
    pub verbose: bool,
}

impl ClientConfiguration {
    /// Defaults: latest API version, 60s timeout, alpha features disabled.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            api_version: ApiVersion::LATEST,
            auth: None,
            tls: TlsConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            enable_alpha_features: false,
            verbose: false,
        }
    }

    #[must_use]
    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    #[must_use]
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthConfig::Basic(BasicAuthConfig {
            username: username.into(),
            password: password.into(),
        }));
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_alpha_features(mut self, enabled: bool) -> Self {
        self.enable_alpha_features = enabled;
        self
    }

    #[must_use]
    pub fn with_insecure_tls(mut self, insecure: bool) -> Self {
        self.tls.insecure = insecure;
        self
    }

    #[must_use]
    pub fn with_ca_cert_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.tls.ca_cert_pem = Some(pem.into());
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Create configuration from environment variables
    ///
    /// Expects:
    /// - `OSB_BROKER_URL`: broker base URL (required)
    /// - `OSB_BROKER_NAME`: display name (default: "broker")
    /// - `OSB_API_VERSION`: e.g. "2.13" (default: latest)
    /// - `OSB_TIMEOUT_SECONDS`: request timeout (default: 60)
    /// - `OSB_USERNAME` / `OSB_PASSWORD`: basic auth, both or neither
    /// - `OSB_INSECURE_SKIP_VERIFY`, `OSB_ENABLE_ALPHA_FEATURES`: "true"/"false"
    ///
    /// # Errors
    /// Returns `ClientError::BuildError` when a variable is missing or malformed.
    pub fn from_env() -> Result<Self, ClientError> {
        let url = std::env::var("OSB_BROKER_URL")
            .map_err(|_| ClientError::BuildError("OSB_BROKER_URL not set".into()))?;
        let name = std::env::var("OSB_BROKER_NAME").unwrap_or_else(|_| "broker".to_owned());

        let mut config = Self::new(name, url);

        if let Ok(v) = std::env::var("OSB_API_VERSION") {
            config.api_version = v.parse()?;
        }
        if let Ok(v) = std::env::var("OSB_TIMEOUT_SECONDS") {
            let secs: u64 = v.trim().parse().map_err(|e| {
                ClientError::BuildError(format!("invalid OSB_TIMEOUT_SECONDS '{v}': {e}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        match (std::env::var("OSB_USERNAME"), std::env::var("OSB_PASSWORD")) {
            (Ok(user), Ok(pass)) => config = config.with_basic_auth(user, pass),
            (Err(_), Err(_)) => {}
            _ => {
                return Err(ClientError::BuildError(
                    "OSB_USERNAME and OSB_PASSWORD must be set together".into(),
                ));
            }
        }

        config.tls.insecure = env_flag("OSB_INSECURE_SKIP_VERIFY")?;
        config.enable_alpha_features = env_flag("OSB_ENABLE_ALPHA_FEATURES")?;

        Ok(config)
    }
}

fn env_flag(key: &str) -> Result<bool, ClientError> {
    match std::env::var(key) {
        Err(_) => Ok(false),
        Ok(v) => v.trim().parse().map_err(|_| {
            ClientError::BuildError(format!("invalid {key} '{v}': expected true or false"))
        }),
    }
}
