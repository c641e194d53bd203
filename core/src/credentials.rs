//! API credentials and the store that hands them out.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;
use crate::resource::Resource;

/// Credential type name the connector asks the store for.
pub const CREDENTIAL_TYPE: &str = "ondoFinanceApi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
}

/// `{apiKey, baseUrl, environment}`, resolved once per execution.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(default, alias = "api_key", deserialize_with = "string_or_number")]
    pub api_key: String,
    /// Empty means each resource uses its own default host.
    #[serde(default, alias = "base_url", deserialize_with = "string_or_number")]
    pub base_url: String,
    #[serde(default)]
    pub environment: Environment,
}

/// Env providers type-guess their values, so an all-digit key arrives as a
/// number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Flag(b) => b.to_string(),
    })
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("environment", &self.environment)
            .finish()
    }
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Base URL for `resource` with any trailing slash removed.
    pub fn base_url_for(&self, resource: Resource) -> &str {
        let configured = self.base_url.trim();
        let base = if configured.is_empty() {
            resource.default_base_url()
        } else {
            configured
        };
        base.trim_end_matches('/')
    }

    /// Fails when the API key is empty.
    pub fn validate(self) -> Result<Self, ApiError> {
        if self.api_key.trim().is_empty() {
            return Err(ApiError::MissingCredentials(format!(
                "{CREDENTIAL_TYPE} has no API key"
            )));
        }
        Ok(self)
    }
}

/// Host-side credential lookup.
pub trait CredentialStore {
    fn credentials(&self, type_name: &str) -> Result<Credentials, ApiError>;
}

/// A store holding a single credential set under `CREDENTIAL_TYPE`.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credentials);

impl CredentialStore for StaticCredentials {
    fn credentials(&self, type_name: &str) -> Result<Credentials, ApiError> {
        if type_name != CREDENTIAL_TYPE {
            return Err(ApiError::MissingCredentials(format!(
                "no credentials of type {type_name}"
            )));
        }
        self.0.clone().validate()
    }
}
