//! Configuration loading using Figment.
//!
//! Sources, lowest priority first: built-in defaults, an optional TOML file,
//! then `ONDO_`-prefixed environment variables with `__` separating nested
//! keys (`ONDO_CREDENTIALS__API_KEY`, `ONDO_EXECUTION__CONTINUE_ON_FAIL`).
//! Defaults come from `#[serde(default)]` rather than a serialized provider
//! because credential keys accept both `apiKey` and `api_key` spellings.

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::credentials::{CredentialStore, Credentials, StaticCredentials};
use crate::error::{ApiError, ConfigError};

pub const ENV_PREFIX: &str = "ONDO_";

/// Execution-wide switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Tolerant mode: record item failures instead of aborting.
    pub continue_on_fail: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub credentials: Credentials,
    pub execution: ExecutionSettings,
}

impl Settings {
    /// Load from environment variables only.
    pub fn load() -> Result<Self, ConfigError> {
        Self::extract(Figment::new())
    }

    /// Load from a TOML file (skipped if it does not exist), then apply
    /// environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
        } else {
            tracing::debug!("No configuration file at {}", path.display());
        }
        Self::extract(Figment::new().merge(Toml::file(path)))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let settings = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(settings)
    }
}

impl CredentialStore for Settings {
    fn credentials(&self, type_name: &str) -> Result<Credentials, ApiError> {
        StaticCredentials(self.credentials.clone()).credentials(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Environment, CREDENTIAL_TYPE};
    use figment::Jail;

    #[test]
    fn defaults_are_strict_without_credentials() {
        let settings = Settings::default();
        assert!(!settings.execution.continue_on_fail);
        assert!(settings.credentials(CREDENTIAL_TYPE).is_err());
    }

    #[test]
    fn toml_file_populates_credentials() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "ondo.toml",
                r#"
[credentials]
api_key = "file-key"
base_url = "https://sandbox.ondo.finance"
environment = "sandbox"

[execution]
continue_on_fail = true
"#,
            )?;

            let settings = Settings::load_from("ondo.toml").unwrap();
            assert!(settings.execution.continue_on_fail);
            let credentials = settings.credentials(CREDENTIAL_TYPE).unwrap();
            assert_eq!(credentials.api_key, "file-key");
            assert_eq!(credentials.base_url, "https://sandbox.ondo.finance");
            assert_eq!(credentials.environment, Environment::Sandbox);
            Ok(())
        });
    }

    #[test]
    fn camel_case_credential_keys_are_accepted() {
        Jail::expect_with(|jail| {
            jail.create_file("ondo.toml", "[credentials]\napiKey = \"camel-key\"")?;

            let settings = Settings::load_from("ondo.toml").unwrap();
            assert_eq!(settings.credentials.api_key, "camel-key");
            assert_eq!(settings.credentials.environment, Environment::Production);
            Ok(())
        });
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_| {
            let settings = Settings::load_from("absent.toml").unwrap();
            assert_eq!(settings, Settings::default());
            Ok(())
        });
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        Jail::expect_with(|jail| {
            jail.create_file("ondo.toml", "[execution]\ncontinue_on_fail = \"sometimes\"")?;
            assert!(Settings::load_from("ondo.toml").is_err());
            Ok(())
        });
    }

    #[test]
    fn environment_variables_configure_everything() {
        Jail::expect_with(|jail| {
            jail.set_env("ONDO_CREDENTIALS__API_KEY", "env-key");
            jail.set_env("ONDO_CREDENTIALS__BASE_URL", "http://127.0.0.1:3000");
            jail.set_env("ONDO_CREDENTIALS__ENVIRONMENT", "sandbox");
            jail.set_env("ONDO_EXECUTION__CONTINUE_ON_FAIL", "true");

            let settings = Settings::load().unwrap();
            assert_eq!(settings.credentials.api_key, "env-key");
            assert_eq!(settings.credentials.base_url, "http://127.0.0.1:3000");
            assert_eq!(settings.credentials.environment, Environment::Sandbox);
            assert!(settings.execution.continue_on_fail);
            Ok(())
        });
    }

    #[test]
    fn all_digit_api_key_from_environment_stays_a_string() {
        Jail::expect_with(|jail| {
            jail.set_env("ONDO_CREDENTIALS__API_KEY", "12345");

            let settings = Settings::load().unwrap();
            assert_eq!(settings.credentials(CREDENTIAL_TYPE).unwrap().api_key, "12345");
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_the_file() {
        Jail::expect_with(|jail| {
            jail.create_file("ondo.toml", "[credentials]\napi_key = \"file-key\"")?;
            jail.set_env("ONDO_CREDENTIALS__API_KEY", "env-key");

            let settings = Settings::load_from("ondo.toml").unwrap();
            assert_eq!(settings.credentials.api_key, "env-key");
            Ok(())
        });
    }
}
