use serde::Deserialize;
use stack_string::StackString;
use std::{ops::Deref, path::Path, sync::Arc};

use crate::errors::HealthError as Error;

pub const DEFAULT_GOOGLE_FIT_API_URL: &str = "https://www.googleapis.com/fitness/v1";
pub const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_GOOGLE_REDIRECT_URL: &str = "https://developers.google.com/oauthplayground";
pub const DEFAULT_APPLICATION_NAME: &str = "AppleHealth2GoogleFit";

/// `HealthConfig` holds configuration information which can be set either
/// through environment variables or the config.env file, see the dotenvy crate
/// for more information about the config file format.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HealthConfigInner {
    pub google_client_id: Option<StackString>,
    pub google_client_secret: Option<StackString>,
    pub google_project_number: Option<StackString>,
    pub google_fit_api_url: StackString,
    pub google_auth_url: StackString,
    pub google_token_url: StackString,
    pub google_redirect_url: StackString,
    pub application_name: StackString,
    pub device_manufacturer: StackString,
    pub device_model: StackString,
    pub device_uid: StackString,
    pub device_version: StackString,
}

impl Default for HealthConfigInner {
    fn default() -> Self {
        Self {
            google_client_id: None,
            google_client_secret: None,
            google_project_number: None,
            google_fit_api_url: DEFAULT_GOOGLE_FIT_API_URL.into(),
            google_auth_url: DEFAULT_GOOGLE_AUTH_URL.into(),
            google_token_url: DEFAULT_GOOGLE_TOKEN_URL.into(),
            google_redirect_url: DEFAULT_GOOGLE_REDIRECT_URL.into(),
            application_name: DEFAULT_APPLICATION_NAME.into(),
            device_manufacturer: DEFAULT_APPLICATION_NAME.into(),
            device_model: DEFAULT_APPLICATION_NAME.into(),
            device_uid: "AP2GF".into(),
            device_version: "1.0".into(),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct HealthConfig(Arc<HealthConfigInner>);

impl HealthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pull configuration from a file if it exists,
    /// first look for the file passed in, then try
    /// `${HOME}/.config/apple_health_google_fit/config.env`,
    /// then a config.env file in the current directory.
    /// # Errors
    /// Return error if the config directory can't be determined or an
    /// environment variable fails to deserialize
    pub fn get_config(fname: Option<&Path>) -> Result<Self, Error> {
        let config_dir = dirs::config_dir().ok_or(Error::StaticCustomError("No CONFIG directory"))?;
        let default_fname = config_dir
            .join("apple_health_google_fit")
            .join("config.env");

        let env_file = match fname {
            Some(fname) if fname.exists() => fname,
            _ => &default_fname,
        };

        dotenvy::dotenv().ok();

        if env_file.exists() {
            dotenvy::from_path(env_file).ok();
        } else if Path::new("config.env").exists() {
            dotenvy::from_filename("config.env").ok();
        }

        let conf: HealthConfigInner = envy::from_env()?;
        Ok(Self(Arc::new(conf)))
    }

    /// Build a config from explicit `(NAME, value)` pairs instead of the
    /// process environment.
    /// # Errors
    /// Return error if a value fails to deserialize
    pub fn from_vars<I>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let conf: HealthConfigInner = envy::from_iter(vars)?;
        Ok(Self(Arc::new(conf)))
    }
}

impl Deref for HealthConfig {
    type Target = HealthConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Take the command line value if present, otherwise fall back on the
/// configured one.
/// # Errors
/// Return `MissingConfig` naming the environment variable if neither is set
pub fn flag_or_config(
    flag: Option<StackString>,
    config_value: Option<&StackString>,
    name: &'static str,
) -> Result<StackString, Error> {
    flag.filter(|s| !s.as_str().is_empty())
        .or_else(|| config_value.filter(|s| !s.as_str().is_empty()).cloned())
        .ok_or(Error::MissingConfig(name))
}

#[cfg(test)]
mod tests {
    use stack_string::StackString;

    use crate::{
        errors::HealthError,
        health_config::{flag_or_config, HealthConfig, DEFAULT_GOOGLE_FIT_API_URL},
    };

    #[test]
    fn test_flag_or_config() {
        let configured: StackString = "from-env".into();
        let value = flag_or_config(Some("from-flag".into()), Some(&configured), "X").unwrap();
        assert_eq!(value.as_str(), "from-flag");
        let value = flag_or_config(None, Some(&configured), "X").unwrap();
        assert_eq!(value.as_str(), "from-env");
        let value = flag_or_config(Some("".into()), Some(&configured), "X").unwrap();
        assert_eq!(value.as_str(), "from-env");
        let err = flag_or_config(None, None, "GOOGLE_CLIENT_ID").unwrap_err();
        assert!(matches!(err, HealthError::MissingConfig("GOOGLE_CLIENT_ID")));
    }

    #[test]
    fn test_from_vars_defaults() {
        let config = HealthConfig::from_vars(Vec::new()).unwrap();
        assert_eq!(config, HealthConfig::new());
        assert_eq!(config.google_fit_api_url.as_str(), DEFAULT_GOOGLE_FIT_API_URL);
        assert_eq!(config.device_uid.as_str(), "AP2GF");
        assert!(config.google_client_id.is_none());
    }
}
