//! Client configuration from the environment.

use std::time::Duration;

use thiserror::Error;

use firstshift_backend::RestConfig;
use firstshift_core::UserId;

pub const ENV_BACKEND_URL: &str = "FIRSTSHIFT_BACKEND_URL";
pub const ENV_ANON_KEY: &str = "FIRSTSHIFT_ANON_KEY";
pub const ENV_ACCESS_TOKEN: &str = "FIRSTSHIFT_ACCESS_TOKEN";
pub const ENV_USER_ID: &str = "FIRSTSHIFT_USER_ID";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "FIRSTSHIFT_REQUEST_TIMEOUT_SECS";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings needed to talk to the hosted backend as one signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub anon_key: String,
    pub access_token: String,
    pub user_id: UserId,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let backend_url = required(ENV_BACKEND_URL)?;
        if !(backend_url.starts_with("https://") || backend_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                name: ENV_BACKEND_URL,
                reason: "must start with http:// or https://".to_string(),
            });
        }

        let user_id = required(ENV_USER_ID)?
            .parse::<UserId>()
            .map_err(|e| ConfigError::Invalid {
                name: ENV_USER_ID,
                reason: e.to_string(),
            })?;

        let request_timeout = match lookup(ENV_REQUEST_TIMEOUT_SECS) {
            None => DEFAULT_REQUEST_TIMEOUT,
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: ENV_REQUEST_TIMEOUT_SECS,
                    reason: format!("'{raw}' is not a whole number of seconds"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: ENV_REQUEST_TIMEOUT_SECS,
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
        };

        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            anon_key: required(ENV_ANON_KEY)?,
            access_token: required(ENV_ACCESS_TOKEN)?,
            user_id,
            request_timeout,
        })
    }

    pub fn rest_config(&self) -> RestConfig {
        RestConfig {
            base_url: self.backend_url.clone(),
            anon_key: self.anon_key.clone(),
            access_token: self.access_token.clone(),
            user_id: self.user_id,
            timeout: self.request_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: Vec<(&'static str, String)>) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<&'static str, String> = pairs.into_iter().collect();
        move |name: &str| map.get(name).cloned()
    }

    fn complete(user_id: &str) -> Vec<(&'static str, String)> {
        vec![
            (ENV_BACKEND_URL, "https://abc.example.co/".to_string()),
            (ENV_ANON_KEY, "anon-key".to_string()),
            (ENV_ACCESS_TOKEN, "access-token".to_string()),
            (ENV_USER_ID, user_id.to_string()),
        ]
    }

    #[test]
    fn reads_complete_configuration() {
        let user = UserId::new();
        let pairs = complete(&user.to_string());
        let cfg = ClientConfig::from_lookup(lookup(pairs.clone())).unwrap();

        assert_eq!(cfg.backend_url, "https://abc.example.co");
        assert_eq!(cfg.user_id, user);
        assert_eq!(cfg.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(cfg.rest_config().anon_key, "anon-key");
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let err = ClientConfig::from_lookup(lookup(vec![(ENV_BACKEND_URL, "https://x.example".to_string())])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_USER_ID));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let user = UserId::new().to_string();
        let mut pairs = complete(&user);
        pairs[2].1 = "   ".to_string();
        let err = ClientConfig::from_lookup(lookup(pairs.clone())).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_ACCESS_TOKEN));
    }

    #[test]
    fn rejects_non_http_url_and_bad_user_id() {
        let user = UserId::new().to_string();
        let mut pairs = complete(&user);
        pairs[0].1 = "ftp://abc".to_string();
        assert!(matches!(
            ClientConfig::from_lookup(lookup(pairs.clone())),
            Err(ConfigError::Invalid { name: ENV_BACKEND_URL, .. })
        ));

        let pairs = complete("not-a-uuid");
        assert!(matches!(
            ClientConfig::from_lookup(lookup(pairs.clone())),
            Err(ConfigError::Invalid { name: ENV_USER_ID, .. })
        ));
    }

    #[test]
    fn parses_request_timeout() {
        let user = UserId::new().to_string();
        let mut pairs = complete(&user);
        pairs.push((ENV_REQUEST_TIMEOUT_SECS, "5".to_string()));
        let cfg = ClientConfig::from_lookup(lookup(pairs.clone())).unwrap();
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));

        pairs.pop();
        pairs.push((ENV_REQUEST_TIMEOUT_SECS, "0".to_string()));
        assert!(ClientConfig::from_lookup(lookup(pairs.clone())).is_err());
    }
}
