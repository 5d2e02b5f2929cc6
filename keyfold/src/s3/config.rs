use std::time::Duration;

use log::info;

use super::credentials::AwsCredentials;
use crate::{
    EnvironmentConfig, KeyfoldError, AWS_DEFAULT_REGION,
    DEFAULT_PAGE_TIMEOUT_SECS,
};

pub(crate) struct S3Config {
    pub credentials: AwsCredentials,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub page_timeout: Duration,
}

/// Resolves credentials, region and endpoint from the config map with
/// process environment as fallback. Missing credentials are a startup
/// error, not something to discover on the first browse request.
pub(crate) fn resolve_config(
    config: &EnvironmentConfig,
) -> Result<S3Config, KeyfoldError> {
    let region = config
        .get_or_env("AWS_REGION")
        .or_else(|| config.get_or_env("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|| AWS_DEFAULT_REGION.to_owned());
    info!("AWS_REGION used: {}", region);

    let access_key =
        config.get_or_env("AWS_ACCESS_KEY_ID").ok_or_else(|| {
            KeyfoldError::Config(
                "AWS_ACCESS_KEY_ID not found in the config and \
                 environment"
                    .to_string(),
            )
        })?;
    let secret_key =
        config.get_or_env("AWS_SECRET_ACCESS_KEY").ok_or_else(|| {
            KeyfoldError::Config(
                "AWS_SECRET_ACCESS_KEY not found in the config and \
                 environment"
                    .to_string(),
            )
        })?;
    let session_token = config.get_or_env("AWS_SESSION_TOKEN");

    let endpoint_url = config.get_or_env("S3_ENDPOINT_URL");

    let page_timeout = match config.get_or_env("KEYFOLD_PAGE_TIMEOUT_SECS")
    {
        Some(value) => {
            let secs = value.parse::<u64>().map_err(|_| {
                KeyfoldError::Config(format!(
                    "KEYFOLD_PAGE_TIMEOUT_SECS is not a number: {}",
                    value
                ))
            })?;
            Duration::from_secs(secs)
        }
        None => Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS),
    };

    Ok(S3Config {
        credentials: AwsCredentials::new(
            access_key,
            secret_key,
            session_token,
        ),
        region,
        endpoint_url,
        page_timeout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_credentials() -> EnvironmentConfig {
        let mut config = EnvironmentConfig::default();
        config.set(
            "AWS_ACCESS_KEY_ID".to_string(),
            "AKIDEXAMPLE".to_string(),
        );
        config.set(
            "AWS_SECRET_ACCESS_KEY".to_string(),
            "secret".to_string(),
        );
        config
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let mut config = EnvironmentConfig::default();
        // mask whatever the process environment carries
        config.set("AWS_SECRET_ACCESS_KEY".to_string(), "x".to_string());
        if std::env::var("AWS_ACCESS_KEY_ID").is_err() {
            assert!(matches!(
                resolve_config(&config),
                Err(KeyfoldError::Config(_))
            ));
        }
    }

    #[test]
    fn test_explicit_region_and_timeout() {
        let mut config = config_with_credentials();
        config.set("AWS_REGION".to_string(), "eu-west-1".to_string());
        config.set(
            "KEYFOLD_PAGE_TIMEOUT_SECS".to_string(),
            "5".to_string(),
        );
        let resolved = resolve_config(&config).unwrap();
        assert_eq!(resolved.region, "eu-west-1");
        assert_eq!(resolved.page_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let mut config = config_with_credentials();
        config.set(
            "KEYFOLD_PAGE_TIMEOUT_SECS".to_string(),
            "soon".to_string(),
        );
        assert!(matches!(
            resolve_config(&config),
            Err(KeyfoldError::Config(_))
        ));
    }
}
