//! Resolution of named AWS profiles into explicit S3 credentials.
//!
//! `object_store` only reads credentials from the environment or instance
//! metadata, so a named profile is resolved through the AWS SDK config loader
//! and handed to the S3 builder explicitly.

use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;

use crate::error::StorageError;

#[derive(Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

/// Credentials and region resolved from a named profile.
#[derive(Debug, Clone)]
pub struct ProfileCredentials {
    pub credentials: StaticCredentials,
    pub region: Option<String>,
}

pub async fn resolve_profile(profile: &str) -> Result<ProfileCredentials, StorageError> {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .profile_name(profile)
        .load()
        .await;

    let provider = sdk_config.credentials_provider().ok_or_else(|| {
        StorageError::Initialization(format!("No credentials provider for profile {}", profile))
    })?;

    let credentials = provider.provide_credentials().await.map_err(|e| {
        StorageError::Initialization(format!(
            "Failed to resolve credentials for profile {}: {}",
            profile, e
        ))
    })?;

    tracing::debug!(profile, "Resolved credentials from AWS profile");

    Ok(ProfileCredentials {
        credentials: StaticCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().map(str::to_string),
        },
        region: sdk_config.region().map(|r| r.to_string()),
    })
}
