//! Configuration for the hosted backend
//!
//! The client core talks to a hosted database/storage service over its
//! REST surface. Connection parameters come from environment variables
//! with development defaults.

use crate::error::{StoreError, StoreResult};

/// Hosted backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the hosted backend (e.g., "https://xyz.supabase.co")
    pub base_url: String,
    /// Anonymous API key sent with every request
    pub anon_key: String,
    /// Storage bucket holding user documents
    pub documents_bucket: String,
    /// Lifetime of signed download URLs, in seconds
    pub signed_url_ttl: u64,
    /// HTTP request timeout, in seconds
    pub request_timeout: u64,
}

impl BackendConfig {
    /// Create a new BackendConfig from environment variables
    ///
    /// # Environment Variables
    /// - `ABRORA_BACKEND_URL`: base URL (default: "http://localhost:54321")
    /// - `ABRORA_BACKEND_ANON_KEY`: anonymous API key (required)
    /// - `ABRORA_DOCUMENTS_BUCKET`: storage bucket name (default: "documents")
    /// - `ABRORA_SIGNED_URL_TTL`: signed URL lifetime in seconds (default: 3600)
    /// - `ABRORA_REQUEST_TIMEOUT`: HTTP timeout in seconds (default: 30)
    pub fn from_env() -> StoreResult<Self> {
        let base_url = std::env::var("ABRORA_BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:54321".to_string());

        let anon_key = std::env::var("ABRORA_BACKEND_ANON_KEY")
            .map_err(|_| StoreError::Validation("ABRORA_BACKEND_ANON_KEY is not set".to_string()))?;

        let documents_bucket =
            std::env::var("ABRORA_DOCUMENTS_BUCKET").unwrap_or_else(|_| "documents".to_string());

        let signed_url_ttl = std::env::var("ABRORA_SIGNED_URL_TTL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let request_timeout = std::env::var("ABRORA_REQUEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            base_url,
            anon_key,
            documents_bucket,
            signed_url_ttl,
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_backend_config_from_env_defaults() {
        unsafe {
            std::env::set_var("ABRORA_BACKEND_ANON_KEY", "test-key");
            std::env::remove_var("ABRORA_BACKEND_URL");
            std::env::remove_var("ABRORA_DOCUMENTS_BUCKET");
            std::env::remove_var("ABRORA_SIGNED_URL_TTL");
        }

        let config = BackendConfig::from_env().expect("Failed to create backend config");
        assert_eq!(config.base_url, "http://localhost:54321");
        assert_eq!(config.anon_key, "test-key");
        assert_eq!(config.documents_bucket, "documents");
        assert_eq!(config.signed_url_ttl, 3600);
        assert_eq!(config.request_timeout, 30);
    }

    #[test]
    #[serial]
    fn test_backend_config_requires_anon_key() {
        unsafe {
            std::env::remove_var("ABRORA_BACKEND_ANON_KEY");
        }

        assert!(BackendConfig::from_env().is_err());
    }
}
