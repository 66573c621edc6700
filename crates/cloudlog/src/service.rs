//! Service identity attached to error reports.

use std::env;

use serde::{Deserialize, Serialize};

const SERVICE_VAR: &str = "K_SERVICE";
const REVISION_VAR: &str = "K_REVISION";

/// Name and version pair identifying the running service in error reports.
///
/// Ingestion pipelines require this pair to group reported errors by
/// deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceContext {
    /// Deployed service name.
    pub service: String,
    /// Deployed service version or revision.
    pub version: String,
}

impl ServiceContext {
    /// Create a service context from an explicit name and version.
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
        }
    }

    /// Resolve the service identity from the `K_SERVICE` and `K_REVISION`
    /// variables that serverless container runtimes predefine.
    ///
    /// Unset variables resolve to empty strings.
    #[must_use]
    pub fn from_cloud_run_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            service: lookup(SERVICE_VAR).unwrap_or_default(),
            version: lookup(REVISION_VAR).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let ctx = ServiceContext::new("web_server", "v42");
        assert_eq!(ctx.service, "web_server");
        assert_eq!(ctx.version, "v42");
    }

    #[test]
    fn test_serialization_shape() {
        let ctx = ServiceContext::new("api", "2026-01");
        let json = serde_json::to_string(&ctx).unwrap();
        assert_eq!(json, r#"{"service":"api","version":"2026-01"}"#);

        let parsed: ServiceContext = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ctx);
    }

    #[test]
    fn test_lookup_resolution() {
        let ctx = ServiceContext::from_lookup(|key| match key {
            "K_SERVICE" => Some("checkout".to_owned()),
            "K_REVISION" => Some("checkout-00042-xyz".to_owned()),
            _ => None,
        });
        assert_eq!(ctx.service, "checkout");
        assert_eq!(ctx.version, "checkout-00042-xyz");
    }

    #[test]
    fn test_lookup_missing_is_empty() {
        let ctx = ServiceContext::from_lookup(|_| None);
        assert_eq!(ctx.service, "");
        assert_eq!(ctx.version, "");
    }
}
