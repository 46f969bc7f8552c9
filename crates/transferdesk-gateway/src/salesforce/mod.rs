//! Salesforce integration: token exchange and REST API paths.

mod token;

pub use token::{token_url, SalesforceToken, SalesforceTokenClient, TokenExchangeError};

/// Default REST API version used by the sobjects probe
pub const DEFAULT_API_VERSION: &str = "54.0";

/// Generic message when a failed API call carries no usable error body
pub const GENERIC_API_ERROR: &str = "Failed to connect to Salesforce API";

/// sobjects listing URL for an instance, e.g. `<instance>/services/data/v54.0/sobjects`
pub fn sobjects_url(instance_url: &str, api_version: &str) -> String {
    format!(
        "{}/services/data/v{}/sobjects",
        instance_url.trim_end_matches('/'),
        api_version.trim_start_matches('v')
    )
}
