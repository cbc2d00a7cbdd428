use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Errors and Results
-------------------------------------------------------------------------------------------------*/

/// Errors raised while crawling, normalizing, validating, and publishing the provider IP ranges.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /*-------------------------------------------------------------------------
      Parse Errors
    -------------------------------------------------------------------------*/
    /// A string could not be parsed as an IPv4 or IPv6 CIDR prefix.
    #[error("invalid CIDR prefix `{cidr}`: {reason}")]
    InvalidCidr { cidr: String, reason: String },

    /// A hierarchical key split into more than two components.
    #[error("invalid compound name `{name}`: expected at most two `{delimiter}` separated components")]
    InvalidCompoundName { name: String, delimiter: char },

    /// A vendor payload did not match the expected shape.
    #[error("failed to decode {provider} network data: {source}")]
    DecodeFailed {
        provider: String,
        #[source]
        source: serde_json::Error,
    },

    /// A vendor payload decoded but reported that the request was not served.
    #[error("{provider} reported an unsuccessful response: {reason}")]
    UnsuccessfulResponse { provider: String, reason: String },

    /// The network or HTTP layer failed after the retry budget was spent.
    #[error("failed to fetch `{url}`: {reason}")]
    FetchFailed { url: String, reason: String },

    /*-------------------------------------------------------------------------
      Validation Errors
    -------------------------------------------------------------------------*/
    /// Every provider failed to crawl (or none were crawled).
    #[error("external network sources empty; failed to crawl any provider")]
    NoCrawlSources,

    #[error("provider name is empty")]
    EmptyProviderName,

    #[error("provider {provider} does not have any region associated with it")]
    NoRegionsForProvider { provider: String },

    #[error("provider {provider} has an empty region name")]
    EmptyRegionName { provider: String },

    #[error("provider {provider} has a region {region} with no services")]
    NoServicesForRegion { provider: String, region: String },

    #[error("provider {provider} has a region {region} with an empty service name")]
    EmptyServiceName { provider: String, region: String },

    #[error("provider {provider} at region {region} with service {service} does not have any IP prefix")]
    NoIpPrefixesForService {
        provider: String,
        region: String,
        service: String,
    },

    /// No minimum prefix count was declared for a provider being validated.
    #[error("provider {provider} has no minimum IP prefix count declared")]
    MissingPrefixThreshold { provider: String },

    #[error("provider {provider} has {observed} IP prefixes; at least {required} are required")]
    InsufficientIpPrefixCount {
        provider: String,
        observed: usize,
        required: usize,
    },

    /*-------------------------------------------------------------------------
      Orchestration Errors
    -------------------------------------------------------------------------*/
    /// A provider name given on the command line is not recognized.
    #[error("unknown provider `{0}`")]
    InvalidProvider(String),

    /// Some providers failed to crawl in lenient mode; the rest were published.
    #[error("failed to crawl some of the providers: {}", .failed.join(", "))]
    PartialCrawl { failed: Vec<String> },

    /// The pointer to the latest snapshot is missing from the bucket.
    #[error("latest prefix file not found in bucket {bucket}")]
    LatestPrefixFileNotFound { bucket: String },

    #[error("failed to serialize external network sources: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("object storage failure at {path:?}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/*--------------------------------------------------------------------------------------
  Log Error Function
--------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) fn log_error(error: &Error) {
    log::error!("{}", error);
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_crawl_message_lists_providers() {
        let error = Error::PartialCrawl {
            failed: vec!["Azure".to_string(), "Oracle".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "failed to crawl some of the providers: Azure, Oracle"
        );
    }

    #[test]
    fn test_decode_failed_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::DecodeFailed {
            provider: "Google".to_string(),
            source,
        };
        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().starts_with("failed to decode Google network data"));
    }
}
