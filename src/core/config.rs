use log::{info, warn};
use std::env;

/*-------------------------------------------------------------------------------------------------
  Configuration
-------------------------------------------------------------------------------------------------*/

/// Region name used when a provider does not segment its ranges by region.
pub const DEFAULT_REGION: &str = "default";

/// Service name used when a provider does not segment its ranges by service.
pub const DEFAULT_SERVICE: &str = "default";

/*--------------------------------------------------------------------------------------
  Bucket Layout
--------------------------------------------------------------------------------------*/

/// Every object written by a publish run lives under this prefix.
pub const MASTER_BUCKET_PREFIX: &str = "external-networks";

/// Name of the object holding the serialized network sources.
pub const NETWORK_FILE_NAME: &str = "networks";

/// Name of the object holding the SHA-256 checksum of the network file.
pub const CHECKSUM_FILE_NAME: &str = "checksum";

/// Name of the object pointing at the most recently published snapshot prefix.
pub const LATEST_PREFIX_FILE_NAME: &str = "latest_prefix";

/// Number of snapshots retained in the bucket.
pub const MAX_NUM_DEFINITIONS: usize = 10;

/// Timestamp format used for snapshot prefixes; sorts chronologically as a string.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H-%M-%S";

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Get and parse an environment variable value or return a default value.
pub(crate) fn get_env_var<T: std::str::FromStr>(env_var: &str, default: T) -> T {
    env::var(env_var)
        .ok()
        .and_then(|value| {
            value
                .parse::<T>()
                .inspect(|_| info!("Using {}: {}", env_var, value))
                .inspect_err(|_| warn!("Invalid {}: {}", env_var, value))
                .ok()
        })
        .unwrap_or(default)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
