use crate::core::config::get_env_var;
use crate::core::errors::{Error, Result};
use lazy_static::lazy_static;
use log::{error, info};
use regex::Regex;
use std::{thread, time};

/*-------------------------------------------------------------------------------------------------
  Fetch Interface
-------------------------------------------------------------------------------------------------*/

/// Blocking retrieval of a URL's body; the only network seam the crawlers depend on.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/*-------------------------------------------------------------------------------------------------
  Client Builder
-------------------------------------------------------------------------------------------------*/

/// A builder for the [Client] struct that allows you to customize the request timeout and the
/// exponential-backoff retry schedule.
///
/// ```
/// let client = cloudipranges::ClientBuilder::default()
///     .timeout(30_000) // 30 seconds
///     .retry_initial_delay(500) // 500 ms
///     .retry_max_delay(4_000) // 4 seconds
///     .retry_backoff_factor(2)
///     .retry_timeout(60_000) // 1 minute
///     .build();
///
/// assert_eq!(client.retry_max_delay(), 4_000);
/// ```
///
/// The [ClientBuilder::new] method attempts to source configuration values from environment
/// variables when set and uses default values when the environment variables are not set.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    timeout: u64,
    retry_initial_delay: u64,
    retry_max_delay: u64,
    retry_backoff_factor: u64,
    retry_timeout: u64,
}

/*--------------------------------------------------------------------------------------
  Client Builder Implementation
--------------------------------------------------------------------------------------*/

impl Default for ClientBuilder {
    /// Create a new [ClientBuilder] with default configuration values.
    ///
    /// ```
    /// let client = cloudipranges::ClientBuilder::default().build();
    ///
    /// assert_eq!(client.timeout(), 60_000);
    /// assert_eq!(client.retry_initial_delay(), 2_000);
    /// assert_eq!(client.retry_max_delay(), 10_000);
    /// assert_eq!(client.retry_backoff_factor(), 2);
    /// assert_eq!(client.retry_timeout(), 300_000);
    /// ```
    fn default() -> Self {
        Self {
            timeout: 60 * 1000,            // 60 seconds
            retry_initial_delay: 2 * 1000, // 2 seconds
            retry_max_delay: 10 * 1000,    // 10 seconds
            retry_backoff_factor: 2,
            retry_timeout: 5 * 60 * 1000, // 5 minutes
        }
    }
}

impl ClientBuilder {
    /// Create a new [ClientBuilder] reading initial configuration values from
    /// environment variables when set and default values when the environment
    /// variables are not set.
    ///
    /// The environment variables used to set the initial configuration values
    /// are:
    /// - `CLOUDIPRANGES_TIMEOUT`
    /// - `CLOUDIPRANGES_RETRY_INITIAL_DELAY`
    /// - `CLOUDIPRANGES_RETRY_MAX_DELAY`
    /// - `CLOUDIPRANGES_RETRY_BACKOFF_FACTOR`
    /// - `CLOUDIPRANGES_RETRY_TIMEOUT`
    pub fn new() -> Self {
        let default = ClientBuilder::default();

        Self {
            timeout: get_env_var("CLOUDIPRANGES_TIMEOUT", default.timeout),
            retry_initial_delay: get_env_var(
                "CLOUDIPRANGES_RETRY_INITIAL_DELAY",
                default.retry_initial_delay,
            ),
            retry_max_delay: get_env_var("CLOUDIPRANGES_RETRY_MAX_DELAY", default.retry_max_delay),
            retry_backoff_factor: get_env_var(
                "CLOUDIPRANGES_RETRY_BACKOFF_FACTOR",
                default.retry_backoff_factor,
            ),
            retry_timeout: get_env_var("CLOUDIPRANGES_RETRY_TIMEOUT", default.retry_timeout),
        }
    }

    /*-------------------------------------------------------------------------
      Setters
    -------------------------------------------------------------------------*/

    /// Set the per-request timeout (in milliseconds); defaults to `60000`.
    pub fn timeout(&mut self, timeout: u64) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Set the delay (in milliseconds) before the first retry; defaults to `2000`.
    pub fn retry_initial_delay(&mut self, retry_initial_delay: u64) -> &mut Self {
        self.retry_initial_delay = retry_initial_delay;
        self
    }

    /// Set the upper bound (in milliseconds) of the delay between retries; defaults to `10000`.
    pub fn retry_max_delay(&mut self, retry_max_delay: u64) -> &mut Self {
        self.retry_max_delay = retry_max_delay;
        self
    }

    /// Set the factor the delay grows by after each failed attempt; defaults to `2`.
    ///
    /// The delay between retry attempts is calculated as:
    /// `min(retry_initial_delay * (retry_backoff_factor ^ attempt), retry_max_delay)`.
    pub fn retry_backoff_factor(&mut self, retry_backoff_factor: u64) -> &mut Self {
        self.retry_backoff_factor = retry_backoff_factor;
        self
    }

    /// Set the maximum time (in milliseconds) spent retrieving a single URL, retries included;
    /// defaults to `300000` milliseconds (5 minutes).
    pub fn retry_timeout(&mut self, retry_timeout: u64) -> &mut Self {
        self.retry_timeout = retry_timeout;
        self
    }

    /*-------------------------------------------------------------------------
      Build Method
    -------------------------------------------------------------------------*/

    pub fn build(&self) -> Client {
        Client {
            timeout: self.timeout,
            retry_initial_delay: self.retry_initial_delay,
            retry_max_delay: self.retry_max_delay,
            retry_backoff_factor: self.retry_backoff_factor,
            retry_timeout: self.retry_timeout,
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Client
-------------------------------------------------------------------------------------------------*/

/// A blocking HTTP client that retries failed GET requests with exponential backoff until the
/// retry timeout is spent.
#[derive(Debug, Clone)]
pub struct Client {
    timeout: u64,
    retry_initial_delay: u64,
    retry_max_delay: u64,
    retry_backoff_factor: u64,
    retry_timeout: u64,
}

/*--------------------------------------------------------------------------------------
  Client Implementation
--------------------------------------------------------------------------------------*/

impl Default for Client {
    fn default() -> Self {
        ClientBuilder::default().build()
    }
}

impl Client {
    pub fn new() -> Self {
        ClientBuilder::new().build()
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn retry_initial_delay(&self) -> u64 {
        self.retry_initial_delay
    }

    pub fn retry_max_delay(&self) -> u64 {
        self.retry_max_delay
    }

    pub fn retry_backoff_factor(&self) -> u64 {
        self.retry_backoff_factor
    }

    pub fn retry_timeout(&self) -> u64 {
        self.retry_timeout
    }

    /*-------------------------------------------------------------------------
      Private Methods
    -------------------------------------------------------------------------*/

    /// Delay before the retry following `attempt` (zero-based), capped at the max delay.
    fn retry_delay(&self, attempt: u32) -> time::Duration {
        let delay = self
            .retry_backoff_factor
            .checked_pow(attempt)
            .and_then(|factor| self.retry_initial_delay.checked_mul(factor))
            .unwrap_or(self.retry_max_delay)
            .min(self.retry_max_delay);
        time::Duration::from_millis(delay)
    }

    /// A single GET request; non-success status codes are failures.
    fn get_once(&self, http: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>> {
        let response = http.get(url).send().map_err(|error| fetch_failed(url, error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(url, format!("received status code {status}")));
        }

        response
            .bytes()
            .map(|body| body.to_vec())
            .map_err(|error| fetch_failed(url, error))
    }
}

impl Fetch for Client {
    /// GET the URL, retrying with exponential backoff.
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let http = reqwest::blocking::Client::builder()
            .timeout(time::Duration::from_millis(self.timeout))
            .build()
            .map_err(|error| fetch_failed(url, error))?;

        let start_time = time::Instant::now();
        let max_elapsed_time = time::Duration::from_millis(self.retry_timeout);

        let mut attempt: u32 = 0;
        loop {
            info!("Attempt {}: GET {}", attempt, url);
            match self.get_once(&http, url) {
                Ok(body) => {
                    info!("Attempt {}: GET {}: Ok ({} bytes)", attempt, url, body.len());
                    break Ok(body);
                }
                Err(error) => {
                    error!("Attempt {}: GET {}: FAILED: {}", attempt, url, error);

                    let delay = self.retry_delay(attempt);
                    attempt += 1;

                    if start_time.elapsed() + delay < max_elapsed_time {
                        info!("Retrying in {:?}", delay);
                        thread::sleep(delay);
                        continue;
                    } else {
                        break Err(error);
                    }
                }
            }
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Download Link Resolution
-------------------------------------------------------------------------------------------------*/

lazy_static! {
    static ref ANCHOR_TAG: Regex = Regex::new(r"(?i)<a\s[^>]+>").unwrap();
    static ref HREF: Regex = Regex::new(r#"href="([^"]+)""#).unwrap();
}

/// Marker of the direct-download links on Microsoft's download confirmation pages.
const DOWNLOAD_PATH: &str = "download.microsoft.com/download/";

/// Fetch a download confirmation page and return the first anchor link pointing at a
/// `download.microsoft.com/download/` file.
pub fn resolve_download_url(fetch: &dyn Fetch, page_url: &str) -> Result<String> {
    let page = fetch.get(page_url)?;
    let page = String::from_utf8_lossy(&page);

    find_download_url(&page).ok_or_else(|| {
        fetch_failed(
            page_url,
            format!("no link to {DOWNLOAD_PATH} found on the download page"),
        )
    })
}

fn find_download_url(page: &str) -> Option<String> {
    ANCHOR_TAG
        .find_iter(page)
        .filter_map(|anchor| HREF.captures(anchor.as_str()))
        .filter_map(|captures| captures.get(1))
        .map(|href| href.as_str())
        .find(|href| {
            href.contains(DOWNLOAD_PATH)
                && (href.starts_with("https://") || href.starts_with("http://"))
        })
        .map(str::to_string)
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

fn fetch_failed(url: &str, reason: impl ToString) -> Error {
    Error::FetchFailed {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
