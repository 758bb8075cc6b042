use retry_policies::policies::ExponentialBackoff;
use retry_policies::{RetryDecision, RetryPolicy};
use std::io::Read;
use std::thread;
use std::time::{Duration, SystemTime};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_RETRIES: u32 = 5;

#[derive(thiserror::Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error while downloading {uri} after {attempts} attempt(s): {source}")]
    HttpError {
        uri: String,
        attempts: u32,
        // Boxed to prevent `large_enum_variant` errors since `ureq::Error` is massive.
        source: Box<ureq::Error>,
    },
}

/// Opens HTTP(S) downloads, retrying transient failures with exponential backoff like
/// `curl --retry 5 --connect-timeout 5` would.
#[derive(Debug, Clone)]
pub struct Downloader {
    pub retry_policy: ExponentialBackoff,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for Downloader {
    fn default() -> Self {
        Self {
            retry_policy: ExponentialBackoff::builder().build_with_max_retries(DEFAULT_RETRIES),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl Downloader {
    /// Sends a GET request and returns the response body as a stream.
    ///
    /// Connection failures and `408`, `429` and `5xx` responses are retried as long as the retry
    /// policy allows it. Other error responses fail right away. Reading the body is up to the
    /// caller and is not retried.
    pub fn open(&self, uri: &str) -> Result<impl Read + Send, DownloadError> {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(self.connect_timeout)
            .timeout_read(self.read_timeout)
            .build();

        let request_start_time = SystemTime::now();
        let mut past_retries = 0;

        loop {
            let error = match agent.get(uri).call() {
                Ok(response) => return Ok(response.into_reader()),
                Err(error) => error,
            };

            let decision = if is_transient(&error) {
                self.retry_policy.should_retry(request_start_time, past_retries)
            } else {
                RetryDecision::DoNotRetry
            };

            match decision {
                RetryDecision::Retry { execute_after } => {
                    past_retries += 1;
                    eprintln!("Retry attempt {past_retries} to download {uri} ({error})");
                    thread::sleep(
                        execute_after
                            .duration_since(SystemTime::now())
                            .unwrap_or_default(),
                    );
                }
                RetryDecision::DoNotRetry => {
                    return Err(DownloadError::HttpError {
                        uri: String::from(uri),
                        attempts: past_retries + 1,
                        source: Box::new(error),
                    })
                }
            }
        }
    }
}

fn is_transient(error: &ureq::Error) -> bool {
    match error {
        ureq::Error::Transport(_) => true,
        ureq::Error::Status(status, _) => matches!(status, 408 | 429 | 500..=599),
    }
}
