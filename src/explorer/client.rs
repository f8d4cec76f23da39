use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use super::{
    calculate_next_backoff, execute_with_timeout, ConcreteTransaction, RawSourceMetadata,
    SourceProvider, TransactionPage, TransactionSource,
};
use crate::config::ExplorerConfig;
use crate::errors::{ExplorerError, ExplorerResult};

/// Message the explorer uses for an address with no (further) transactions
const NO_TRANSACTIONS_MESSAGE: &str = "No transactions found";

/// Lowercase fragment of the explorer's throttling messages
const RATE_LIMIT_MARKER: &str = "rate limit";

/// Response envelope shared by every explorer action
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    status: String,
    #[serde(default)]
    message: String,
    result: serde_json::Value,
}

/// Etherscan-compatible explorer client with retry logic and request spacing
pub struct ExplorerClient {
    http: reqwest::Client,
    config: ExplorerConfig,
    last_request: Mutex<Option<Instant>>,
    error_count: AtomicU64,
}

impl ExplorerClient {
    pub fn new(config: ExplorerConfig) -> ExplorerResult<Self> {
        if config.api_key.is_empty() {
            warn!("No explorer API key configured; requests will be heavily rate limited");
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("gas-estimate-eval/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config,
            last_request: Mutex::new(None),
            error_count: AtomicU64::new(0),
        })
    }

    /// Failed attempts across all calls (including ones later retried successfully)
    pub fn get_error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Sleep until the configured minimum interval since the previous request has passed
    async fn throttle(&self) {
        let min_interval = Duration::from_millis(self.config.min_request_interval_ms);
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let since = previous.elapsed();
            if since < min_interval {
                sleep(min_interval - since).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn send_once(
        &self,
        params: &[(&str, String)],
        action: &str,
    ) -> ExplorerResult<ApiEnvelope> {
        self.throttle().await;

        let response = self
            .http
            .get(&self.config.url)
            .query(params)
            .query(&[("apikey", self.config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::HttpStatus {
                status: status.as_u16(),
                action: action.to_string(),
            });
        }

        Ok(response.json::<ApiEnvelope>().await?)
    }

    /// Send a request and interpret the envelope, retrying transient failures
    async fn call_with_retry<T, F>(
        &self,
        params: Vec<(&str, String)>,
        operation: &str,
        interpret: F,
    ) -> ExplorerResult<T>
    where
        F: Fn(ApiEnvelope) -> ExplorerResult<T>,
    {
        let action = params
            .iter()
            .find(|(k, _)| *k == "action")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();

        let mut attempts = 0;
        let mut backoff = Duration::from_millis(self.config.initial_backoff_ms);

        loop {
            let outcome = match execute_with_timeout(
                self.config.timeout_seconds,
                self.send_once(&params, &action),
            )
            .await
            {
                Ok(result) => result.and_then(&interpret),
                Err(_) => Err(ExplorerError::Timeout {
                    timeout_seconds: self.config.timeout_seconds,
                    operation: operation.to_string(),
                }),
            };

            let e = match outcome {
                Ok(value) => {
                    if attempts > 0 {
                        debug!("{} succeeded after {} attempts", operation, attempts + 1);
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            attempts += 1;
            self.error_count.fetch_add(1, Ordering::Relaxed);

            if !e.is_retryable() {
                debug!("{} failed (non-retryable): {}", operation, e);
                return Err(e);
            }

            if attempts >= self.config.max_retries {
                error!("{} failed after {} attempts: {}", operation, attempts, e);
                return Err(match e {
                    timeout @ ExplorerError::Timeout { .. } => timeout,
                    _ => ExplorerError::MaxRetriesExceeded {
                        operation: operation.to_string(),
                    },
                });
            }

            warn!(
                "Explorer attempt {} failed for {}, retrying in {:?}: {}",
                attempts, operation, backoff, e
            );
            sleep(backoff).await;

            backoff = calculate_next_backoff(
                backoff,
                self.config.backoff_multiplier,
                self.config.max_backoff_seconds,
            );
        }
    }
}

/// Interpret a `getsourcecode` envelope
fn parse_source_envelope(
    address: &str,
    envelope: ApiEnvelope,
) -> ExplorerResult<RawSourceMetadata> {
    if envelope.status != "1" {
        return Err(ExplorerError::Api {
            action: "getsourcecode".to_string(),
            message: api_message(&envelope),
        });
    }

    let entries: Vec<RawSourceMetadata> = serde_json::from_value(envelope.result)
        .map_err(|e| ExplorerError::DeserialisationFailed(e.to_string()))?;

    entries
        .into_iter()
        .next()
        .ok_or_else(|| ExplorerError::SourceNotVerified {
            address: address.to_string(),
        })
}

/// Interpret a `txlist` envelope
fn parse_txlist_envelope(envelope: ApiEnvelope) -> ExplorerResult<TransactionPage> {
    if envelope.status != "1" {
        if is_rate_limited(&envelope) {
            return Err(ExplorerError::Api {
                action: "txlist".to_string(),
                message: api_message(&envelope),
            });
        }
        // Any other refusal ends the feed: no transactions, or a page past the result window
        if !envelope.message.starts_with(NO_TRANSACTIONS_MESSAGE) {
            debug!("txlist ended by explorer: {}", api_message(&envelope));
        }
        return Ok(TransactionPage::Exhausted);
    }

    let transactions: Vec<ConcreteTransaction> = serde_json::from_value(envelope.result)
        .map_err(|e| ExplorerError::DeserialisationFailed(e.to_string()))?;

    if transactions.is_empty() {
        Ok(TransactionPage::Exhausted)
    } else {
        Ok(TransactionPage::Transactions(transactions))
    }
}

/// Whether a NOTOK envelope is the explorer's rate limiter rather than a refusal
fn is_rate_limited(envelope: &ApiEnvelope) -> bool {
    let detail = envelope.result.as_str().unwrap_or_default();
    [envelope.message.as_str(), detail]
        .iter()
        .any(|text| text.to_ascii_lowercase().contains(RATE_LIMIT_MARKER))
}

/// Error text from an envelope; the explorer puts details in `result` for NOTOK responses
fn api_message(envelope: &ApiEnvelope) -> String {
    match &envelope.result {
        serde_json::Value::String(detail) if !detail.is_empty() => {
            format!("{}: {}", envelope.message, detail)
        }
        _ => envelope.message.clone(),
    }
}

impl SourceProvider for ExplorerClient {
    async fn fetch_source(&self, address: &str) -> ExplorerResult<RawSourceMetadata> {
        let params = vec![
            ("module", "contract".to_string()),
            ("action", "getsourcecode".to_string()),
            ("address", address.to_string()),
        ];
        self.call_with_retry(params, &format!("getsourcecode({})", address), |envelope| {
            parse_source_envelope(address, envelope)
        })
        .await
    }
}

impl TransactionSource for ExplorerClient {
    async fn list_transactions(
        &self,
        address: &str,
        page: u32,
        page_size: u32,
    ) -> ExplorerResult<TransactionPage> {
        let params = vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", address.to_string()),
            ("startblock", "0".to_string()),
            ("endblock", "99999999".to_string()),
            ("page", page.to_string()),
            ("offset", page_size.to_string()),
            ("sort", "desc".to_string()),
        ];
        self.call_with_retry(
            params,
            &format!("txlist({}, page {})", address, page),
            parse_txlist_envelope,
        )
        .await
    }
}
