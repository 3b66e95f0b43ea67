use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::data_source::{ProviderId, SourceError, StockDataProvider};
use crate::domain::{
    Snapshot, Symbol, FIELD_FIFTY_TWO_WEEK_CHANGE, FIELD_REGULAR_MARKET_OPEN,
    FIELD_REGULAR_MARKET_PRICE,
};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};

const QUOTE_ENDPOINT: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const REFERER: &str = "https://finance.yahoo.com/";
const REQUEST_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// Yahoo Auth Manager - Handles crumb authentication
// ============================================================================

/// Manages Yahoo Finance crumb authentication.
///
/// Yahoo's unofficial API requires:
/// 1. Session cookie from fc.yahoo.com (held by the transport's cookie jar)
/// 2. Crumb token from query1.finance.yahoo.com/v1/test/getcrumb
pub struct YahooAuthManager {
    /// Cached crumb token
    crumb: std::sync::Mutex<Option<String>>,
    /// When the crumb was last refreshed
    last_refresh: std::sync::Mutex<Option<Instant>>,
    /// Whether a refresh is currently in progress
    refreshing: AtomicBool,
    /// Crumb TTL in seconds
    ttl_secs: u64,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self {
            crumb: std::sync::Mutex::new(None),
            last_refresh: std::sync::Mutex::new(None),
            refreshing: AtomicBool::new(false),
            ttl_secs: 3600,
        }
    }
}

impl YahooAuthManager {
    fn cached_crumb(&self) -> Option<String> {
        let crumb = self.crumb.lock().expect("crumb lock is not poisoned");
        let last_refresh = self
            .last_refresh
            .lock()
            .expect("refresh lock is not poisoned");

        let fresh = last_refresh
            .map(|last| last.elapsed().as_secs() < self.ttl_secs)
            .unwrap_or(false);

        if fresh { crumb.clone() } else { None }
    }

    /// Get a crumb for use in query parameters, refreshing if needed.
    pub async fn crumb(&self, http_client: &Arc<dyn HttpClient>) -> Result<String, SourceError> {
        // The YAHOO_CRUMB override skips network auth entirely (testing/CI).
        if let Ok(crumb) = std::env::var("YAHOO_CRUMB") {
            return Ok(crumb);
        }

        if let Some(crumb) = self.cached_crumb() {
            return Ok(crumb);
        }

        self.refresh(http_client).await?;

        self.cached_crumb()
            .ok_or_else(|| SourceError::unavailable("failed to obtain Yahoo crumb"))
    }

    async fn refresh(&self, http_client: &Arc<dyn HttpClient>) -> Result<(), SourceError> {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            // Another task is refreshing; give it a moment and reuse its result.
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            if self.cached_crumb().is_some() {
                return Ok(());
            }
        }

        let result = self.do_refresh(http_client).await;
        self.refreshing.store(false, Ordering::SeqCst);
        result
    }

    async fn do_refresh(&self, http_client: &Arc<dyn HttpClient>) -> Result<(), SourceError> {
        // Step 1: visit fc.yahoo.com so the transport's jar picks up session cookies.
        let cookie_request = HttpRequest::get("https://fc.yahoo.com")
            .with_header("referer", REFERER)
            .with_timeout_ms(REQUEST_TIMEOUT_MS);

        let _cookie_response = http_client.execute(cookie_request).await.map_err(|e| {
            SourceError::unavailable(format!("failed to fetch Yahoo cookie: {}", e.message()))
        })?;

        // Step 2: fetch the crumb from the query endpoints.
        let crumb_endpoints = [
            "https://query1.finance.yahoo.com/v1/test/getcrumb",
            "https://query2.finance.yahoo.com/v1/test/getcrumb",
        ];

        for endpoint in &crumb_endpoints {
            let crumb_request = HttpRequest::get(*endpoint)
                .with_header("referer", REFERER)
                .with_timeout_ms(REQUEST_TIMEOUT_MS);

            match http_client.execute(crumb_request).await {
                Ok(response) if response.is_success() && !response.body.is_empty() => {
                    let body = response.body.trim();

                    // HTML here means an error page, not a crumb.
                    if body.contains("<html") || body.contains("<!DOCTYPE") {
                        continue;
                    }

                    if body.to_lowercase().contains("too many requests") {
                        return Err(SourceError::unavailable(
                            "Yahoo rate limited while fetching crumb",
                        ));
                    }

                    if !body.is_empty() && body.len() < 100 && !body.contains(' ') {
                        *self.crumb.lock().expect("crumb lock is not poisoned") =
                            Some(body.to_string());
                        *self
                            .last_refresh
                            .lock()
                            .expect("refresh lock is not poisoned") = Some(Instant::now());
                        return Ok(());
                    }
                }
                _ => continue,
            }
        }

        Err(SourceError::unavailable(
            "failed to fetch Yahoo crumb from all endpoints",
        ))
    }

    /// Invalidate the cached crumb (forces a refresh on next use).
    pub fn invalidate(&self) {
        *self.crumb.lock().expect("crumb lock is not poisoned") = None;
        *self
            .last_refresh
            .lock()
            .expect("refresh lock is not poisoned") = None;
    }
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo provider supporting both real API calls and mock mode.
///
/// Real mode queries the v7 quote endpoint with crumb authentication. Mock
/// mode (the default, with [`NoopHttpClient`]) produces deterministic seeded
/// snapshots for offline runs and tests.
#[derive(Clone)]
pub struct YahooProvider {
    http_client: Arc<dyn HttpClient>,
    auth: Arc<YahooAuthManager>,
    use_real_api: bool,
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            auth: Arc::new(YahooAuthManager::default()),
            use_real_api: false,
        }
    }
}

impl YahooProvider {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            auth: Arc::new(YahooAuthManager::default()),
            use_real_api,
        }
    }

    async fn fetch_real_snapshot(&self, symbol: &Symbol) -> Result<Snapshot, SourceError> {
        let crumb = self.auth.crumb(&self.http_client).await?;

        let endpoint = format!(
            "{QUOTE_ENDPOINT}?symbols={}&crumb={}",
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(&crumb)
        );

        let request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_timeout_ms(REQUEST_TIMEOUT_MS);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::unavailable(format!("yahoo transport error: {}", e.message())))?;

        // A rejected crumb stays rejected; drop it so the next poll
        // re-authenticates instead of retrying inside this call.
        if response.status == 401 || response.status == 429 {
            self.auth.invalidate();
            return Err(SourceError::unavailable(format!(
                "yahoo rejected auth with status {}; will re-authenticate on the next poll",
                response.status
            )));
        }

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        parse_quote_response(symbol, &response.body)
    }

    async fn fetch_mock_snapshot(&self, symbol: &Symbol) -> Result<Snapshot, SourceError> {
        // Still exercise the transport so recording/failing test doubles see
        // the call.
        let request = HttpRequest::get(QUOTE_ENDPOINT).with_timeout_ms(REQUEST_TIMEOUT_MS);
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| SourceError::unavailable(format!("yahoo transport error: {}", e.message())))?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        Ok(mock_snapshot(symbol))
    }
}

impl StockDataProvider for YahooProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn fetch<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Snapshot, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real_snapshot(symbol).await
            } else {
                self.fetch_mock_snapshot(symbol).await
            }
        })
    }
}

// Yahoo Finance API response structures
#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteEnvelope,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteEnvelope {
    result: Vec<Map<String, Value>>,
    #[serde(default)]
    error: Option<Value>,
}

fn parse_quote_response(symbol: &Symbol, body: &str) -> Result<Snapshot, SourceError> {
    let parsed: YahooQuoteResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo response: {e}")))?;

    if let Some(error) = &parsed.quote_response.error {
        if !error.is_null() {
            return Err(SourceError::unavailable(format!("yahoo API error: {error}")));
        }
    }

    let fields = parsed
        .quote_response
        .result
        .into_iter()
        .find(|fields| {
            fields
                .get("symbol")
                .and_then(Value::as_str)
                .map(|s| s.eq_ignore_ascii_case(symbol.as_str()))
                .unwrap_or(false)
        })
        .ok_or_else(|| SourceError::unavailable(format!("no quote data for {symbol}")))?;

    Ok(Snapshot::new(
        symbol.clone(),
        OffsetDateTime::now_utc(),
        canonicalize_fields(fields),
    ))
}

/// The v7 endpoint reports the 52-week trend as a percent under a long field
/// name; the canonical snapshot field is a fraction.
fn canonicalize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    if !fields.contains_key(FIELD_FIFTY_TWO_WEEK_CHANGE) {
        let fraction = fields
            .get("fiftyTwoWeekChangePercent")
            .and_then(Value::as_f64)
            .map(|percent| percent / 100.0);
        if let Some(fraction) = fraction {
            if let Some(number) = serde_json::Number::from_f64(fraction) {
                fields.insert(
                    FIELD_FIFTY_TWO_WEEK_CHANGE.to_owned(),
                    Value::Number(number),
                );
            }
        }
    }
    fields
}

fn mock_snapshot(symbol: &Symbol) -> Snapshot {
    let seed = symbol_seed(symbol);
    let price = 92.0 + (seed % 500) as f64 / 10.0;
    let open = price + ((seed % 7) as f64 - 3.0) / 2.0;
    let week_change = ((seed % 200) as f64 - 100.0) / 1000.0;

    let mut fields = Map::new();
    fields.insert(
        FIELD_REGULAR_MARKET_PRICE.to_owned(),
        number_value(price),
    );
    fields.insert(FIELD_REGULAR_MARKET_OPEN.to_owned(), number_value(open));
    fields.insert(
        FIELD_FIFTY_TWO_WEEK_CHANGE.to_owned(),
        number_value(week_change),
    );
    fields.insert(
        "regularMarketVolume".to_owned(),
        Value::from(50_000 + seed % 10_000),
    );
    fields.insert("currency".to_owned(), Value::from("USD"));

    Snapshot::new(symbol.clone(), OffsetDateTime::now_utc(), fields)
}

fn number_value(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}
