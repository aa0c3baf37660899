pub mod error;
pub mod http;

pub use error::FetchError;
pub use http::HttpStockApi;

use serde_json::Value;

/// Source of `/stock/{ticker}` payloads.
#[async_trait::async_trait]
pub trait StockApi: Send + Sync {
    /// One attempt, no retries. Returns the decoded JSON body of a 2xx response.
    async fn fetch_stock(&self, ticker: &str) -> Result<Value, FetchError>;
}
