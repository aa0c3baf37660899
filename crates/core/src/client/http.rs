use crate::client::{FetchError, StockApi};
use crate::config::Settings;
use anyhow::Context;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct HttpStockApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStockApi {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build stock api http client")?;

        Ok(Self {
            http,
            base_url: settings.api_base.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, ticker: &str) -> String {
        format!(
            "{}/stock/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(ticker)
        )
    }
}

#[async_trait::async_trait]
impl StockApi for HttpStockApi {
    async fn fetch_stock(&self, ticker: &str) -> Result<Value, FetchError> {
        let url = self.url(ticker);
        tracing::debug!(%url, "GET stock");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let text = res.text().await.map_err(FetchError::Body)?;
        Ok(serde_json::from_str::<Value>(&text)?)
    }
}
