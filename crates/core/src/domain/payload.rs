//! Lenient decoding of the `/stock/{ticker}` response body.
//!
//! Every field degrades to an empty default instead of failing. The only hard failure in
//! the pipeline is a body that is not JSON at all, which is handled by the client.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StockResponse {
    #[serde(default, deserialize_with = "lenient_stock_data")]
    pub stock_data: Option<StockData>,
    #[serde(default, deserialize_with = "lenient_news")]
    pub news: Vec<NewsItem>,
    #[serde(default, deserialize_with = "lenient_series")]
    pub history: Vec<f64>,
    #[serde(default, deserialize_with = "lenient_series")]
    pub predictions: Vec<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub llm_report: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StockData {
    #[serde(default, deserialize_with = "lenient_string")]
    pub ticker: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pe_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub eps: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub de_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: Option<String>,
}

impl StockResponse {
    /// Shapes any JSON value into a response. Non-object bodies yield the empty default.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            tracing::warn!(kind = json_kind(&value), "stock response body is not an object");
            return Self::default();
        }
        // Field deserializers accept any JSON, so an object never fails here.
        serde_json::from_value(value).unwrap_or_default()
    }

    pub fn current_price(&self) -> Option<f64> {
        self.stock_data.as_ref().and_then(|s| s.price)
    }

    /// Price shown in the metrics row: the quoted price, else the latest close.
    pub fn display_price(&self) -> Option<f64> {
        self.current_price()
            .or_else(|| self.history.last().copied().filter(|v| v.is_finite()))
    }
}

/// Numeric coercion for series elements. Never drops an element; anything that cannot be
/// read as a number becomes NaN.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn lenient_series<'de, D>(de: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(de)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            if !item.is_number() {
                tracing::warn!(idx, kind = json_kind(item), "non-numeric series element coerced");
            }
            coerce_number(item)
        })
        .collect())
}

fn lenient_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(de)?.as_f64())
}

fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_stock_data<'de, D>(de: D) -> Result<Option<StockData>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(de)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn lenient_news<'de, D>(de: D) -> Result<Vec<NewsItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(de)? else {
        return Ok(Vec::new());
    };
    Ok(items.iter().map(news_item).collect())
}

fn news_item(value: &Value) -> NewsItem {
    let title = match value.get("title") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    NewsItem { title, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_payload() {
        let parsed = StockResponse::from_value(json!({
            "stock_data": {"ticker": "AAPL", "price": 190.5, "pe_ratio": 29.1, "eps": 6.4, "de_ratio": 151.9},
            "news": [{"title": "Apple ships", "summary": "Details"}, {"title": "No summary"}],
            "history": [188.0, 189.25, 190.0],
            "predictions": [191.0, 192.5],
            "llm_report": "# Report",
        }));

        let stock = parsed.stock_data.as_ref().unwrap();
        assert_eq!(stock.ticker.as_deref(), Some("AAPL"));
        assert_eq!(stock.price, Some(190.5));
        assert_eq!(parsed.news.len(), 2);
        assert_eq!(parsed.news[0].summary.as_deref(), Some("Details"));
        assert_eq!(parsed.news[1].summary, None);
        assert_eq!(parsed.history, vec![188.0, 189.25, 190.0]);
        assert_eq!(parsed.predictions, vec![191.0, 192.5]);
        assert_eq!(parsed.llm_report.as_deref(), Some("# Report"));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let parsed = StockResponse::from_value(json!({}));
        assert_eq!(parsed, StockResponse::default());
        assert!(parsed.current_price().is_none());
        assert!(parsed.display_price().is_none());
    }

    #[test]
    fn non_object_body_defaults() {
        assert_eq!(StockResponse::from_value(json!(null)), StockResponse::default());
        assert_eq!(StockResponse::from_value(json!([1, 2])), StockResponse::default());
        assert_eq!(StockResponse::from_value(json!("oops")), StockResponse::default());
    }

    #[test]
    fn wrongly_typed_fields_degrade() {
        let parsed = StockResponse::from_value(json!({
            "stock_data": "n/a",
            "news": {"title": "not a list"},
            "history": 12,
            "predictions": null,
            "llm_report": 42,
        }));
        assert_eq!(parsed, StockResponse::default());
    }

    #[test]
    fn string_price_is_not_a_number() {
        let parsed = StockResponse::from_value(json!({
            "stock_data": {"ticker": "TCS", "price": "3900", "eps": null},
        }));
        let stock = parsed.stock_data.unwrap();
        assert_eq!(stock.ticker.as_deref(), Some("TCS"));
        assert_eq!(stock.price, None);
        assert_eq!(stock.eps, None);
    }

    #[test]
    fn series_elements_are_coerced_not_dropped() {
        let parsed = StockResponse::from_value(json!({
            "history": [1.5, "2.5", "", null, true, "abc", [1]],
        }));
        let h = &parsed.history;
        assert_eq!(h.len(), 7);
        assert_eq!(&h[..5], &[1.5, 2.5, 0.0, 0.0, 1.0]);
        assert!(h[5].is_nan());
        assert!(h[6].is_nan());
    }

    #[test]
    fn display_price_falls_back_to_latest_close() {
        let parsed = StockResponse::from_value(json!({"history": [10.0, 11.0]}));
        assert_eq!(parsed.display_price(), Some(11.0));

        let quoted = StockResponse::from_value(json!({
            "stock_data": {"price": 12.0},
            "history": [10.0, 11.0],
        }));
        assert_eq!(quoted.display_price(), Some(12.0));
    }

    #[test]
    fn news_items_tolerate_odd_shapes() {
        let parsed = StockResponse::from_value(json!({
            "news": [{"title": 7, "summary": ""}, "headline", {"summary": "only summary"}],
        }));
        assert_eq!(parsed.news.len(), 3);
        assert_eq!(parsed.news[0].title, "7");
        assert_eq!(parsed.news[0].summary, None);
        assert_eq!(parsed.news[1].title, "");
        assert_eq!(parsed.news[2].summary.as_deref(), Some("only summary"));
    }

    #[test]
    fn empty_report_is_absent() {
        let parsed = StockResponse::from_value(json!({"llm_report": ""}));
        assert!(parsed.llm_report.is_none());
    }
}
