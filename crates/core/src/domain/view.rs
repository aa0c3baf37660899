use crate::chart::{build_chart_rows, ChartRow};
use crate::domain::payload::{NewsItem, StockResponse};
use crate::format::{format_currency, format_number};
use crate::markdown;
use chrono::{DateTime, Utc};

pub const ERROR_TITLE: &str = "Request failed";
pub const ERROR_HINT: &str = "Check backend URL/CORS and make sure the ticker exists.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub view: ViewModel,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(ticker: &str) -> Self {
        Self {
            role: Role::User,
            view: ViewModel::User {
                text: format!("Show {ticker}"),
            },
            created_at: Utc::now(),
        }
    }

    pub fn assistant(view: ViewModel) -> Self {
        Self {
            role: Role::Assistant,
            view,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ViewModel {
    User { text: String },
    Snapshot(Box<SnapshotView>),
    Error(ErrorView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct SnapshotView {
    pub ticker: String,
    pub metrics: Vec<Metric>,
    pub chart: Vec<ChartRow>,
    pub news: Vec<NewsItem>,
    pub report_markdown: Option<String>,
    pub report_html: Option<String>,
}

impl SnapshotView {
    pub fn from_response(ticker: &str, payload: &StockResponse) -> Self {
        let stock = payload.stock_data.clone().unwrap_or_default();
        let metrics = vec![
            Metric {
                label: "Price".to_string(),
                value: format_currency(payload.display_price()),
            },
            Metric {
                label: "P/E".to_string(),
                value: format_number(stock.pe_ratio),
            },
            Metric {
                label: "EPS".to_string(),
                value: format_number(stock.eps),
            },
            Metric {
                label: "D/E (%)".to_string(),
                value: format_number(stock.de_ratio),
            },
        ];

        let chart = build_chart_rows(
            &payload.history,
            &payload.predictions,
            payload.current_price(),
        );

        Self {
            ticker: ticker.to_string(),
            metrics,
            chart,
            news: payload.news.clone(),
            report_html: payload.llm_report.as_deref().map(markdown::render),
            report_markdown: payload.llm_report.clone(),
        }
    }

    /// A single point cannot be drawn as a line.
    pub fn has_chart(&self) -> bool {
        self.chart.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorView {
    pub title: String,
    pub detail: String,
    pub hint: Option<String>,
}

impl ErrorView {
    pub fn request_failed(err: &dyn std::error::Error) -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            detail: err.to_string(),
            hint: Some(ERROR_HINT.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_formats_metrics() {
        let payload = StockResponse::from_value(json!({
            "stock_data": {"ticker": "AAPL", "price": 1234.5, "pe_ratio": 19.23456, "eps": 6.0},
            "history": [1200.0],
            "predictions": [1240.0],
        }));
        let view = SnapshotView::from_response("AAPL", &payload);

        let values: Vec<_> = view.metrics.iter().map(|m| (m.label.as_str(), m.value.as_str())).collect();
        assert_eq!(
            values,
            vec![("Price", "$1,234.50"), ("P/E", "19.235"), ("EPS", "6"), ("D/E (%)", "—")]
        );
        assert_eq!(view.chart.len(), 3);
        assert!(view.has_chart());
        assert!(view.report_html.is_none());
    }

    #[test]
    fn empty_payload_degrades() {
        let view = SnapshotView::from_response("ZZZ", &StockResponse::default());
        assert!(view.metrics.iter().all(|m| m.value == crate::format::PLACEHOLDER));
        assert!(view.chart.is_empty());
        assert!(!view.has_chart());
        assert!(view.news.is_empty());
        assert!(view.report_markdown.is_none());
    }

    #[test]
    fn report_is_rendered_to_markup() {
        let payload = StockResponse::from_value(json!({"llm_report": "## Outlook\n**Buy**"}));
        let view = SnapshotView::from_response("MSFT", &payload);
        assert_eq!(view.report_markdown.as_deref(), Some("## Outlook\n**Buy**"));
        assert_eq!(
            view.report_html.as_deref(),
            Some("<h2>Outlook</h2>\n<strong>Buy</strong>")
        );
    }

    #[test]
    fn user_turn_echoes_ticker() {
        let msg = ChatMessage::user("AAPL");
        assert_eq!(msg.role, Role::User);
        match msg.view {
            ViewModel::User { text } => assert_eq!(text, "Show AAPL"),
            other => panic!("unexpected view: {other:?}"),
        }
    }
}
