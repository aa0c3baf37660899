use stockchat_core::chart::ChartRow;
use stockchat_core::domain::view::{ChatMessage, ErrorView, SnapshotView, ViewModel};
use stockchat_core::format::format_currency;
use stockchat_core::render::EXAMPLE_TICKERS;

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn banner() -> String {
    format!(
        "Stock Analyst Chat\nType a ticker to get metrics, news & a forecast chart (:quit to exit).\nTry one of these tickers: {}\n",
        EXAMPLE_TICKERS.join(" ")
    )
}

/// Typing indicator shown while `pending` requests are outstanding.
pub fn thinking(pending: usize) -> String {
    if pending > 1 {
        format!("Thinking… ({pending} pending)\n")
    } else {
        "Thinking…\n".to_string()
    }
}

pub fn render_message(message: &ChatMessage) -> String {
    match &message.view {
        ViewModel::User { text } => {
            format!("[{}] you › {text}\n", message.created_at.format("%H:%M:%S"))
        }
        ViewModel::Snapshot(view) => render_snapshot(view),
        ViewModel::Error(err) => render_error(err),
    }
}

fn render_error(err: &ErrorView) -> String {
    let mut out = format!("! {}\n  {}\n", err.title, err.detail);
    if let Some(hint) = &err.hint {
        out.push_str(&format!("  Hint: {hint}\n"));
    }
    out
}

fn render_snapshot(view: &SnapshotView) -> String {
    let mut out = format!("{} — Stock Snapshot\n", view.ticker);

    let metrics: Vec<_> = view
        .metrics
        .iter()
        .map(|m| format!("{} {}", m.label, m.value))
        .collect();
    out.push_str(&format!("  {}\n", metrics.join(" | ")));

    out.push_str("  10-Step Forecast\n");
    if view.has_chart() {
        out.push_str(&render_chart(&view.chart));
    } else {
        out.push_str("    No forecast data.\n");
    }

    out.push_str("  Latest Headlines\n");
    if view.news.is_empty() {
        out.push_str("    No news available.\n");
    }
    for item in &view.news {
        out.push_str(&format!("    • {}\n", item.title));
        if let Some(summary) = &item.summary {
            out.push_str(&format!("      {summary}\n"));
        }
    }

    if let Some(report) = &view.report_markdown {
        out.push_str("  Detailed Report (LLM)\n");
        for line in report.lines() {
            out.push_str(&format!("    {line}\n"));
        }
    }
    out
}

/// Two aligned sparklines: history on top, forecast below.
fn render_chart(rows: &[ChartRow]) -> String {
    let (lo, hi) = rows
        .iter()
        .flat_map(|r| [r.history, r.forecast])
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let history = sparkline(rows.iter().map(|r| r.history), lo, hi);
    let forecast = sparkline(rows.iter().map(|r| r.forecast), lo, hi);
    format!(
        "    history  {history}\n    forecast {forecast}\n    range    {} – {}\n",
        format_currency(Some(lo)),
        format_currency(Some(hi))
    )
}

fn sparkline(values: impl Iterator<Item = Option<f64>>, lo: f64, hi: f64) -> String {
    values
        .map(|v| match v {
            Some(v) if v.is_finite() => LEVELS[level(v, lo, hi)],
            _ => ' ',
        })
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn level(v: f64, lo: f64, hi: f64) -> usize {
    if hi <= lo {
        return LEVELS.len() / 2;
    }
    let scaled = (v - lo) / (hi - lo) * (LEVELS.len() - 1) as f64;
    (scaled.round() as usize).min(LEVELS.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockchat_core::chart::build_chart_rows;
    use stockchat_core::domain::payload::StockResponse;

    fn snapshot(body: serde_json::Value) -> ChatMessage {
        let payload = StockResponse::from_value(body);
        ChatMessage::assistant(ViewModel::Snapshot(Box::new(SnapshotView::from_response(
            "NVDA", &payload,
        ))))
    }

    #[test]
    fn sparkline_spans_levels() {
        let line = sparkline([Some(0.0), Some(7.0), None, Some(3.5)].into_iter(), 0.0, 7.0);
        assert_eq!(line, "▁█ ▅");
    }

    #[test]
    fn flat_series_uses_middle_level() {
        assert_eq!(level(5.0, 5.0, 5.0), 4);
    }

    #[test]
    fn chart_rows_align_history_and_forecast() {
        let rows = build_chart_rows(&[1.0, 2.0], &[3.0], Some(2.0));
        let chart = render_chart(&rows);
        let lines: Vec<_> = chart.lines().collect();
        assert_eq!(lines[0], "    history  ▁▅▅");
        assert_eq!(lines[1], "    forecast   ▅█");
        assert_eq!(lines[2], "    range    $1.00 – $3.00");
    }

    #[test]
    fn snapshot_lists_metrics_news_and_report() {
        let text = render_message(&snapshot(serde_json::json!({
            "stock_data": {"price": 900.0, "eps": 2.5},
            "history": [880.0, 890.0],
            "predictions": [910.0],
            "news": [{"title": "Chips", "summary": "More chips"}],
            "llm_report": "# Outlook\nStrong",
        })));
        assert!(text.starts_with("NVDA — Stock Snapshot\n"));
        assert!(text.contains("Price $900.00 | P/E — | EPS 2.5 | D/E (%) —"));
        assert!(text.contains("• Chips"));
        assert!(text.contains("More chips"));
        assert!(text.contains("    # Outlook\n    Strong\n"));
    }

    #[test]
    fn degraded_snapshot_uses_placeholders() {
        let text = render_message(&snapshot(serde_json::json!({})));
        assert!(text.contains("No forecast data."));
        assert!(text.contains("No news available."));
        assert!(!text.contains("Detailed Report"));
    }

    #[test]
    fn thinking_counts_overlapping_requests() {
        assert_eq!(thinking(1), "Thinking…\n");
        assert_eq!(thinking(3), "Thinking… (3 pending)\n");
    }

    #[test]
    fn error_lists_hint() {
        let err = ErrorView {
            title: "Request failed".to_string(),
            detail: "HTTP 404".to_string(),
            hint: Some("Check it.".to_string()),
        };
        let text = render_message(&ChatMessage::assistant(ViewModel::Error(err)));
        assert_eq!(text, "! Request failed\n  HTTP 404\n  Hint: Check it.\n");
    }
}
