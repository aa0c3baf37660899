use crate::chart::ChartRow;
use crate::domain::view::{ChatMessage, ErrorView, SnapshotView, ViewModel};
use crate::format::format_currency;
use crate::markdown::escape_html;
use crate::render::EXAMPLE_TICKERS;
use std::fmt::Write;

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 240.0;
const CHART_PAD: f64 = 12.0;
const HISTORY_STROKE: &str = "#2563eb";
const FORECAST_STROKE: &str = "#f97316";

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;background:#f8fafc;margin:0;color:#0f172a}\
header,main{max-width:48rem;margin:0 auto;padding:.75rem 1rem}\
.turn{display:flex;margin:.75rem 0}.turn.user{justify-content:flex-end}\
.bubble{max-width:85%;border-radius:1rem;padding:.75rem 1rem;font-size:.875rem;background:#fff;border:1px solid #e2e8f0}\
.user .bubble{background:#0f172a;color:#fff}\
.error .bubble{background:#fef2f2;color:#7f1d1d;border-color:#fecaca}\
.metrics{display:grid;grid-template-columns:repeat(4,1fr);gap:.75rem}\
.metric{background:#f8fafc;border:1px solid #e2e8f0;border-radius:.75rem;padding:.75rem}\
.muted{color:#64748b;font-size:.75rem}.chip{font-size:.75rem;border:1px solid #e2e8f0;border-radius:999px;padding:.25rem .75rem;margin:.125rem}";

/// Renders the whole chat log as a standalone HTML document.
pub fn render_transcript(messages: &[ChatMessage], loading: bool) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Stock Analyst Chat</title>");
    let _ = write!(out, "<style>{STYLE}</style></head><body>");
    out.push_str(
        "<header><strong>Stock Analyst Chat</strong>\
         <div class=\"muted\">Type a ticker to get metrics, news &amp; a forecast chart.</div></header>",
    );

    out.push_str("<main>");
    if messages.is_empty() {
        render_welcome(&mut out);
    }
    for message in messages {
        render_message(&mut out, message);
    }
    if loading {
        out.push_str("<div class=\"turn\"><div class=\"bubble muted\">Thinking…</div></div>");
    }
    out.push_str("</main></body></html>\n");
    out
}

fn render_welcome(out: &mut String) {
    out.push_str("<section class=\"bubble\"><strong>Try one of these tickers</strong><div>");
    for ticker in EXAMPLE_TICKERS {
        let _ = write!(out, "<span class=\"chip\">{ticker}</span>");
    }
    out.push_str("</div></section>");
}

fn render_message(out: &mut String, message: &ChatMessage) {
    let at = message.created_at.format("%H:%M:%S");
    match &message.view {
        ViewModel::User { text } => {
            let _ = write!(
                out,
                "<div class=\"turn user\"><div class=\"bubble\" title=\"{at}\">{}</div></div>",
                escape_html(text)
            );
        }
        ViewModel::Snapshot(view) => render_snapshot(out, view),
        ViewModel::Error(err) => render_error(out, err),
    }
}

fn render_error(out: &mut String, err: &ErrorView) {
    let _ = write!(
        out,
        "<div class=\"turn error\"><div class=\"bubble\"><strong>{}</strong><div class=\"muted\">{}</div>",
        escape_html(&err.title),
        escape_html(&err.detail)
    );
    if let Some(hint) = &err.hint {
        let _ = write!(out, "<div>Hint: {}</div>", escape_html(hint));
    }
    out.push_str("</div></div>");
}

fn render_snapshot(out: &mut String, view: &SnapshotView) {
    let _ = write!(
        out,
        "<div class=\"turn assistant\"><div class=\"bubble\"><h2>{} — Stock Snapshot</h2><div class=\"metrics\">",
        escape_html(&view.ticker)
    );
    for metric in &view.metrics {
        let _ = write!(
            out,
            "<div class=\"metric\"><div class=\"muted\">{}</div><strong>{}</strong></div>",
            escape_html(&metric.label),
            escape_html(&metric.value)
        );
    }
    out.push_str("</div>");

    out.push_str("<h3>10-Step Forecast</h3>");
    if view.has_chart() {
        out.push_str(&chart_svg(&view.chart));
    } else {
        out.push_str("<div class=\"muted\">No forecast data.</div>");
    }

    out.push_str("<h3>Latest Headlines</h3>");
    if view.news.is_empty() {
        out.push_str("<div class=\"muted\">No news available.</div>");
    } else {
        out.push_str("<ul>");
        for item in &view.news {
            let _ = write!(out, "<li><strong>{}</strong>", escape_html(&item.title));
            if let Some(summary) = &item.summary {
                let _ = write!(out, "<div class=\"muted\">{}</div>", escape_html(summary));
            }
            out.push_str("</li>");
        }
        out.push_str("</ul>");
    }

    // Already escaped by the markdown renderer.
    if let Some(report) = &view.report_html {
        let _ = write!(
            out,
            "<details><summary>Detailed Report <span class=\"muted\">(LLM)</span></summary><div class=\"markdown\">{report}</div></details>"
        );
    }
    out.push_str("</div></div>");
}

/// Inline SVG with a solid history line and a dashed forecast line.
fn chart_svg(rows: &[ChartRow]) -> String {
    let finite = rows
        .iter()
        .flat_map(|r| [r.history, r.forecast])
        .flatten()
        .filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let mut svg = format!(
        "<svg viewBox=\"0 0 {CHART_WIDTH} {CHART_HEIGHT}\" width=\"100%\" role=\"img\" aria-label=\"History and forecast\">"
    );
    if lo.is_finite() && hi.is_finite() {
        let span = if hi > lo { hi - lo } else { 1.0 };
        let step = (CHART_WIDTH - 2.0 * CHART_PAD) / (rows.len().saturating_sub(1).max(1)) as f64;
        let point = |i: usize, v: f64| {
            let x = CHART_PAD + step * i as f64;
            let y = CHART_HEIGHT - CHART_PAD - (v - lo) / span * (CHART_HEIGHT - 2.0 * CHART_PAD);
            format!("{x:.1},{y:.1}")
        };
        let line = |pick: fn(&ChartRow) -> Option<f64>| {
            rows.iter()
                .enumerate()
                .filter_map(|(i, r)| pick(r).filter(|v| v.is_finite()).map(|v| point(i, v)))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let _ = write!(
            svg,
            "<polyline fill=\"none\" stroke=\"{HISTORY_STROKE}\" stroke-width=\"2\" points=\"{}\"/>",
            line(|r| r.history)
        );
        let _ = write!(
            svg,
            "<polyline fill=\"none\" stroke=\"{FORECAST_STROKE}\" stroke-width=\"2\" stroke-dasharray=\"6 4\" points=\"{}\"/>",
            line(|r| r.forecast)
        );
        let _ = write!(
            svg,
            "<text x=\"{CHART_PAD}\" y=\"{CHART_PAD}\" font-size=\"10\">{}</text><text x=\"{CHART_PAD}\" y=\"{}\" font-size=\"10\">{}</text>",
            escape_html(&format_currency(Some(hi))),
            CHART_HEIGHT - 2.0,
            escape_html(&format_currency(Some(lo)))
        );
    }
    svg.push_str("</svg>");
    svg
}
