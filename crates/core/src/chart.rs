//! Dual-line series for the history/forecast chart.

pub const NOW_LABEL: &str = "Now";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub label: String,
    pub history: Option<f64>,
    pub forecast: Option<f64>,
}

/// Concatenates history (`H1..Hn`), an optional `Now` bridge and the forecast (`+1..+m`).
///
/// The bridge row carries `current_price` in both columns so the two line segments
/// meet. It is emitted only when the price is finite. Input order is kept as-is and
/// NaN elements pass through untouched.
pub fn build_chart_rows(
    history: &[f64],
    predictions: &[f64],
    current_price: Option<f64>,
) -> Vec<ChartRow> {
    let bridge = current_price.filter(|p| p.is_finite());
    let mut rows = Vec::with_capacity(history.len() + predictions.len() + 1);

    rows.extend(history.iter().enumerate().map(|(i, &v)| ChartRow {
        label: format!("H{}", i + 1),
        history: Some(v),
        forecast: None,
    }));

    if let Some(price) = bridge {
        rows.push(ChartRow {
            label: NOW_LABEL.to_string(),
            history: Some(price),
            forecast: Some(price),
        });
    }

    rows.extend(predictions.iter().enumerate().map(|(i, &v)| ChartRow {
        label: format!("+{}", i + 1),
        history: None,
        forecast: Some(v),
    }));

    rows
}
