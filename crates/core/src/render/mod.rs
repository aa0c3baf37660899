//! Stateless views over a snapshot of the chat log.

pub mod html;

pub use html::render_transcript;

/// Tickers suggested while the log is empty.
pub const EXAMPLE_TICKERS: [&str; 8] = [
    "AAPL", "MSFT", "GOOGL", "TSLA", "NFLX", "NVDA", "RELIANCE", "TCS",
];
