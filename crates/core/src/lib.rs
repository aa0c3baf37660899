pub mod chart;
pub mod chat;
pub mod client;
pub mod domain;
pub mod format;
pub mod markdown;
pub mod render;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    /// Used when neither the runtime environment nor the build environment sets a base URL.
    pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base: String,
        pub request_timeout: Option<Duration>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let request_timeout = match std::env::var("STOCK_API_TIMEOUT_SECS") {
                Ok(s) if !s.trim().is_empty() => {
                    let secs = s
                        .trim()
                        .parse::<u64>()
                        .with_context(|| format!("STOCK_API_TIMEOUT_SECS is not an integer: {s}"))?;
                    Some(Duration::from_secs(secs))
                }
                _ => None,
            };

            Ok(Self {
                api_base: resolve_api_base(std::env::var("STOCK_API_BASE").ok()),
                request_timeout,
                sentry_dsn: std::env::var("SENTRY_DSN").ok().filter(|s| !s.is_empty()),
            })
        }

        pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
            self.api_base = api_base.into();
            self
        }
    }

    // Runtime env wins over the value baked in at build time.
    fn resolve_api_base(runtime: Option<String>) -> String {
        runtime
            .filter(|s| !s.trim().is_empty())
            .or_else(|| option_env!("STOCK_API_BASE").map(str::to_string))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

}
