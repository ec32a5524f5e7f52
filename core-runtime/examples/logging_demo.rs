//! Demonstrates logging configuration and host sink forwarding.
//!
//! Run with:
//!
//! ```sh
//! cargo run -p core-runtime --example logging_demo
//! ```

use bridge_traits::time::{ConsoleLogger, LogLevel};
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LoggingConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Pretty)
        .with_level(LogLevel::Debug)
        .with_logger_sink(Arc::new(ConsoleLogger {
            min_level: LogLevel::Debug,
        }));

    init_logging(config).expect("Failed to initialize logging");

    tracing::info!("Storefront core starting");
    tracing::debug!(product_id = 5, quantity = 2, "Dispatching cart add");
    tracing::warn!(status = 429, "Backend rate limited, retrying");

    // Sensitive fields should be redacted before they reach any log line
    let token = "very-secret-token";
    tracing::info!(token = %redact_if_sensitive("token", token), "Session restored");

    tracing::error!(reason = "Invalid credentials", "Login rejected");

    // Let the sink tasks drain before exit
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
}
