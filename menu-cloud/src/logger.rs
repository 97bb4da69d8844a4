//! Logging Infrastructure
//!
//! `tracing-subscriber` with an env filter; `RUST_LOG` overrides the
//! configured level. Optional JSON output and daily-rolling log files.

use std::path::Path;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

fn default_filter(level: &str) -> String {
    format!("menu_cloud={level},shared={level},tower_http=info,sqlx=warn")
}

/// Initialize the global subscriber
pub fn init_logger(level: &str, json: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(level)))
        .context("Invalid log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_line_number(false);

    let result = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(Path::new(dir))
                .with_context(|| format!("Failed to create log directory {dir}"))?;
            let appender = tracing_appender::rolling::daily(dir, "menu-cloud");
            if json {
                builder.json().with_writer(appender).with_ansi(false).try_init()
            } else {
                builder.with_writer(appender).with_ansi(false).try_init()
            }
        }
        None if json => builder.json().try_init(),
        None => builder.try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize logger: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(default_filter("debug")).is_ok());
    }
}
