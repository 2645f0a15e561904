use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const TARGETS: [&str; 3] = ["doctools", "pdf_to_text", "analyze_excel"];

/// Default filter for a verbosity count; `RUST_LOG` wins when set.
pub fn default_filter(verbose: u8, quiet: bool) -> String {
    let level = match (quiet, verbose) {
        (true, _) => return "error".to_string(),
        (false, 0) => return "warn".to_string(),
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    // Library and both binaries; dependencies stay at `warn`.
    let mut directives = vec!["warn".to_string()];
    directives.extend(TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

/// Logs go to stderr; stdout carries the tool's output.
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, quiet))))
        .with(tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false))
        .try_init()?;

    Ok(())
}
