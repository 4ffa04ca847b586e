use eyre::WrapErr;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use slalink_config::{LogFormat, LogLevel, LoggingConfig};

/// Installs the global subscriber.
///
/// Directives in `RUST_LOG` take precedence over the configured level.
/// Fails if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> eyre::Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(config.log_level, directives.as_deref())?;

    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stdout()))
        .with_thread_ids(false);

    match config.log_format {
        LogFormat::Plaintext => builder.finish().try_init(),
        LogFormat::Json => builder.json().finish().try_init(),
    }
    .wrap_err("Failed to install the tracing subscriber")
}

fn build_filter(level: LogLevel, directives: Option<&str>) -> eyre::Result<EnvFilter> {
    match directives {
        Some(directives) if !directives.trim().is_empty() => EnvFilter::builder()
            .parse(directives)
            .wrap_err_with(|| format!("Invalid {} directives: {directives}", EnvFilter::DEFAULT_ENV)),

        _ => Ok(EnvFilter::new(level.as_str())),
    }
}
