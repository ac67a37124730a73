use crate::{Environment, env_optional};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, prelude::*};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in main() before any fallible operations. Safe to call
/// multiple times.
///
/// Configuration:
/// - Shows file:line where errors occur
/// - Hides environment variables (less noise)
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    /// `LOG_FORMAT` when set to a known format, otherwise the environment default
    pub fn from_env(environment: &Environment) -> Self {
        match env_optional("LOG_FORMAT").map(|v| v.to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some("compact") => LogFormat::Compact,
            _ => Self::default_for(environment),
        }
    }

    pub fn default_for(environment: &Environment) -> Self {
        if environment.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Initialize tracing with environment-aware configuration and error span capture.
///
/// - **Production** (`APP_ENV=production`): JSON lines, `info` by default
/// - **Development** (default): pretty output, `debug` by default
///
/// Environment variables:
/// - `APP_ENV`: "production" for JSON logs (default: "development")
/// - `RUST_LOG`: override log levels (e.g., "warn", "domain_architecture=trace")
/// - `LOG_FORMAT`: force `json`, `pretty` or `compact`
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// Safe to call multiple times: later calls are ignored.
pub fn init_tracing(environment: &Environment) {
    let format = LogFormat::from_env(environment);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if environment.is_production() {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("debug")
        }
    });

    let registry = tracing_subscriber::registry()
        .with(tracing_error::ErrorLayer::default())
        .with(filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    match result {
        Ok(_) => info!(environment = ?environment, format = ?format, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }

    if let Some(raw) = env_optional("LOG_FORMAT") {
        if !matches!(raw.to_ascii_lowercase().as_str(), "json" | "pretty" | "compact") {
            warn!(log_format = %raw, "Unknown LOG_FORMAT, using environment default");
        }
    }
}
