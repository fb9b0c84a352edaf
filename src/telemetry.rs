use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    InvalidLogFilter { directive: String, source: ParseError },
    AlreadyInitialized(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidLogFilter { directive, .. } => write!(
                f,
                "APP_LOG_LEVEL '{}' is not a valid tracing directive",
                directive
            ),
            TelemetryError::AlreadyInitialized(err) => {
                write!(f, "matching logger could not be installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidLogFilter { source, .. } => Some(source),
            TelemetryError::AlreadyInitialized(err) => Some(&**err),
        }
    }
}

/// Where the active log filter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOrigin {
    RustLog,
    AppLogLevel,
}

/// Install the global subscriber, writing to stderr so stdout stays parseable.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let (filter, origin) = select_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInitialized)?;

    tracing::debug!(?origin, "log filter selected");
    Ok(())
}

/// `RUST_LOG` wins when it parses; otherwise the configured level applies.
fn select_filter(config: &TelemetryConfig) -> Result<(EnvFilter, FilterOrigin), TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok((filter, FilterOrigin::RustLog));
    }

    EnvFilter::try_new(&config.log_level)
        .map(|filter| (filter, FilterOrigin::AppLogLevel))
        .map_err(|source| TelemetryError::InvalidLogFilter {
            directive: config.log_level.clone(),
            source,
        })
}
