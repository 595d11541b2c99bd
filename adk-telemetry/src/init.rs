//! Telemetry initialization and configuration

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Console logging configuration.
///
/// `RUST_LOG` always wins over [`TelemetryConfig::default_filter`] when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Name attached to the startup event
    pub service_name: String,
    /// Filter directive used when `RUST_LOG` is absent or invalid
    #[serde(default = "default_filter")]
    pub default_filter: String,
    /// Emit newline-delimited JSON instead of human-readable lines
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

impl TelemetryConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into(), default_filter: default_filter(), json: false }
    }

    #[must_use]
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn env_filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&self.default_filter))
    }
}

/// Initialize console logging for an evaluation process
///
/// Only the first call installs a subscriber; later calls are no-ops.
///
/// # Example
/// ```
/// use adk_telemetry::{TelemetryConfig, init_telemetry};
/// init_telemetry(&TelemetryConfig::new("my-eval-run")).expect("Failed to initialize telemetry");
/// ```
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = config.env_filter()?;
    let mut outcome = Ok(());

    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(filter);
        let installed = if config.json {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_target(true))
                .try_init()
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_line_number(true),
                )
                .try_init()
        };

        match installed {
            Ok(()) => tracing::info!(service.name = %config.service_name, "Telemetry initialized"),
            Err(e) => outcome = Err(e),
        }
    });

    outcome.map_err(Into::into)
}
