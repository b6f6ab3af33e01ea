use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use prioicon_core::PriorityConfiguration;
use prioicon_dom::DomError;

use crate::debounce::DebounceDelays;
use crate::engine::ScanRoots;

/// Deployment configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON payload with priority overrides; defaults apply when unset
    pub priorities_path: Option<PathBuf>,
    pub scan_roots: ScanRoots,
    pub delays: DebounceDelays,
    /// Where to write the rendered stylesheet, if anywhere
    pub css_out: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    /// PRIOICON_SCAN_ROOTS is a `;`-separated selector list.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let priorities_path = lookup("PRIOICON_CONFIG")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let css_out = lookup("PRIOICON_CSS_OUT")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let scan_roots = match lookup("PRIOICON_SCAN_ROOTS") {
            Some(s) if !s.trim().is_empty() => {
                ScanRoots::parse(s.split(';').map(str::trim).filter(|s| !s.is_empty()))?
            }
            _ => ScanRoots::default(),
        };

        let defaults = DebounceDelays::default();
        let delays = DebounceDelays {
            mutation: parse_millis(
                &lookup,
                "PRIOICON_MUTATION_DEBOUNCE_MS",
                defaults.mutation,
            )?,
            navigation: parse_millis(
                &lookup,
                "PRIOICON_NAVIGATION_DEBOUNCE_MS",
                defaults.navigation,
            )?,
        };

        Ok(Config {
            priorities_path,
            scan_roots,
            delays,
            css_out,
        })
    }

    /// Resolve the priority configuration. An unreadable payload file
    /// resolves to the built-in defaults.
    pub fn load_priorities(&self) -> PriorityConfiguration {
        let Some(path) = &self.priorities_path else {
            return PriorityConfiguration::defaults();
        };
        match std::fs::read_to_string(path) {
            Ok(content) => PriorityConfiguration::resolve_json(Some(&content)),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                PriorityConfiguration::defaults()
            }
        }
    }

    /// Create a test configuration.
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Config {
            priorities_path: None,
            scan_roots: ScanRoots::default(),
            delays: DebounceDelays::default(),
            css_out: None,
        }
    }
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match lookup(var) {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::InvalidDelay {
                var,
                value: s.clone(),
            }),
        _ => Ok(default),
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("PRIOICON_SCAN_ROOTS: {0}")]
    InvalidScanRoot(#[from] DomError),

    #[error("{var}: debounce delay {value:?} is not a whole number of milliseconds")]
    InvalidDelay { var: &'static str, value: String },
}
