//! Application configuration
//!
//! This module handles process-wide settings that do not belong to the kitchen.

use std::path::PathBuf;

/// Application configuration structure
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Kitchen configuration file given on the command line
    pub config_file: Option<PathBuf>,
    /// Directory searched for `cafeteria.toml`
    pub working_dir: Option<PathBuf>,
    /// Burner count given on the command line
    pub burners: Option<usize>,
}

impl AppConfig {
    /// Create a new application configuration
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            config_file: None,
            working_dir: std::env::current_dir().ok(),
            burners: None,
        }
    }

    /// Use an explicit kitchen configuration file
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    /// Override the configured number of burners
    pub fn with_burners(mut self, burners: Option<usize>) -> Self {
        self.burners = burners;
        self
    }

    /// Get the log level string based on verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_follows_verbosity() {
        assert_eq!(AppConfig::new(0).log_level(), "info");
        assert_eq!(AppConfig::new(1).log_level(), "debug");
        assert_eq!(AppConfig::new(2).log_level(), "trace");
        assert_eq!(AppConfig::new(7).log_level(), "trace");
    }
}
