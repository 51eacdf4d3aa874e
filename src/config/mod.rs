use crate::error::{KitchenError, Result};
use crate::kitchen::order::CookTimes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod loader;

pub use loader::ConfigLoader;

/// Kitchen settings: how many burners the gas cooker has and how long each part cooks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenConfig {
    /// Number of burners on the shared gas cooker
    #[serde(default = "default_burners")]
    pub burners: usize,

    /// Time a bread spends on its burner
    #[serde(with = "humantime_serde", default = "default_bread_bake_time")]
    pub bread_bake_time: Duration,

    /// Time a sausage spends on its burner
    #[serde(with = "humantime_serde", default = "default_sausage_fry_time")]
    pub sausage_fry_time: Duration,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            burners: default_burners(),
            bread_bake_time: default_bread_bake_time(),
            sausage_fry_time: default_sausage_fry_time(),
        }
    }
}

fn default_burners() -> usize {
    8
}

fn default_bread_bake_time() -> Duration {
    Duration::from_millis(1000)
}

fn default_sausage_fry_time() -> Duration {
    Duration::from_millis(1500)
}

impl KitchenConfig {
    pub fn with_burners(mut self, burners: usize) -> Self {
        self.burners = burners;
        self
    }

    pub fn with_cook_times(mut self, bread: Duration, sausage: Duration) -> Self {
        self.bread_bake_time = bread;
        self.sausage_fry_time = sausage;
        self
    }

    pub fn cook_times(&self) -> CookTimes {
        CookTimes {
            bread: self.bread_bake_time,
            sausage: self.sausage_fry_time,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.burners == 0 {
            return Err(KitchenError::Config(
                "the gas cooker needs at least one burner".to_string(),
            ));
        }
        if self.bread_bake_time.is_zero() {
            return Err(KitchenError::Config(
                "bread_bake_time must be greater than zero".to_string(),
            ));
        }
        if self.sausage_fry_time.is_zero() {
            return Err(KitchenError::Config(
                "sausage_fry_time must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `CAFETERIA_*` overrides looked up through `lookup`
    pub fn merge_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(burners) = lookup("CAFETERIA_BURNERS") {
            self.burners = burners.trim().parse().map_err(|_| {
                KitchenError::Config(format!("CAFETERIA_BURNERS is not a number: {burners}"))
            })?;
        }

        for (key, slot) in [
            ("CAFETERIA_BREAD_BAKE_TIME", &mut self.bread_bake_time),
            ("CAFETERIA_SAUSAGE_FRY_TIME", &mut self.sausage_fry_time),
        ] {
            if let Some(value) = lookup(key) {
                *slot = humantime::parse_duration(value.trim())
                    .map_err(|e| KitchenError::Config(format!("{key}: {e}")))?;
            }
        }

        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_with(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_cafeteria() {
        let config = KitchenConfig::default();

        assert_eq!(config.burners, 8);
        assert_eq!(config.bread_bake_time, Duration::from_secs(1));
        assert_eq!(config.sausage_fry_time, Duration::from_millis(1500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: KitchenConfig = toml::from_str("burners = 2").unwrap();

        assert_eq!(config.burners, 2);
        assert_eq!(config.sausage_fry_time, Duration::from_millis(1500));
    }

    #[test]
    fn test_humantime_durations() {
        let config: KitchenConfig =
            toml::from_str("bread_bake_time = \"250ms\"\nsausage_fry_time = \"2s\"").unwrap();

        assert_eq!(config.bread_bake_time, Duration::from_millis(250));
        assert_eq!(config.sausage_fry_time, Duration::from_secs(2));
    }

    #[test]
    fn test_zero_burners_rejected() {
        let config = KitchenConfig::default().with_burners(0);

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("at least one burner"));
    }

    #[test]
    fn test_zero_cook_time_rejected() {
        let config = KitchenConfig::default().with_cook_times(Duration::ZERO, Duration::from_secs(1));

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CAFETERIA_BURNERS", "3"),
            ("CAFETERIA_SAUSAGE_FRY_TIME", "40ms"),
        ]
        .into_iter()
        .collect();
        let mut config = KitchenConfig::default();

        config
            .merge_env_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.burners, 3);
        assert_eq!(config.bread_bake_time, Duration::from_secs(1));
        assert_eq!(config.sausage_fry_time, Duration::from_millis(40));
    }

    #[test]
    fn test_merge_env_rejects_garbage() {
        let mut config = KitchenConfig::default();

        let err = config
            .merge_env_with(|key| (key == "CAFETERIA_BURNERS").then(|| "many".to_string()))
            .unwrap_err();

        assert!(matches!(err, KitchenError::Config(_)));
    }
}
