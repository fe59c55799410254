//! Configuration for the aggregator and the printer worker.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Measurement name whose arrival flushes an identity's pending group.
pub const PRESENT_VALUE: &str = "presentValue";
/// Measurement series token every line starts with.
pub const DEFAULT_PREFIX: &str = "bacnet";
/// Name given to the printer worker thread.
pub const DEFAULT_THREAD_NAME: &str = "bacnet-lp-printer";

/// Aggregator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Trigger measurement name.
    pub trigger: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            trigger: PRESENT_VALUE.to_string(),
        }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger.trim().is_empty() {
            return Err(ConfigError::EmptyTrigger);
        }
        Ok(())
    }
}

/// Printer worker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    pub aggregator: AggregatorConfig,
    /// Measurement series token, e.g. `bacnet`.
    pub prefix: String,
    pub thread_name: String,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            aggregator: AggregatorConfig::default(),
            prefix: DEFAULT_PREFIX.to_string(),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl PrinterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aggregator.validate()?;
        if self.prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        if self.thread_name.contains('\0') {
            return Err(ConfigError::Invalid {
                reason: "thread name cannot contain NUL bytes".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = PrinterConfig::default();
        assert_eq!(cfg.aggregator.trigger, "presentValue");
        assert_eq!(cfg.prefix, "bacnet");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_names() {
        let mut cfg = PrinterConfig::default();
        cfg.aggregator.trigger = "  ".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyTrigger)));

        let cfg = PrinterConfig {
            prefix: String::new(),
            ..PrinterConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyPrefix)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: PrinterConfig = serde_json::from_str(r#"{"prefix": "hvac"}"#).unwrap();
        assert_eq!(cfg.prefix, "hvac");
        assert_eq!(cfg.aggregator.trigger, PRESENT_VALUE);
        assert_eq!(cfg.thread_name, DEFAULT_THREAD_NAME);
    }
}
