//! Configuration types for a ZeroBond deployment.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Result, ZerobondError, constants};

/// Settlement engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The only account allowed to bind pools to markets.
    pub operator: AccountId,
    /// LP fee (pips) assigned to each hooked pool on initialization.
    #[serde(default = "default_initial_pool_fee")]
    pub initial_pool_fee: u32,
}

fn default_initial_pool_fee() -> u32 {
    constants::INITIAL_POOL_FEE
}

impl EngineConfig {
    /// Engine config with the default initial fee.
    #[must_use]
    pub fn new(operator: AccountId) -> Self {
        Self {
            operator,
            initial_pool_fee: constants::INITIAL_POOL_FEE,
        }
    }
}

/// Configuration for a full deployment (registry + engine + pool manager).
///
/// Component account ids are derived from the labels, so two deployments
/// built from the same config share the same addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub engine: EngineConfig,
    #[serde(default = "default_registry_label")]
    pub registry_label: String,
    #[serde(default = "default_engine_label")]
    pub engine_label: String,
    #[serde(default = "default_pool_manager_label")]
    pub pool_manager_label: String,
}

fn default_registry_label() -> String {
    constants::DEFAULT_REGISTRY_LABEL.to_string()
}

fn default_engine_label() -> String {
    constants::DEFAULT_ENGINE_LABEL.to_string()
}

fn default_pool_manager_label() -> String {
    constants::DEFAULT_POOL_MANAGER_LABEL.to_string()
}

impl DeploymentConfig {
    /// Deployment config with default labels.
    #[must_use]
    pub fn new(operator: AccountId) -> Self {
        Self {
            engine: EngineConfig::new(operator),
            registry_label: default_registry_label(),
            engine_label: default_engine_label(),
            pool_manager_label: default_pool_manager_label(),
        }
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check ranges and label sanity.
    pub fn validate(&self) -> Result<()> {
        if self.engine.initial_pool_fee > constants::MAX_LP_FEE {
            return Err(ZerobondError::Configuration(format!(
                "initial_pool_fee {} exceeds maximum {}",
                self.engine.initial_pool_fee,
                constants::MAX_LP_FEE
            )));
        }
        let labels = [
            &self.registry_label,
            &self.engine_label,
            &self.pool_manager_label,
        ];
        if labels.iter().any(|l| l.trim().is_empty()) {
            return Err(ZerobondError::Configuration(
                "component labels must be non-empty".into(),
            ));
        }
        if self.registry_label == self.engine_label
            || self.registry_label == self.pool_manager_label
            || self.engine_label == self.pool_manager_label
        {
            return Err(ZerobondError::Configuration(
                "component labels must be distinct".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn registry_address(&self) -> AccountId {
        AccountId::derived(&self.registry_label)
    }

    #[must_use]
    pub fn engine_address(&self) -> AccountId {
        AccountId::derived(&self.engine_label)
    }

    #[must_use]
    pub fn pool_manager_address(&self) -> AccountId {
        AccountId::derived(&self.pool_manager_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let op = AccountId::derived("operator");
        let cfg = DeploymentConfig::new(op);
        assert_eq!(cfg.engine.operator, op);
        assert_eq!(cfg.engine.initial_pool_fee, 3_000);
        assert!(cfg.validate().is_ok());
        assert_ne!(cfg.registry_address(), cfg.engine_address());
    }

    #[test]
    fn from_json_fills_defaults() {
        let op = AccountId::derived("operator");
        let json = format!(r#"{{"engine":{{"operator":"{}"}}}}"#, op.0);
        let cfg = DeploymentConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg, DeploymentConfig::new(op));
    }

    #[test]
    fn fee_above_max_rejected() {
        let mut cfg = DeploymentConfig::new(AccountId::new());
        cfg.engine.initial_pool_fee = constants::MAX_LP_FEE + 1;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ZerobondError::Configuration(_)));
    }

    #[test]
    fn duplicate_labels_rejected() {
        let mut cfg = DeploymentConfig::new(AccountId::new());
        cfg.engine_label = cfg.registry_label.clone();
        assert!(cfg.validate().is_err());
        cfg.engine_label = "  ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = DeploymentConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ZerobondError::Serialization(_)));
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = DeploymentConfig::new(AccountId::new());
        let json = serde_json::to_string(&cfg).unwrap();
        let back = DeploymentConfig::from_json_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
