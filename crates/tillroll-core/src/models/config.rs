//! Configuration structures for receipt normalization.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TillrollError};
use crate::receipt::rules::{MerchantCatalog, NoiseFilter};

/// Main configuration for the tillroll pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    /// Known retailers, scanned in order.
    pub catalog: MerchantCatalog,

    /// Phrases marking non-item rows.
    pub noise: NoiseFilter,

    /// Detection class labels the pipeline looks for.
    pub labels: FieldLabels,
}

/// Detection class labels, matched ignoring ASCII case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLabels {
    /// Summary label holding the service's vendor guess.
    pub vendor_name: String,

    /// Summary labels tried in order for the transaction time.
    pub receipt_time: Vec<String>,

    /// Line item label holding the description.
    pub item_name: String,

    /// Line item labels holding the amount; the first field carrying any of
    /// them is used.
    pub item_amount: Vec<String>,
}

impl Default for FieldLabels {
    fn default() -> Self {
        Self {
            vendor_name: "VENDOR_NAME".to_string(),
            receipt_time: vec![
                "TRANSACTION_DATE".to_string(),
                "INVOICE_RECEIPT_DATE".to_string(),
            ],
            item_name: "ITEM".to_string(),
            item_amount: vec!["PRICE".to_string(), "TOTAL".to_string()],
        }
    }
}

impl ReceiptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject configurations the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.labels.item_name.trim().is_empty() {
            return Err(TillrollError::Config("labels.item_name is empty".to_string()));
        }
        if self.labels.item_amount.iter().all(|l| l.trim().is_empty()) {
            return Err(TillrollError::Config(
                "labels.item_amount has no usable label".to_string(),
            ));
        }
        if let Some(entry) = self.catalog.entries().iter().find(|e| e.name.trim().is_empty()) {
            return Err(TillrollError::Config(format!(
                "catalog pattern {:?} has an empty name",
                entry.pattern
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: ReceiptConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ReceiptConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_labels() {
        let config: ReceiptConfig =
            serde_json::from_str(r#"{"labels": {"item_amount": ["AMOUNT"]}}"#).unwrap();
        assert_eq!(config.labels.item_amount, vec!["AMOUNT".to_string()]);
        assert_eq!(config.labels.item_name, "ITEM");
    }

    #[test]
    fn test_catalog_from_json_keeps_order() {
        let config: ReceiptConfig = serde_json::from_str(
            r#"{"catalog": [{"pattern": "corner", "name": "Corner Shop"}, {"pattern": "tesco", "name": "Tesco"}]}"#,
        )
        .unwrap();
        let names: Vec<_> = config.catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Corner Shop", "Tesco"]);
    }

    #[test]
    fn test_validate_rejects_blank_labels() {
        let mut config = ReceiptConfig::default();
        config.labels.item_amount = vec![" ".to_string()];
        assert!(matches!(config.validate(), Err(TillrollError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ReceiptConfig::default();
        config.catalog.push("corner", "Corner Shop");
        config.save(&path).unwrap();

        let loaded = ReceiptConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
