//! Dashboard configuration.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields the stock listing dashboard. Example:
//!
//! ```yaml
//! rename_map:
//!   price: valor
//!   model: modelo
//! price_column: valor
//! group_by: modelo
//! histogram_bins: 30
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::{
    chart::DEFAULT_HISTOGRAM_BINS,
    normalize::{DEFAULT_PRICE_COLUMN, RenameMap, default_rename_map},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Source column name -> canonical name.
    pub rename_map: RenameMap,
    /// Canonical column holding `23.990`-style prices.
    pub price_column: Option<String>,
    /// Column the model selection filters on.
    pub model_column: String,
    /// Categorical key for the mean-per-group bars.
    pub group_by: Option<String>,
    /// Numeric column averaged per group and binned for the histogram.
    pub numeric_target: Option<String>,
    /// Fuel-type column; detected from column names when unset.
    pub fuel_column: Option<String>,
    pub histogram_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            rename_map: default_rename_map(),
            price_column: Some(DEFAULT_PRICE_COLUMN.to_string()),
            model_column: DEFAULT_MODEL_COLUMN.to_string(),
            group_by: Some(DEFAULT_MODEL_COLUMN.to_string()),
            numeric_target: Some(DEFAULT_PRICE_COLUMN.to_string()),
            fuel_column: None,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

pub const DEFAULT_MODEL_COLUMN: &str = "modelo";

/// Canonical name the fuel matcher tries before falling back to name hints.
pub const CANONICAL_FUEL_COLUMN: &str = "combustible";

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        Self::from_yaml_str(&raw).with_context(|| format!("Parsing config file {path:?}"))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: DashboardConfig = if raw.trim().is_empty() {
            DashboardConfig::default()
        } else {
            serde_yaml::from_str(raw)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.histogram_bins == 0 {
            bail!("histogram_bins must be at least 1");
        }
        if self.model_column.trim().is_empty() {
            bail!("model_column cannot be empty");
        }
        for (from, to) in &self.rename_map {
            if from.trim().is_empty() || to.trim().is_empty() {
                bail!("rename_map entries need non-empty names (got '{from}' -> '{to}')");
            }
        }
        Ok(())
    }

    pub fn price_column(&self) -> Option<&str> {
        self.price_column.as_deref()
    }

    pub fn model_column(&self) -> &str {
        &self.model_column
    }

    pub fn group_by(&self) -> Option<&str> {
        self.group_by.as_deref()
    }

    pub fn numeric_target(&self) -> Option<&str> {
        self.numeric_target.as_deref()
    }

    /// Columns the loader must keep as raw text: the price column and every
    /// source name that renames to it.
    pub fn verbatim_columns(&self) -> Vec<String> {
        let Some(price) = self.price_column() else {
            return Vec::new();
        };
        let mut columns = vec![price.to_string()];
        columns.extend(
            self.rename_map
                .iter()
                .filter(|(_, to)| to.as_str() == price)
                .map(|(from, _)| from.clone()),
        );
        columns
    }
}
