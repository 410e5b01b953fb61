//! ## Structure
//! Configuration of one analysis run, stored as YAML.
//!
//! ```text
//! ReportConfig
//!   ├── meta: Option<Meta>
//!   │   └── name: Option<String>
//!   ├── import: ImportConfig
//!   │   ├── header_scan_rows: usize
//!   │   └── required_columns: Vec<String>
//!   ├── report: ReportOptions
//!   │   ├── currency: String
//!   │   ├── file_name: String
//!   │   └── chart_top_n: usize
//!   └── filters: AnalysisFilter
//!       ├── destinations / hotels / authors / agencies / package_types
//!       └── date_range: Option<{ start, end }>
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::columns::required_column_names;
use crate::errors::{ConfigError, ConfigResult};
use crate::export::DEFAULT_FILE_NAME;
use crate::filter::AnalysisFilter;
use crate::import::ImportSettings;
use crate::schema::HEADER_SCAN_ROWS;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub meta: Option<Meta>,
    pub import: ImportConfig,
    pub report: ReportOptions,
    pub filters: AnalysisFilter,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ImportConfig {
    pub header_scan_rows: usize,
    pub required_columns: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: HEADER_SCAN_ROWS,
            required_columns: required_column_names(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReportOptions {
    pub currency: String,
    pub file_name: String,
    pub chart_top_n: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            currency: "BAM".to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            chart_top_n: 10,
        }
    }
}

impl ReportConfig {
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: ReportConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        info!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        fs::write(path, self.to_yaml()?)?;
        debug!("Wrote configuration to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.import.header_scan_rows == 0 {
            return Err(ConfigError::Invalid(
                "import.header_scan_rows must be at least 1".to_string(),
            ));
        }
        if self.import.required_columns.is_empty() {
            return Err(ConfigError::Invalid(
                "import.required_columns must not be empty".to_string(),
            ));
        }
        if self.report.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "report.file_name must not be empty".to_string(),
            ));
        }
        if let Some(range) = &self.filters.date_range {
            if range.start > range.end {
                return Err(ConfigError::Invalid(format!(
                    "filters.date_range starts after it ends ({} > {})",
                    range.start, range.end
                )));
            }
        }
        Ok(())
    }

    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            required_columns: self.import.required_columns.clone(),
            header_scan_rows: self.import.header_scan_rows,
        }
    }
}
