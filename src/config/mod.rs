//! Configuration loading and management

use crate::core::draft::DraftDefaults;
use crate::core::error::ConfigError;
use crate::core::method::MethodKind;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Defaults used when a fresh draft is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Weekday names preselected on a new draft
    #[serde(default = "default_active_days")]
    pub default_active_days: Vec<String>,

    /// Month names preselected on a new draft
    #[serde(default = "default_active_months")]
    pub default_active_months: Vec<String>,

    /// Tab shown when the form opens for a new method
    #[serde(default = "default_tab")]
    pub default_tab: MethodKind,
}

fn default_active_days() -> Vec<String> {
    DraftDefaults::default().active_days
}

fn default_active_months() -> Vec<String> {
    DraftDefaults::default().active_months
}

fn default_tab() -> MethodKind {
    MethodKind::Upi
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            default_active_days: default_active_days(),
            default_active_months: default_active_months(),
            default_tab: default_tab(),
        }
    }
}

/// Where and how to reach the remote payment-method API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Bearer token issued by the sign-in flow
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            auth_token: None,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaydeskConfig {
    #[serde(default)]
    pub form: FormConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

impl PaydeskConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            message: format!("{}: {}", path, e),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject defaults a draft could never hold
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_names(
            "form.default_active_days",
            &self.form.default_active_days,
            |n| n.parse::<chrono::Weekday>().is_ok(),
        )?;
        check_names(
            "form.default_active_months",
            &self.form.default_active_months,
            |n| n.parse::<chrono::Month>().is_ok(),
        )?;
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn draft_defaults(&self) -> DraftDefaults {
        DraftDefaults {
            kind: self.form.default_tab,
            active_days: self.form.default_active_days.clone(),
            active_months: self.form.default_active_months.clone(),
        }
    }
}

fn check_names(
    field: &str,
    names: &[String],
    known: impl Fn(&str) -> bool,
) -> Result<(), ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: "must list at least one name".to_string(),
        });
    }
    match names.iter().find(|n| !known(n.as_str())) {
        Some(unknown) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("unknown name '{}'", unknown),
        }),
        None => Ok(()),
    }
}
