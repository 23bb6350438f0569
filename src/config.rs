//! Loader configuration
//!
//! Handles parsing of `.dss-loader.toml` configuration files and environment
//! variable overrides. Credential fallback (warehouse-specific credentials
//! "or" platform defaults) is resolved once, up front, via
//! [`LoaderConfig::resolve`]; nothing downstream looks at raw sections again.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DssError, DssResult};

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".dss-loader.toml";

/// Default working directory for extract output
pub const DEFAULT_WORK_DIR: &str = "tmp";

/// Environment variable for the warehouse endpoint URL
pub const ENV_WAREHOUSE_URL: &str = "DSS_WAREHOUSE_URL";

/// Environment variable for the warehouse username
pub const ENV_WAREHOUSE_USERNAME: &str = "DSS_WAREHOUSE_USERNAME";

/// Environment variable for the warehouse password
pub const ENV_WAREHOUSE_PASSWORD: &str = "DSS_WAREHOUSE_PASSWORD";

/// Environment variable for the physical table-name prefix
pub const ENV_TABLE_PREFIX: &str = "DSS_TABLE_PREFIX";

/// Environment variable for the extract working directory
pub const ENV_WORK_DIR: &str = "DSS_WORK_DIR";

/// Warehouse connection section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WarehouseSection {
    /// Endpoint URL (e.g. "postgresql://warehouse.internal:5433/dwh")
    #[serde(default)]
    pub url: Option<String>,

    /// Warehouse-specific username; falls back to `[defaults]`
    #[serde(default)]
    pub username: Option<String>,

    /// Warehouse-specific password; falls back to `[defaults]`
    #[serde(default)]
    pub password: Option<String>,
}

/// Platform-wide fallback credentials
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsSection {
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

/// Load/extract behavior section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSection {
    /// Optional infix for physical table names (`dss_<prefix>_<name>`)
    #[serde(default)]
    pub table_prefix: Option<String>,

    /// Directory extract output files are written into
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
}

fn default_work_dir() -> String {
    DEFAULT_WORK_DIR.to_string()
}

impl Default for LoadSection {
    fn default() -> Self {
        Self {
            table_prefix: None,
            work_dir: default_work_dir(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `.dss-loader.toml` configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoaderConfig {
    /// Warehouse connection configuration
    #[serde(default)]
    pub warehouse: WarehouseSection,

    /// Fallback credentials shared with the rest of the platform
    #[serde(default)]
    pub defaults: DefaultsSection,

    /// Load/extract behavior
    #[serde(default)]
    pub load: LoadSection,
}

impl LoaderConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a directory
    ///
    /// Looks for `.dss-loader.toml` in the given directory, falls back to
    /// defaults if not found, then applies environment variable overrides.
    pub fn load(dir: &Path) -> DssResult<Self> {
        let config_path = dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> DssResult<Self> {
        toml::from_str(content)
            .map_err(|e| DssError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> DssResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DssError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(ENV_WAREHOUSE_URL) {
            self.warehouse.url = Some(url);
        }
        if let Ok(username) = std::env::var(ENV_WAREHOUSE_USERNAME) {
            self.warehouse.username = Some(username);
        }
        if let Ok(password) = std::env::var(ENV_WAREHOUSE_PASSWORD) {
            self.warehouse.password = Some(password);
        }
        if let Ok(prefix) = std::env::var(ENV_TABLE_PREFIX) {
            self.load.table_prefix = Some(prefix);
        }
        if let Ok(dir) = std::env::var(ENV_WORK_DIR) {
            self.load.work_dir = dir;
        }
    }

    /// Resolve the configuration into the form the engines consume
    ///
    /// Performs the credential fallback (warehouse-specific values win over
    /// `[defaults]`) and fails fast when the URL or either credential half is
    /// missing, before any connection is attempted.
    pub fn resolve(self) -> DssResult<ResolvedConfig> {
        let url = self
            .warehouse
            .url
            .ok_or_else(|| DssError::Config("warehouse.url is required".to_string()))?;

        let username = self
            .warehouse
            .username
            .or(self.defaults.username)
            .ok_or_else(|| {
                DssError::Config(
                    "warehouse.username is required (set it or defaults.username)".to_string(),
                )
            })?;

        let password = self
            .warehouse
            .password
            .or(self.defaults.password)
            .ok_or_else(|| {
                DssError::Config(
                    "warehouse.password is required (set it or defaults.password)".to_string(),
                )
            })?;

        Ok(ResolvedConfig {
            url,
            credentials: Credentials { username, password },
            table_prefix: self.load.table_prefix,
            work_dir: PathBuf::from(self.load.work_dir),
        })
    }
}

/// Username/password pair for the warehouse connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Fully resolved configuration consumed by the engines
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Warehouse endpoint URL
    pub url: String,
    /// Resolved credential pair
    pub credentials: Credentials,
    /// Optional physical table-name infix
    pub table_prefix: Option<String>,
    /// Extract working directory
    pub work_dir: PathBuf,
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# dss-loader configuration

[warehouse]
# url = "postgresql://warehouse.internal:5433/dwh"
# username = "loader"
# password = "secret"

# Fallback credentials used when [warehouse] leaves them unset
[defaults]
# username = "platform-user"
# password = "platform-secret"

[load]
# Physical table names become dss_<table_prefix>_<name>
# table_prefix = "acme"

# Directory extract output files are written into
work_dir = "tmp"
"#
}
