use crate::error::{DocToolsError, Result};
use crate::pdf::BackendKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub pdf: PdfConfig,
    pub excel: ExcelConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Backends probed in order; the first one compiled into the binary wins.
    pub backends: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExcelConfig {
    pub row_limit: u32,
    pub preview_rows: u32,
    pub preview_cols: u32,
    pub preview_value_width: usize,
    pub formula_samples: usize,
    pub formula_width: usize,
    pub cross_ref_samples: usize,
    pub cross_ref_width: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            backends: BackendKind::ALL
                .iter()
                .map(|kind| kind.name().to_string())
                .collect(),
        }
    }
}

impl Default for ExcelConfig {
    fn default() -> Self {
        Self {
            row_limit: 100,
            preview_rows: 10,
            preview_cols: 10,
            preview_value_width: 20,
            formula_samples: 10,
            formula_width: 100,
            cross_ref_samples: 5,
            cross_ref_width: 80,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DocToolsError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DocToolsError::Config {
                message: format!("Failed to read config file {}: {}", path.display(), e),
            })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| DocToolsError::Config {
                message: format!("Failed to parse config file {}: {}", path.display(), e),
            })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["doctools.toml", ".doctools.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        tracing::debug!("loading configuration from {}", default_path);
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref backend) = cli_args.backend {
            self.pdf.backends = vec![backend.clone()];
        }

        if let Some(row_limit) = cli_args.row_limit {
            self.excel.row_limit = row_limit;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| DocToolsError::Config {
                message: format!("Failed to serialize config: {}", e),
            })?;

        std::fs::write(path, content)
            .map_err(|e| DocToolsError::Config {
                message: format!("Failed to write config file {}: {}", path.display(), e),
            })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.pdf.backends.is_empty() {
            return Err(DocToolsError::Config {
                message: "At least one PDF backend must be listed".to_string(),
            });
        }

        for name in &self.pdf.backends {
            if BackendKind::from_name(name).is_none() {
                return Err(DocToolsError::UnknownBackend { name: name.clone() });
            }
        }

        let excel = &self.excel;
        if excel.row_limit == 0 {
            return Err(DocToolsError::Config {
                message: "Row limit must be greater than 0".to_string(),
            });
        }

        if excel.preview_value_width == 0
            || excel.formula_width == 0
            || excel.cross_ref_width == 0
        {
            return Err(DocToolsError::Config {
                message: "Truncation widths must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Resolves the configured backend names, in preference order.
    pub fn backend_preference(&self) -> Result<Vec<BackendKind>> {
        self.pdf
            .backends
            .iter()
            .map(|name| {
                BackendKind::from_name(name)
                    .ok_or_else(|| DocToolsError::UnknownBackend { name: name.clone() })
            })
            .collect()
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub backend: Option<String>,
    pub row_limit: Option<u32>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: Option<String>) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_row_limit(mut self, row_limit: Option<u32>) -> Self {
        self.row_limit = row_limit;
        self
    }
}
