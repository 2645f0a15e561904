use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocToolsError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("File '{path}' not found.")]
    FileNotFound { path: String },

    #[error("File '{path}' is not a PDF file.")]
    NotAPdf { path: String },

    #[error("No PDF library found")]
    NoBackendAvailable { tried: Vec<String> },

    #[error("Unknown PDF backend: {name}")]
    UnknownBackend { name: String },

    #[error("{backend} failed: {message}")]
    Pdf { backend: String, message: String },

    #[error("Failed to load workbook {path}: {message}")]
    Workbook { path: String, message: String },

    #[error("Sheet not found in workbook: {name}")]
    SheetNotFound { name: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocToolsError {
    /// Process exit code for this failure. Every handled failure maps to 1.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Errors raised before any document parsing took place.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            DocToolsError::FileNotFound { .. } | DocToolsError::NotAPdf { .. }
        )
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for DocToolsError {
    fn user_message(&self) -> String {
        match self {
            DocToolsError::NoBackendAvailable { tried } => {
                format!(
                    "No PDF library found (tried: {})",
                    tried.join(", ")
                )
            }
            DocToolsError::Pdf { message, .. } => {
                format!("Conversion failed: {}", message)
            }
            DocToolsError::Io(e) => {
                format!("Conversion failed: {}", e)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            DocToolsError::NoBackendAvailable { .. } => Some(
                "Please install one:\n  cargo install doctools --features pdf-extract\n  or\n  cargo install doctools --features lopdf".to_string()
            ),
            DocToolsError::UnknownBackend { .. } => Some(
                "Available backends are 'pdf-extract' and 'lopdf'.".to_string()
            ),
            DocToolsError::NotAPdf { .. } => Some(
                "Only files with a .pdf extension can be converted.".to_string()
            ),
            DocToolsError::Workbook { .. } => Some(
                "Check that the file exists and is a valid .xlsx workbook.".to_string()
            ),
            DocToolsError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for DocToolsError {
    fn from(error: toml::de::Error) -> Self {
        DocToolsError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocToolsError>;
