use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::pdf::BackendKind;
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pdf-to-text")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert PDF files to text format")]
#[command(
    long_about = "Extracts the text of every page of a PDF document and writes it to a \
                  UTF-8 text file, with a banner ahead of each page."
)]
#[command(after_help = "EXAMPLES:\n  \
    pdf-to-text input.pdf\n  \
    pdf-to-text input.pdf -o output.txt\n  \
    pdf-to-text \"Managerial Accounting by Hilton 9e BOOK.pdf\" --backend lopdf")]
#[command(arg_required_else_help = true)]
pub struct PdfToTextCli {
    /// Path to the PDF file
    #[arg(required_unless_present = "generate_config")]
    pub pdf_file: Option<PathBuf>,

    /// Output text file path (default: same name as PDF with .txt extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// PDF backend to use instead of probing the configured list
    #[arg(short, long, value_parser = validate_backend_name)]
    pub backend: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for messages and the final report
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Parser, Debug)]
#[command(name = "analyze-excel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Analyze the formula and input structure of an Excel workbook")]
#[command(
    long_about = "Walks every sheet of an .xlsx workbook, classifies populated cells as \
                  formulas or inputs, previews each sheet and summarizes cross-sheet \
                  references."
)]
#[command(after_help = "EXAMPLES:\n  \
    analyze-excel \"Management Accounting 13 Schedules Excel.xlsx\"\n  \
    analyze-excel budget.xlsx --output-format json\n  \
    analyze-excel budget.xlsx --summary-out summary.json")]
#[command(arg_required_else_help = true)]
pub struct AnalyzeExcelCli {
    /// Path to the workbook
    #[arg(required_unless_present = "generate_config")]
    pub workbook: Option<PathBuf>,

    /// Number of rows scanned per sheet
    #[arg(long, help = "Maximum number of rows scanned per sheet (default: 100)")]
    pub row_limit: Option<u32>,

    /// Also write the summary JSON to this file
    #[arg(long)]
    pub summary_out: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format: full text report or summary JSON only
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<&OutputFormat> for OutputMode {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl PdfToTextCli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;
        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;
        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new().with_backend(self.backend.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

impl AnalyzeExcelCli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;
        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;
        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new().with_row_limit(self.row_limit)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn validate_backend_name(s: &str) -> std::result::Result<String, String> {
    match BackendKind::from_name(s) {
        Some(kind) => Ok(kind.name().to_string()),
        None => Err(format!(
            "unknown backend '{}' (expected one of: {})",
            s,
            BackendKind::ALL
                .iter()
                .map(|kind| kind.name())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_cli_parsing() {
        let cli = PdfToTextCli::try_parse_from([
            "pdf-to-text",
            "book.pdf",
            "-o",
            "out/book.txt",
            "--backend",
            "LOPDF",
        ])
        .unwrap();

        assert_eq!(cli.pdf_file, Some(PathBuf::from("book.pdf")));
        assert_eq!(cli.output, Some(PathBuf::from("out/book.txt")));
        assert_eq!(cli.backend.as_deref(), Some("lopdf"));
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_pdf_cli_requires_input() {
        assert!(PdfToTextCli::try_parse_from(["pdf-to-text", "-o", "x.txt"]).is_err());
        assert!(PdfToTextCli::try_parse_from(["pdf-to-text", "--generate-config"]).is_ok());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(PdfToTextCli::try_parse_from(["pdf-to-text", "a.pdf", "-b", "pypdf2"]).is_err());
        assert!(validate_backend_name("pdf_extract").is_ok());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(PdfToTextCli::try_parse_from(["pdf-to-text", "a.pdf", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_excel_cli_overrides() {
        let cli = AnalyzeExcelCli::try_parse_from([
            "analyze-excel",
            "budget.xlsx",
            "--row-limit",
            "25",
            "--output-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.workbook, Some(PathBuf::from("budget.xlsx")));
        assert!(matches!(cli.output_format, OutputFormat::Json));
        assert_eq!(OutputMode::from(&cli.output_format), OutputMode::Json);

        let mut config = Config::default();
        config.merge_with_cli_args(&cli.create_cli_overrides());
        assert_eq!(config.excel.row_limit, 25);
    }
}
