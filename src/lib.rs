pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod logging;
pub mod pdf;
pub mod ui;

// Public API re-exports
pub use cli::{AnalyzeExcelCli, OutputFormat, PdfToTextCli};
pub use config::{CliOverrides, Config, ExcelConfig, PdfConfig};
pub use error::{DocToolsError, Result, UserFriendlyError};

// Core functionality re-exports
pub use excel::{AnalysisSummary, StructureAnalyzer, Workbook, WorkbookAnalysis};
pub use pdf::{Backend, BackendKind, ConversionReport, PageProgress};
pub use ui::{OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use std::time::Instant;

/// PDF-to-text conversion with a backend fixed at construction.
pub struct PdfToText {
    backend: Backend,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl PdfToText {
    /// Probes the configured backends; fails when none is compiled in.
    pub fn new(config: &Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let backend = pdf::select_backend(&config.backend_preference()?)?;
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode != OutputMode::Json);

        Ok(Self {
            backend,
            output_formatter,
            progress_manager,
        })
    }

    pub fn from_cli(cli_args: &PdfToTextCli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Self::new(
            &config,
            OutputMode::from(&cli_args.output_format),
            cli_args.verbosity_level(),
            cli_args.quiet,
        )
    }

    /// Validates, extracts and writes. The destination is left untouched
    /// unless every step succeeds.
    pub fn convert(&self, pdf_path: &Path, output_path: Option<&Path>) -> Result<ConversionReport> {
        let start_time = Instant::now();

        pdf::validate_source(pdf_path)?;

        let output_path = output_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| pdf::default_output_path(pdf_path));

        let display_name = pdf_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| pdf_path.display().to_string());
        self.output_formatter.info(&format!("Converting: {}", display_name));
        self.output_formatter
            .info(&format!("Using library: {}", self.backend.name()));

        let mut document = self.backend.open(pdf_path)?;
        self.output_formatter
            .info(&format!("Processing {} pages...", document.page_count()));

        let page_progress = self
            .progress_manager
            .create_page_progress(document.page_count() as u64);
        let progress_callback = {
            let pb = page_progress.clone();
            move |progress: &PageProgress| {
                ui::progress::update_page_progress(&pb, progress);
            }
        };

        let extracted = match pdf::extract_text(document.as_mut(), Some(&progress_callback)) {
            Ok(extracted) => extracted,
            Err(e) => {
                page_progress.abandon();
                return Err(e);
            }
        };

        ui::progress::finish_progress_with_summary(
            &page_progress,
            &format!(
                "Extracted text from {} of {} pages",
                extracted.pages_with_text.len(),
                extracted.total_pages
            ),
            start_time.elapsed(),
        );

        let output_bytes = pdf::write_output(&output_path, &extracted.text)?;

        Ok(ConversionReport {
            source: pdf_path.to_path_buf(),
            output: output_path,
            backend: self.backend.name().to_string(),
            total_pages: extracted.total_pages,
            pages_with_text: extracted.pages_with_text,
            output_bytes,
            duration: start_time.elapsed(),
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    pub fn handle_error(&self, error: &DocToolsError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Workbook structure analysis driven by an [`ExcelConfig`].
pub struct ExcelStructureAnalyzer {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl ExcelStructureAnalyzer {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(!quiet && output_mode != OutputMode::Json),
        }
    }

    pub fn from_cli(cli_args: &AnalyzeExcelCli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Ok(Self::new(
            config,
            OutputMode::from(&cli_args.output_format),
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Loads the workbook and classifies every sheet.
    pub fn analyze_file(&self, path: &Path) -> Result<WorkbookAnalysis> {
        let spinner = self
            .progress_manager
            .create_spinner(&format!("Loading {}", path.display()));

        let workbook = match Workbook::open(path) {
            Ok(workbook) => workbook,
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e);
            }
        };
        spinner.finish_and_clear();

        let analyzer = StructureAnalyzer::new(self.config.excel.clone());
        Ok(analyzer.analyze(&path.display().to_string(), &workbook))
    }

    /// Prints the analysis in the configured output mode and hands back the
    /// summary.
    pub fn report(&self, analysis: &WorkbookAnalysis) -> Result<AnalysisSummary> {
        let summary = analysis.summary();

        match self.output_formatter.mode() {
            OutputMode::Json => {
                self.output_formatter
                    .print_document(&format!("{}\n", excel::summary_json(&summary)?));
            }
            OutputMode::Human | OutputMode::Plain => {
                self.output_formatter
                    .print_document(&excel::render_report(analysis, &self.config.excel)?);
            }
        }

        Ok(summary)
    }

    pub fn write_summary(&self, summary: &AnalysisSummary, path: &Path) -> Result<()> {
        pdf::write_output(path, &excel::summary_json(summary)?)?;
        self.output_formatter
            .debug(&format!("Summary written to {}", path.display()));
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn handle_error(&self, error: &DocToolsError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Converts a PDF with default settings and no terminal output.
pub fn convert_pdf_to_text(pdf_path: &Path, output_path: Option<&Path>) -> Result<ConversionReport> {
    let converter = PdfToText::new(&Config::default(), OutputMode::Plain, 0, true)?;
    converter.convert(pdf_path, output_path)
}

/// Analyzes a workbook with default settings and returns its summary without
/// printing.
pub fn analyze_excel_structure(path: &Path) -> Result<AnalysisSummary> {
    let workbook = Workbook::open(path)?;
    let analysis = StructureAnalyzer::default().analyze(&path.display().to_string(), &workbook);
    Ok(analysis.summary())
}

/// Write a sample configuration file
pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let sample_config = Config::create_sample_config();
    std::fs::write(output_path.as_ref(), sample_config)?;
    Ok(())
}

pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
