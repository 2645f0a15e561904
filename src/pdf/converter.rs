use crate::error::{DocToolsError, Result};
use crate::pdf::PageSource;
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const SEPARATOR_WIDTH: usize = 80;

/// Delimiter block written ahead of each page's text.
pub fn page_banner(page_number: usize) -> String {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    format!("\n{separator}\nPAGE {page_number}\n{separator}\n\n")
}

#[derive(Debug, Clone)]
pub struct PageProgress {
    pub current_page: usize,
    pub total_pages: usize,
    pub pages_with_text: usize,
    pub start_time: Instant,
}

impl PageProgress {
    pub fn new(total_pages: usize) -> Self {
        Self {
            current_page: 0,
            total_pages,
            pages_with_text: 0,
            start_time: Instant::now(),
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.total_pages == 0 {
            0.0
        } else {
            (self.current_page as f64 / self.total_pages as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractedText {
    pub text: String,
    pub total_pages: usize,
    /// 1-based numbers of the pages that produced text, ascending.
    pub pages_with_text: Vec<usize>,
}

/// Walks pages 1..=N in order, emitting a banner and the text for every page
/// that yields non-empty text. Pages without text leave no trace.
pub fn extract_text(
    source: &mut dyn PageSource,
    progress_callback: Option<&dyn Fn(&PageProgress)>,
) -> Result<ExtractedText> {
    let total_pages = source.page_count();
    let mut progress = PageProgress::new(total_pages);
    let mut extracted = ExtractedText {
        total_pages,
        ..Default::default()
    };

    for page_number in 1..=total_pages {
        progress.current_page = page_number;
        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        match source.page_text(page_number)? {
            Some(text) if !text.is_empty() => {
                extracted.text.push_str(&page_banner(page_number));
                extracted.text.push_str(&text);
                extracted.pages_with_text.push(page_number);
                progress.pages_with_text += 1;
            }
            _ => tracing::debug!("page {} produced no text, skipping", page_number),
        }
    }

    if let Some(callback) = progress_callback {
        callback(&progress);
    }

    Ok(extracted)
}

/// Checks the source before any parsing happens.
pub fn validate_source(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(DocToolsError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if !is_pdf {
        return Err(DocToolsError::NotAPdf {
            path: path.display().to_string(),
        });
    }

    Ok(())
}

/// `report.pdf` becomes `report.txt` next to the source.
pub fn default_output_path(source: &Path) -> PathBuf {
    source.with_extension("txt")
}

/// Writes `text` to `destination` through a temporary sibling file so the
/// destination only ever holds complete output. Returns the size written.
pub fn write_output(destination: &Path, text: &str) -> Result<u64> {
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(text.as_bytes())?;
    temp.flush()?;
    temp.persist(destination).map_err(|e| DocToolsError::Io(e.error))?;

    let size = std::fs::metadata(destination)?.len();
    tracing::debug!("wrote {} bytes to {}", size, destination.display());
    Ok(size)
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub backend: String,
    pub total_pages: usize,
    pub pages_with_text: Vec<usize>,
    pub output_bytes: u64,
    pub duration: Duration,
}

impl ConversionReport {
    pub fn output_megabytes(&self) -> f64 {
        self.output_bytes as f64 / 1024.0 / 1024.0
    }

    pub fn display_summary(&self) -> String {
        let mut summary = String::new();
        let _ = writeln!(summary, "Source: {}", self.source.display());
        let _ = writeln!(summary, "Output: {}", self.output.display());
        let _ = writeln!(summary, "Backend: {}", self.backend);
        let _ = write!(
            summary,
            "Pages with text: {}/{}",
            self.pages_with_text.len(),
            self.total_pages
        );
        summary
    }
}
