//! PDF parsing backends.
//!
//! Each backend is a cargo feature. At startup the configured preference
//! list is probed in order and the first backend compiled into the binary is
//! returned as a [`Backend`] value, which the converter carries for the rest
//! of the run.

use crate::error::{DocToolsError, Result};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Layout-aware extraction via `pdf-extract`.
    PdfExtract,
    /// Plain per-page content stream reading via `lopdf`.
    Lopdf,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::PdfExtract, BackendKind::Lopdf];

    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::PdfExtract => "pdf-extract",
            BackendKind::Lopdf => "lopdf",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('_', "-").as_str() {
            "pdf-extract" => Some(BackendKind::PdfExtract),
            "lopdf" => Some(BackendKind::Lopdf),
            _ => None,
        }
    }

    /// Whether this backend was compiled into the current build.
    pub fn is_available(&self) -> bool {
        match self {
            BackendKind::PdfExtract => cfg!(feature = "pdf-extract"),
            BackendKind::Lopdf => cfg!(feature = "lopdf"),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opened document that yields text one page at a time.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text of the 1-based `page_number`, or `None` when the page has none.
    fn page_text(&mut self, page_number: usize) -> Result<Option<String>>;
}

/// The backend chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backend {
    kind: BackendKind,
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn open(&self, path: &Path) -> Result<Box<dyn PageSource>> {
        tracing::debug!("opening {} with {}", path.display(), self.kind);

        match self.kind {
            #[cfg(feature = "pdf-extract")]
            BackendKind::PdfExtract => Ok(Box::new(layout::LayoutDocument::open(path)?)),
            #[cfg(feature = "lopdf")]
            BackendKind::Lopdf => Ok(Box::new(page_reader::PageReaderDocument::open(path)?)),
            #[allow(unreachable_patterns)]
            _ => Err(DocToolsError::NoBackendAvailable {
                tried: vec![self.kind.name().to_string()],
            }),
        }
    }
}

/// Returns the first available backend from `preference`.
pub fn select_backend(preference: &[BackendKind]) -> Result<Backend> {
    for kind in preference {
        if kind.is_available() {
            tracing::info!("using PDF backend {}", kind);
            return Ok(Backend { kind: *kind });
        }
        tracing::debug!("PDF backend {} not compiled in, trying next", kind);
    }

    Err(DocToolsError::NoBackendAvailable {
        tried: preference.iter().map(|kind| kind.name().to_string()).collect(),
    })
}

#[cfg(feature = "pdf-extract")]
mod layout {
    use super::PageSource;
    use crate::error::{DocToolsError, Result};
    use std::panic::{self, AssertUnwindSafe};
    use std::path::Path;

    pub struct LayoutDocument {
        pages: Vec<String>,
    }

    impl LayoutDocument {
        pub fn open(path: &Path) -> Result<Self> {
            let data = std::fs::read(path)?;

            // pdf-extract panics on some malformed input instead of erroring.
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                pdf_extract::extract_text_from_mem_by_pages(&data)
            }));

            match result {
                Ok(Ok(pages)) => Ok(Self { pages }),
                Ok(Err(e)) => Err(DocToolsError::Pdf {
                    backend: "pdf-extract".to_string(),
                    message: e.to_string(),
                }),
                Err(_) => Err(DocToolsError::Pdf {
                    backend: "pdf-extract".to_string(),
                    message: "text extraction panicked (malformed document)".to_string(),
                }),
            }
        }
    }

    impl PageSource for LayoutDocument {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_text(&mut self, page_number: usize) -> Result<Option<String>> {
            let text = page_number
                .checked_sub(1)
                .and_then(|index| self.pages.get_mut(index))
                .map(std::mem::take);
            Ok(text)
        }
    }
}

#[cfg(feature = "lopdf")]
mod page_reader {
    use super::PageSource;
    use crate::error::{DocToolsError, Result};
    use std::path::Path;

    pub struct PageReaderDocument {
        document: lopdf::Document,
        page_numbers: Vec<u32>,
    }

    fn pdf_error(e: lopdf::Error) -> DocToolsError {
        DocToolsError::Pdf {
            backend: "lopdf".to_string(),
            message: e.to_string(),
        }
    }

    impl PageReaderDocument {
        pub fn open(path: &Path) -> Result<Self> {
            let document = lopdf::Document::load(path).map_err(pdf_error)?;
            let page_numbers = document.get_pages().keys().copied().collect();
            Ok(Self {
                document,
                page_numbers,
            })
        }
    }

    impl PageSource for PageReaderDocument {
        fn page_count(&self) -> usize {
            self.page_numbers.len()
        }

        fn page_text(&mut self, page_number: usize) -> Result<Option<String>> {
            let Some(&number) = page_number
                .checked_sub(1)
                .and_then(|index| self.page_numbers.get(index))
            else {
                return Ok(None);
            };

            let text = self.document.extract_text(&[number]).map_err(pdf_error)?;
            Ok(Some(text))
        }
    }
}
