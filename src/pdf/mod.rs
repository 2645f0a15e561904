pub mod backend;
pub mod converter;

pub use backend::{select_backend, Backend, BackendKind, PageSource};
pub use converter::{
    default_output_path, extract_text, page_banner, validate_source, write_output,
    ConversionReport, ExtractedText, PageProgress,
};
