//! PDF document access.

pub mod backend;
mod content;
mod options;

pub use backend::{
    decode_text_simple, decode_text_string, get_number_from_value, BackendFontInfo, ContentOp,
    LopdfBackend, ObjectId, PageId, PdfBackend, PdfDict, PdfValue,
};
pub use content::{extract_page_content, ContentInterpreter};
pub use options::{ErrorMode, PipelineOptions};
