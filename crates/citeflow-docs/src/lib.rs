pub mod error;
pub mod pdf;
pub mod source;
pub mod store;
pub mod text;

pub use error::DocumentError;
pub use pdf::PdfDirectory;
pub use source::{InMemorySource, PageSource};
pub use store::{title_from_id, Document, DocumentStore, Page, PAGE_SEPARATOR};
