//! charter-merge: Charter Party assembly from a fixture recap, a base CP and negotiated clauses
//!
//! Each uploaded document is reduced to plain text (PDF, DOCX or text), the
//! negotiated clauses are split on their numbering, and the three parts are
//! written under fixed headings into a new DOCX that is returned base64-encoded.

pub mod clauses;
pub mod config;
pub mod error;
pub mod extraction;
pub mod merge;
pub mod pipeline;
pub mod server;
pub mod types;

pub use clauses::split_clauses;
pub use config::MergeConfig;
pub use error::{Error, Result};
pub use extraction::TextExtractor;
pub use merge::{DocumentMerger, MergedDocument};
pub use pipeline::{MergeOutput, MergePipeline};
pub use types::{DocumentRole, MergeInputs, MergeResponse, SourceFormat, UploadedFile};
