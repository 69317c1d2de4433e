//! Core types for the merge pipeline

pub mod document;
pub mod response;

pub use document::{DocumentRole, MergeInputs, SourceFormat, UploadSet, UploadedFile};
pub use response::MergeResponse;
