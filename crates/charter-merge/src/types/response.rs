//! Response types for the merge endpoint

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Successful merge: the serialized DOCX, base64-encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeResponse {
    /// Base64 (standard alphabet, padded) of the merged DOCX bytes
    pub document: String,
}

impl MergeResponse {
    /// Encode a serialized document for delivery
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            document: STANDARD.encode(bytes),
        }
    }

    /// Decode the delivered document back to raw bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.document)
    }
}
