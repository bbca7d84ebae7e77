//! Receipt recognition
//!
//! Image encoding, the recognition-service seam and the Gemini client.

pub mod credential;
pub mod gemini;

pub use credential::Credential;
pub use gemini::{GeminiClient, GeminiConfig};

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{SpendlogError, SpendlogResult};

/// Instruction sent alongside the receipt images
pub const RECEIPT_PROMPT: &str = "\
Analyze these receipt images. Extract the following details for each receipt:
- date (YYYY-MM-DD format, use today's date if not found)
- amount (number only)
- place (merchant name)
- address (merchant address if available, else empty string)
- category (Choose strictly from: Food, Gas, Repair, Groceries, Utilities, Entertainment, Other)
- paymentType (Credit Card, Debit Card, Cash)

Return ONLY a raw JSON array of objects. Do not include markdown formatting like ```json.";

/// A service that turns a prompt plus images into text
pub trait RecognitionService {
    fn infer(
        &self,
        credential: &Credential,
        prompt: &str,
        images: &[InlineImage],
    ) -> SpendlogResult<String>;
}

/// A receipt image to be scanned
#[derive(Debug, Clone)]
pub enum ReceiptImage {
    /// Image on disk; the mime type comes from the extension
    File(PathBuf),
    /// Image already in memory
    Bytes { data: Vec<u8>, mime_type: String },
}

/// Base64 image payload sent inline with the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl ReceiptImage {
    /// Read and base64-encode the image
    pub fn encode(&self) -> SpendlogResult<InlineImage> {
        match self {
            Self::File(path) => {
                let mime_type = mime_type_for(path).ok_or_else(|| {
                    SpendlogError::Validation(format!(
                        "Unsupported image type: {}",
                        path.display()
                    ))
                })?;
                let data = std::fs::read(path).map_err(|e| {
                    SpendlogError::Io(format!("Failed to read {}: {}", path.display(), e))
                })?;
                inline(&data, mime_type)
            }
            Self::Bytes { data, mime_type } => inline(data, mime_type),
        }
    }
}

fn inline(data: &[u8], mime_type: &str) -> SpendlogResult<InlineImage> {
    if data.is_empty() {
        return Err(SpendlogError::Validation("Image is empty".into()));
    }
    Ok(InlineImage {
        mime_type: mime_type.to_string(),
        data: STANDARD.encode(data),
    })
}

/// Image mime type from a file extension
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Remove markdown code fences around a model response
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}
