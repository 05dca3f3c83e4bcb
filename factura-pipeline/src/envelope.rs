//! Outward JSON envelope — the only contract this pipeline honors toward
//! the consuming service. Mirrors the surrounding CRUD layer's convention:
//! camelCase keys, `success` flag, human `message`, machine `error`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;

use crate::error::PipelineError;
use crate::pipeline::GeneratedInvoice;

/// Payload present on success.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePayload {
    /// Base64 of the PDF bytes.
    pub binary_content: String,
    pub filename: String,
}

/// Response envelope for one `generate` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<GeneratePayload>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    /// Wrap a `generate` outcome for the consuming layer.
    pub fn from_outcome(outcome: &Result<GeneratedInvoice, PipelineError>) -> Self {
        match outcome {
            Ok(invoice) => GenerateResponse {
                success: true,
                data: Some(GeneratePayload {
                    binary_content: BASE64.encode(&invoice.pdf),
                    filename: invoice.filename.clone(),
                }),
                message: "Invoice PDF generated successfully".to_string(),
                error: None,
            },
            Err(err) => GenerateResponse {
                success: false,
                data: None,
                message: "Invoice PDF generation failed".to_string(),
                error: Some(err.to_string()),
            },
        }
    }
}
