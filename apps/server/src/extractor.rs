//! Receipt extraction via the Gemini `generateContent` REST endpoint.
//!
//! ## Flow
//! ```text
//! receipt photo (base64)
//!        │
//!        ▼
//! POST models/{model}:generateContent   (inline image + JSON response schema)
//!        │
//!        ▼
//! [{"name": "Nasi Goreng", "quantity": 2, "price": 50000}, ...]
//!        │                                        (price = line total)
//!        ▼
//! normalize: price / quantity ──► per-unit ReceiptLine
//! ```
//!
//! Everything downstream (the bill, the engine) only ever sees per-unit
//! prices; the normalization happens here and nowhere else.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ApiError;
use patungan_core::ReceiptLine;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Instructions sent alongside the receipt image.
const EXTRACTION_PROMPT: &str = "Analyze this receipt image. Extract all distinct line items. \
    For each item, provide its name, quantity, and total price for that line. \
    Ignore headers, footers, taxes, service charges, discounts, totals, or any line \
    that is not a purchased product. Ensure the price is a number. Quantity should be \
    a whole number. If quantity is not explicitly mentioned, assume it is 1.";

/// Receipt extraction errors.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The upstream call failed (network, non-2xx status).
    #[error("Extraction service unavailable: {0}")]
    Upstream(String),

    /// The upstream answered but not in the agreed shape.
    #[error("Could not read items from the receipt: {0}")]
    MalformedResponse(String),
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Upstream(msg) => {
                warn!("Receipt extraction upstream failure: {}", msg);
                ApiError::upstream("Failed to reach the receipt extraction service")
            }
            ExtractError::MalformedResponse(_) => ApiError::upstream(
                "Failed to extract items from the receipt. The image might be unclear or not a valid receipt.",
            ),
        }
    }
}

/// Client for the receipt extraction upstream.
#[derive(Clone)]
pub struct ReceiptExtractor {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl ReceiptExtractor {
    /// Creates an extractor for the given API key and model.
    pub fn new(api_key: String, model: String) -> Self {
        ReceiptExtractor {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// Extracts candidate line items from a receipt image.
    ///
    /// Returned prices are per-unit; quantities are clamped to >= 1.
    pub async fn extract(
        &self,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<Vec<ReceiptLine>, ExtractError> {
        let url = format!(
            "{}/models/{}:generateContent",
            GEMINI_BASE_URL, self.model
        );

        debug!(model = %self.model, mime_type = %mime_type, "Requesting receipt extraction");

        let body = json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": mime_type, "data": image_base64 } },
                    { "text": EXTRACTION_PROMPT },
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "quantity": { "type": "INTEGER" },
                            "price": { "type": "NUMBER" },
                        },
                        "required": ["name", "quantity", "price"],
                    },
                },
            },
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ExtractError::Upstream(format!(
                "status {}: {}",
                status, detail
            )));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::MalformedResponse(e.to_string()))?;

        let text = payload
            .candidate_text()
            .ok_or_else(|| ExtractError::MalformedResponse("no candidate text".to_string()))?;

        parse_receipt_lines(&text)
    }
}

// =============================================================================
// Response Parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// First candidate's first text part, if any.
    fn candidate_text(&self) -> Option<String> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|part| part.text.clone())
    }
}

/// What the model returns per line: `price` is the TOTAL for the line.
#[derive(Debug, Serialize, Deserialize)]
struct RawReceiptItem {
    name: String,
    quantity: i64,
    price: f64,
}

/// Parses the model's JSON answer and normalizes to per-unit prices.
fn parse_receipt_lines(text: &str) -> Result<Vec<ReceiptLine>, ExtractError> {
    let raw: Vec<RawReceiptItem> = serde_json::from_str(text.trim())
        .map_err(|e| ExtractError::MalformedResponse(e.to_string()))?;

    Ok(raw
        .into_iter()
        .map(|item| {
            // Receipts occasionally yield a zero/negative quantity on a
            // smudged line; treat it as a single unit rather than dividing
            // by zero.
            let quantity = item.quantity.max(1);
            ReceiptLine {
                name: item.name,
                quantity,
                price: item.price / quantity as f64,
            }
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_line_totals_to_unit_price() {
        let text = r#"[
            {"name": "Nasi Goreng", "quantity": 2, "price": 50000},
            {"name": "Es Teh", "quantity": 1, "price": 8000}
        ]"#;

        let lines = parse_receipt_lines(text).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Nasi Goreng");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].price, 25000.0);
        assert_eq!(lines[1].price, 8000.0);
    }

    #[test]
    fn test_parse_clamps_zero_quantity() {
        let text = r#"[{"name": "Krupuk", "quantity": 0, "price": 5000}]"#;
        let lines = parse_receipt_lines(text).unwrap();
        assert_eq!(lines[0].quantity, 1);
        assert_eq!(lines[0].price, 5000.0);
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            parse_receipt_lines("I could not read the receipt"),
            Err(ExtractError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        let text = "\n  [{\"name\": \"Sate\", \"quantity\": 4, \"price\": 100000}]  \n";
        let lines = parse_receipt_lines(text).unwrap();
        assert_eq!(lines[0].price, 25000.0);
    }

    #[test]
    fn test_candidate_text_extraction() {
        let payload: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": { "parts": [{ "text": "[]" }] }
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(payload.candidate_text().as_deref(), Some("[]"));

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.candidate_text().is_none());
    }
}
