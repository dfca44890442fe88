use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A single completed translation.
///
/// All fields are fixed at creation time. `target_language_name` is the
/// display name resolved when the record was created; it is intentionally
/// denormalized and never re-resolved against the language catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    /// Creation-timestamp-derived identifier, unique within a session.
    pub id: u64,
    pub input_text: String,
    pub translated_text: String,
    pub target_language_code: String,
    pub target_language_name: String,
    pub created_at: DateTime<Utc>,
}

/// Payload sent to the translation service.
#[derive(Debug, Clone, Serialize)]
pub struct TranslateRequest {
    pub target_lang: String,
    pub text: String,
}
