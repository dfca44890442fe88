//! Language catalog
//!
//! Static mapping from language code to display name, consulted when a
//! translation record is created. Codes outside the curated list fall back
//! to the ISO-639 registry, then to the raw code itself.

/// Curated target languages offered by the client.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("zh", "Chinese"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("ar", "Arabic"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("hi", "Hindi"),
    ("it", "Italian"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("tr", "Turkish"),
    ("hy", "Armenian"),
    ("fa", "Persian"),
    ("vi", "Vietnamese"),
    ("id", "Indonesian"),
    ("ko", "Korean"),
    ("bn", "Bengali"),
    ("ur", "Urdu"),
    ("th", "Thai"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("fi", "Finnish"),
    ("hu", "Hungarian"),
];

/// Resolve the display name for a language code.
///
/// Unknown codes resolve to themselves, so a record can always be created.
pub fn display_name(code: &str) -> String {
    if let Some((_, name)) = LANGUAGES.iter().find(|(c, _)| *c == code) {
        return (*name).to_string();
    }
    isolang::Language::from_639_1(code)
        .map(|lang| lang.to_name().to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Whether the code belongs to the curated list.
pub fn is_supported(code: &str) -> bool {
    LANGUAGES.iter().any(|(c, _)| *c == code)
}
