use serde::Serialize;

/// English and native names for common language codes
static LANGUAGE_NAMES: &[(&str, &str, &str)] = &[
    ("en", "English", "English"),
    ("es", "Spanish", "Español"),
    ("fr", "French", "Français"),
    ("de", "German", "Deutsch"),
    ("it", "Italian", "Italiano"),
    ("ja", "Japanese", "日本語"),
    ("ko", "Korean", "한국어"),
    ("zh", "Chinese", "中文"),
    ("hi", "Hindi", "हिन्दी"),
    ("ru", "Russian", "Русский"),
    ("pt", "Portuguese", "Português"),
];

/// Looks up `(english, native)` names for an ISO 639-1 code
pub fn language_names(code: &str) -> Option<(&'static str, &'static str)> {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, english, native)| (*english, *native))
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum LanguageKind {
    Original,
    Subtitled,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieLanguage {
    pub iso_639_1: String,
    pub english_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LanguageKind,
}

impl MovieLanguage {
    /// Resolves display names: explicit names first, then the static table,
    /// then the upper-cased code.
    pub fn resolve(
        code: &str,
        english_name: Option<&str>,
        native_name: Option<&str>,
        kind: LanguageKind,
    ) -> Self {
        let known = language_names(code);
        let fallback = code.to_uppercase();
        let pick = |explicit: Option<&str>, table: Option<&'static str>| {
            explicit
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .or_else(|| table.map(str::to_string))
                .unwrap_or_else(|| fallback.clone())
        };

        Self {
            iso_639_1: code.to_string(),
            english_name: pick(english_name, known.map(|(english, _)| english)),
            name: pick(native_name, known.map(|(_, native)| native)),
            kind,
        }
    }
}
