//! # Text Processing Utilities
//!
//! Secret redaction for log output, locale-aware ordering of display names,
//! case-insensitive matching, lookup-key normalization and width-aware
//! padding for terminal columns.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_width::UnicodeWidthStr;

/// Redacts values that look like credentials in a string.
///
/// Query parameters such as `client_id=...` or `access_key=...` and
/// authorization headers keep their key while the value is replaced with
/// `[REDACTED]`.
///
/// # Example
/// ```rust
/// use atlas_util::redact_sensitive;
///
/// let url = "https://api.unsplash.com/search/photos?query=Japan&client_id=abc123";
/// assert_eq!(redact_sensitive(url), "https://api.unsplash.com/search/photos?query=Japan&client_id=[REDACTED]");
///
/// assert_eq!(redact_sensitive("Authorization: Client-ID abc123"), "Authorization: [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    redact_sensitive_with(input, "[REDACTED]")
}

/// Redacts sensitive-looking values, using a custom replacement token.
pub fn redact_sensitive_with(input: &str, replacement: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in REDACT_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}{}", prefix, replacement)
            })
            .to_string();
    }

    redacted
}

static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s+)([^\r\n]+)",
        r"(?i)([?&](?:client_id|access_key|api_key|apikey|key|token)=)([^&#\s]+)",
        r#"(?i)("(?:photo_access_key|access_key|client_id)"\s*:\s*")([^"]*)"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid redaction pattern"))
    .collect()
});

/// Compare two display names the way a locale-aware collator would for
/// Latin-script names: accents and case are ignored at the primary level and
/// only break ties.
///
/// # Example
/// ```rust
/// use std::cmp::Ordering;
/// use atlas_util::locale_compare;
///
/// assert_eq!(locale_compare("Åland Islands", "Albania"), Ordering::Less);
/// assert_eq!(locale_compare("Côte d'Ivoire", "Croatia"), Ordering::Less);
/// ```
pub fn locale_compare(left: &str, right: &str) -> Ordering {
    collation_key(left)
        .cmp(&collation_key(right))
        .then_with(|| left.to_lowercase().cmp(&right.to_lowercase()))
        .then_with(|| left.cmp(right))
}

/// Primary collation key: lowercase with diacritics folded to their base letters.
pub fn collation_key(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    for lowered in text.chars().flat_map(char::to_lowercase) {
        match fold_diacritic(lowered) {
            Some(folded) => key.push_str(folded),
            None => key.push(lowered),
        }
    }
    key
}

fn fold_diacritic(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' | 'ț' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(folded)
}

/// Case-insensitive substring test. An empty needle always matches.
pub fn contains_case_insensitive(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Normalize a subject name into a lookup key: trimmed, inner whitespace
/// collapsed to single spaces, lowercased.
pub fn normalize_subject_key(subject: &str) -> String {
    subject.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Pad `text` with spaces to `width` terminal columns.
pub fn pad_display(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    if used >= width {
        return text.to_string();
    }
    format!("{}{}", text, " ".repeat(width - used))
}

/// Display width of `text` in terminal columns.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}
