//! Keyword normalization for channel search.
//!
//! Both sides of a search comparison go through the same pipeline so that
//! "Globo Notícias", "GLOBO NOTICIAS" and " globo noticias " all compare equal.

use unicode_normalization::UnicodeNormalization;

/// Canonical form used for search needles and haystacks.
///
/// NFD decomposition, combining diacritical marks stripped, lowercased, trimmed.
pub fn normalize_keyword(s: &str) -> String {
    let stripped: String = s.nfd().filter(|c| !is_diacritic(*c)).collect();
    stripped.to_lowercase().trim().to_string()
}

/// Default `keywords` value for a channel that does not store one.
///
/// Same as [`normalize_keyword`] with internal whitespace runs collapsed.
pub fn derive_keywords(name: &str) -> String {
    collapse_whitespace(&normalize_keyword(name))
}

/// Combining Diacritical Marks block (U+0300..U+036F).
fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
