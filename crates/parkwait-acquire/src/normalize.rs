use unicode_normalization::UnicodeNormalization;

/// Normalize extracted page text to NFC and collapse runs of whitespace.
///
/// Attraction names become CSV column keys, so the same heading must produce
/// the same string on every scrape regardless of markup indentation or
/// composed/decomposed kana and accents.
pub fn normalize_text(input: &str) -> String {
    let nfc: String = input.nfc().collect();
    nfc.split_whitespace().collect::<Vec<_>>().join(" ")
}
