//! Utility functions for number normalization in scraped prose.
//!
//! Bulletin pages write case counts the way humans do: with thin spaces,
//! non-breaking spaces, or comma group separators ("4 731", "1,234"). The
//! helpers here reduce such fragments to plain integers so the extraction
//! layer never has to care about typography.

/// Parse an integer out of free text by dropping every non-digit character.
///
/// Group separators of any kind (spaces, non-breaking spaces, commas, dots)
/// are stripped, as is any surrounding prose. All remaining digits are
/// concatenated in order, so this must only be applied to captures known to
/// contain a single number.
///
/// # Arguments
///
/// * `text` - A text fragment expected to contain one number
///
/// # Returns
///
/// The parsed value, or `None` if the fragment contains no digits at all
/// (or the digits overflow a `u64`).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(smart_parse_int("выявлено 4 731 случая"), Some(4731));
/// assert_eq!(smart_parse_int("1,234"), Some(1234));
/// assert_eq!(smart_parse_int("no numbers here"), None);
/// ```
pub fn smart_parse_int(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smart_parse_int_plain() {
        assert_eq!(smart_parse_int("1234"), Some(1234));
    }

    #[test]
    fn test_smart_parse_int_space_separated() {
        assert_eq!(smart_parse_int("1 234"), Some(1234));
        assert_eq!(smart_parse_int("4 731"), Some(4731));
    }

    #[test]
    fn test_smart_parse_int_comma_separated() {
        assert_eq!(smart_parse_int("1,234"), Some(1234));
    }

    #[test]
    fn test_smart_parse_int_nbsp_and_prose() {
        // U+00A0 shows up verbatim in the bulletins' markup
        assert_eq!(smart_parse_int("о\u{a0}6 060 случаях"), Some(6060));
        assert_eq!(smart_parse_int(" в 85 "), Some(85));
    }

    #[test]
    fn test_smart_parse_int_no_digits() {
        assert_eq!(smart_parse_int(""), None);
        assert_eq!(smart_parse_int("регионах"), None);
    }

    #[test]
    fn test_smart_parse_int_cyrillic_untouched() {
        // Cyrillic letters are not digits and must not confuse the filter
        assert_eq!(smart_parse_int("в 17 регионах"), Some(17));
    }
}
