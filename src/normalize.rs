// src/normalize.rs

//! ASCII folding for values written into the generated document.
//!
//! Accented Latin letters and ligatures are decomposed (NFKD) and their
//! combining marks dropped. A handful of letters with no decomposition are
//! folded through a fixed table. Any other non-ASCII code point is removed.

use crate::error::{FormError, FormResult};
use serde_json::Value as JsonValue;
use unicode_normalization::UnicodeNormalization;

/// Letters that NFKD leaves intact but that have a conventional ASCII spelling.
const FOLD_TABLE: &[(char, &str)] = &[
    ('Æ', "AE"),
    ('æ', "ae"),
    ('Œ', "OE"),
    ('œ', "oe"),
    ('Ø', "O"),
    ('ø', "o"),
    ('ß', "ss"),
    ('Ł', "L"),
    ('ł', "l"),
    ('Đ', "D"),
    ('đ', "d"),
    ('Ð', "D"),
    ('ð', "d"),
    ('Þ', "TH"),
    ('þ', "th"),
    ('ı', "i"),
];

pub fn to_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.nfkd() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        if let Some((_, folded)) = FOLD_TABLE.iter().find(|(from, _)| *from == c) {
            out.push_str(folded);
        }
        // combining marks and anything else outside ASCII are dropped
    }
    out
}

/// Same as [`to_ascii`] for loosely typed values; anything but a JSON string
/// is rejected with `InvalidInputKind`.
pub fn to_ascii_value(v: &JsonValue) -> FormResult<String> {
    match v {
        JsonValue::String(s) => Ok(to_ascii(s)),
        other => Err(FormError::InvalidInputKind {
            got: json_kind(other),
        }),
    }
}

fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// ======================================================
// Unit Tests
// ======================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_french_accents() {
        assert_eq!(to_ascii("Hélène"), "Helene");
        assert_eq!(to_ascii("Besançon"), "Besancon");
        assert_eq!(to_ascii("Île-de-France"), "Ile-de-France");
        assert_eq!(to_ascii("Noël à l'hôpital"), "Noel a l'hopital");
    }

    #[test]
    fn folds_letters_without_decomposition() {
        assert_eq!(to_ascii("Lætitia"), "Laetitia");
        assert_eq!(to_ascii("Œuvre"), "OEuvre");
        assert_eq!(to_ascii("Straße"), "Strasse");
        assert_eq!(to_ascii("Łódź"), "Lodz");
    }

    #[test]
    fn splits_ligatures_and_compatibility_letters() {
        assert_eq!(to_ascii("Ĳsselmeer"), "IJsselmeer");
        assert_eq!(to_ascii("Ŀlorenç"), "Llorenc");
        assert_eq!(to_ascii("ﬁlle"), "fille");
        assert_eq!(to_ascii("Ǆ"), "DZ");
    }

    #[test]
    fn drops_remaining_non_ascii() {
        assert_eq!(to_ascii("Paris 東京"), "Paris ");
        assert_eq!(to_ascii("€5"), "5");
        assert_eq!(to_ascii("a\u{0301}"), "a");
    }

    #[test]
    fn ascii_input_is_unchanged() {
        let s = "12 rue de la Paix, 75002 Paris";
        assert_eq!(to_ascii(s), s);
        assert_eq!(to_ascii(""), "");
    }

    #[test]
    fn output_is_pure_ascii_for_accented_latin() {
        let samples = [
            "àâäéèêëïîôöùûüÿç",
            "ÀÂÄÉÈÊËÏÎÔÖÙÛÜŸÇ",
            "ñÑåÅãÃõÕ",
            "Ångström",
        ];
        for s in samples {
            let out = to_ascii(s);
            assert!(out.is_ascii(), "{out:?} should be ascii");
            assert!(!out.chars().any(|c| ('\u{0300}'..='\u{036F}').contains(&c)));
        }
    }

    #[test]
    fn to_ascii_value_rejects_non_strings() {
        let err = to_ascii_value(&JsonValue::from(42)).unwrap_err();
        assert!(matches!(err, FormError::InvalidInputKind { got: "number" }));

        let err = to_ascii_value(&JsonValue::Null).unwrap_err();
        assert!(matches!(err, FormError::InvalidInputKind { got: "null" }));

        let err = to_ascii_value(&JsonValue::Bool(true)).unwrap_err();
        assert!(matches!(err, FormError::InvalidInputKind { got: "bool" }));
    }

    #[test]
    fn to_ascii_value_normalizes_strings() {
        let v = JsonValue::String("Mélanie".to_string());
        assert_eq!(to_ascii_value(&v).unwrap(), "Melanie");
    }
}
