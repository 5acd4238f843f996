//! Verses, their identifiers, and the quotations extracted from them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lexicon::numeral_keywords;
use crate::spans::{map_spans, SpanMap};
use crate::value::Value;

/// Book, chapter and verse. Chapter and verse are written in Hebrew letter numerals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseId {
    pub book: String,
    pub chapter: String,
    #[serde(alias = "verse")]
    pub letter: String,
}

impl VerseId {
    pub fn new(book: impl Into<String>, chapter: impl Into<String>, letter: impl Into<String>) -> Self {
        VerseId {
            book: book.into(),
            chapter: chapter.into(),
            letter: letter.into(),
        }
    }

    /// `(chapter, verse)` as numbers.
    pub fn position(&self) -> Result<(u32, u32)> {
        Ok((gematria(&self.chapter)?, gematria(&self.letter)?))
    }
}

impl fmt::Display for VerseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.letter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub id: VerseId,
    pub text: String,
}

impl Verse {
    pub fn new(id: VerseId, text: impl Into<String>) -> Self {
        Verse {
            id,
            text: text.into(),
        }
    }
}

/// One extracted number: the exact quoted text, its value, and the counted noun if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumericQuotation {
    pub quote: String,
    #[serde(alias = "number")]
    pub value: Value,
    #[serde(default)]
    pub entity: String,
}

impl NumericQuotation {
    pub fn new(quote: impl Into<String>, value: impl Into<Value>, entity: impl Into<String>) -> Self {
        NumericQuotation {
            quote: quote.into(),
            value: value.into(),
            entity: entity.into(),
        }
    }
}

impl fmt::Display for NumericQuotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entity.is_empty() {
            write!(f, "{} = {}", self.quote, self.value)
        } else {
            write!(f, "{} = {} ({})", self.quote, self.value, self.entity)
        }
    }
}

/// A verse and everything extracted from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseQuotations {
    pub verse: Verse,
    pub quotations: Vec<NumericQuotation>,
}

impl VerseQuotations {
    /// Highlight ranges for the quotations and any remaining bare numeral keywords.
    pub fn spans(&self) -> Result<SpanMap> {
        map_spans(&self.verse.text, &self.quotations, numeral_keywords())
    }

    pub fn has_numbers(&self) -> bool {
        !self.quotations.is_empty()
    }
}

/// Value of a Hebrew letter numeral such as `קיט` (119). Geresh and gershayim are ignored.
pub fn gematria(numeral: &str) -> Result<u32> {
    numeral
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '\u{05F3}' | '\u{05F4}'))
        .try_fold(0u32, |sum, c| {
            letter_value(c)
                .map(|v| sum.saturating_add(v))
                .ok_or_else(|| Error::InvalidNumeralLetter {
                    letter: c,
                    input: numeral.to_string(),
                })
        })
}

fn letter_value(c: char) -> Option<u32> {
    let value = match c {
        'א' => 1,
        'ב' => 2,
        'ג' => 3,
        'ד' => 4,
        'ה' => 5,
        'ו' => 6,
        'ז' => 7,
        'ח' => 8,
        'ט' => 9,
        'י' => 10,
        'כ' | 'ך' => 20,
        'ל' => 30,
        'מ' | 'ם' => 40,
        'נ' | 'ן' => 50,
        'ס' => 60,
        'ע' => 70,
        'פ' | 'ף' => 80,
        'צ' | 'ץ' => 90,
        'ק' => 100,
        'ר' => 200,
        'ש' => 300,
        'ת' => 400,
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Duration;
    use rstest::rstest;

    #[rstest]
    #[case("א", 1)]
    #[case("טו", 15)]
    #[case("טז", 16)]
    #[case("קיט", 119)]
    #[case("נ", 50)]
    #[case("כ\"ג", 23)]
    #[case("תתקל", 930)]
    fn gematria_values(#[case] numeral: &str, #[case] expected: u32) {
        assert_eq!(gematria(numeral).unwrap(), expected);
    }

    #[test]
    fn gematria_rejects_other_characters() {
        let err = gematria("1א").unwrap_err();
        assert!(matches!(err, Error::InvalidNumeralLetter { letter: '1', .. }));
    }

    #[test]
    fn gematria_saturates_on_long_input() {
        let numeral = "ת".repeat(11_000_000);
        assert_eq!(gematria(&numeral).unwrap(), u32::MAX);
    }

    #[test]
    fn position_converts_both_parts() {
        let id = VerseId::new("בראשית", "ה", "ה");
        assert_eq!(id.position().unwrap(), (5, 5));
        assert_eq!(id.to_string(), "בראשית ה:ה");
    }

    #[test]
    fn verse_alias_is_accepted() {
        let id: VerseId =
            serde_json::from_str(r#"{"book":"בראשית","chapter":"א","verse":"ב"}"#).unwrap();
        assert_eq!(id.letter, "ב");
    }

    #[test]
    fn quotation_accepts_number_alias() {
        let q: NumericQuotation =
            serde_json::from_str(r#"{"quote":"שֵׁשׁ","number":6}"#).unwrap();
        assert_eq!(q.value, Value::Integer(6));
        assert_eq!(q.entity, "");
    }

    #[test]
    fn quotation_display() {
        let q = NumericQuotation::new("תְּשַׁע מֵאוֹת שָׁנָה", Duration::years(900), "");
        assert_eq!(q.to_string(), "תְּשַׁע מֵאוֹת שָׁנָה = 900 שנה");
        let q = NumericQuotation::new("שֵׁשׁ", 6u64, "אַמּוֹת");
        assert_eq!(q.to_string(), "שֵׁשׁ = 6 (אַמּוֹת)");
    }
}
