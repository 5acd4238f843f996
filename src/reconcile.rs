//! Validation of quotations proposed by an external language model.
//!
//! Model answers name a verse and quote its text without pointing. A quotation is accepted only
//! for the verse it names, and only when its letters occur in that verse; the accepted
//! quotation is rewritten to the exact pointed substring so it maps onto the verse like any
//! extracted one.

use serde::{Deserialize, Serialize};
use tracing::warn;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::value::Value;
use crate::verse::{NumericQuotation, Verse, VerseId, VerseQuotations};

/// One number as reported by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelQuotation {
    pub book: String,
    pub chapter: String,
    #[serde(alias = "verse")]
    pub letter: String,
    pub quote: String,
    #[serde(alias = "number")]
    pub value: Value,
    #[serde(default)]
    pub entity: String,
}

impl ModelQuotation {
    pub fn verse_id(&self) -> VerseId {
        VerseId::new(&self.book, &self.chapter, &self.letter)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub all_numbers: Vec<ModelQuotation>,
}

impl ModelResponse {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Same verse, quote found at byte range `[start, end)` of the verse text.
    Matched { start: usize, end: usize },
    /// Same verse, but the quote is not in it.
    QuoteMismatch,
    OtherVerse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// One entry per input verse, in input order.
    pub accepted: Vec<VerseQuotations>,
    pub unmatched: Vec<ModelQuotation>,
}

/// Letters of `text` with spacing collapsed, each mapped back to its byte range in `text`.
struct LetterText {
    letters: Vec<char>,
    ranges: Vec<(usize, usize)>,
}

impl LetterText {
    fn new(text: &str) -> Self {
        let mut letters = Vec::new();
        let mut ranges: Vec<(usize, usize)> = Vec::new();

        for (i, c) in text.char_indices() {
            let base = c.nfd().next().unwrap_or(c);
            let end = i + c.len_utf8();
            if ('א'..='ת').contains(&base) {
                letters.push(base);
                ranges.push((i, end));
            } else if is_combining_mark(c) {
                if let (Some(last), Some(range)) = (letters.last(), ranges.last_mut()) {
                    if *last != ' ' && range.1 == i {
                        range.1 = end;
                    }
                }
            } else if c.is_whitespace() || matches!(c, '-' | '\u{05BE}') {
                if letters.last().map_or(false, |l| *l != ' ') {
                    letters.push(' ');
                    ranges.push((i, end));
                }
            }
        }
        if letters.last() == Some(&' ') {
            letters.pop();
            ranges.pop();
        }
        LetterText { letters, ranges }
    }

    fn find(&self, needle: &LetterText) -> Option<(usize, usize)> {
        let n = needle.letters.len();
        if n == 0 || n > self.letters.len() {
            return None;
        }
        let at = self
            .letters
            .windows(n)
            .position(|w| w == needle.letters.as_slice())?;
        Some((self.ranges[at].0, self.ranges[at + n - 1].1))
    }
}

/// Whether `candidate` belongs to `verse`, and where its quote sits in it.
pub fn check_match(verse: &Verse, candidate: &ModelQuotation) -> MatchOutcome {
    if verse.id != candidate.verse_id() {
        return MatchOutcome::OtherVerse;
    }
    let text = LetterText::new(&verse.text);
    match text.find(&LetterText::new(&candidate.quote)) {
        Some((start, end)) => MatchOutcome::Matched { start, end },
        None => MatchOutcome::QuoteMismatch,
    }
}

/// Attaches each model quotation to the first verse it matches.
pub fn reconcile(verses: &[Verse], response: ModelResponse) -> Reconciliation {
    let mut accepted: Vec<VerseQuotations> = verses
        .iter()
        .map(|verse| VerseQuotations {
            verse: verse.clone(),
            quotations: Vec::new(),
        })
        .collect();
    let mut unmatched = Vec::new();

    for candidate in response.all_numbers {
        let mut mismatched = false;
        let mut placed = false;
        for entry in accepted.iter_mut() {
            match check_match(&entry.verse, &candidate) {
                MatchOutcome::Matched { start, end } => {
                    let quote = &entry.verse.text[start..end];
                    entry.quotations.push(NumericQuotation::new(
                        quote,
                        candidate.value,
                        candidate.entity.clone(),
                    ));
                    placed = true;
                    break;
                }
                MatchOutcome::QuoteMismatch => mismatched = true,
                MatchOutcome::OtherVerse => {}
            }
        }
        if !placed {
            if mismatched {
                warn!(
                    verse = %candidate.verse_id(),
                    quote = %candidate.quote,
                    "model quotation does not occur in its verse"
                );
            } else {
                warn!(verse = %candidate.verse_id(), "model quotation names an unknown verse");
            }
            unmatched.push(candidate);
        }
    }

    Reconciliation {
        accepted,
        unmatched,
    }
}
