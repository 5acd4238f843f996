//! Assigns quotations and bare numeral keywords non-overlapping ranges of a verse.

use crate::error::{Error, Result};
use crate::verse::NumericQuotation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Index into the quotation list that was mapped.
    Quotation(usize),
    /// A numeral keyword outside every quotation.
    Keyword,
}

/// A claimed byte range `[start, end)` of the verse text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSpan {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

impl ResolvedSpan {
    pub fn overlaps(&self, other: &ResolvedSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanMap {
    /// In claim order: quotations first, then keywords in text order.
    pub spans: Vec<ResolvedSpan>,
    /// Quotations whose every occurrence was already claimed.
    pub unplaced: Vec<usize>,
}

impl SpanMap {
    /// Spans from the highest start to the lowest, so that splicing one leaves the offsets
    /// of the rest valid.
    pub fn splice_order(&self) -> Vec<ResolvedSpan> {
        let mut ordered = self.spans.clone();
        ordered.sort_by(|a, b| b.start.cmp(&a.start));
        ordered
    }

    pub fn span_of(&self, quotation: usize) -> Option<&ResolvedSpan> {
        self.spans
            .iter()
            .find(|s| s.kind == SpanKind::Quotation(quotation))
    }
}

struct Claims(Vec<bool>);

impl Claims {
    fn is_free(&self, start: usize, end: usize) -> bool {
        self.0[start..end].iter().all(|claimed| !claimed)
    }

    fn claim(&mut self, start: usize, end: usize) {
        self.0[start..end].iter_mut().for_each(|c| *c = true);
    }
}

/// Every start offset of `needle` in `haystack`, overlapping occurrences included.
fn occurrences(haystack: &str, needle: &str) -> Vec<usize> {
    let mut found = Vec::new();
    if needle.is_empty() {
        return found;
    }
    let mut from = 0;
    while let Some(i) = haystack[from..].find(needle) {
        let at = from + i;
        found.push(at);
        from = at + haystack[at..].chars().next().map_or(1, char::len_utf8);
    }
    found
}

/// Maps quotations, in order, to the first occurrence in `text` not yet claimed, then claims
/// every free space-delimited keyword occurrence.
///
/// A quotation that does not occur in `text` at all is an extractor defect and fails with
/// [`Error::QuoteNotInVerse`]; one whose occurrences are all taken is left unplaced.
pub fn map_spans<K: AsRef<str>>(
    text: &str,
    quotations: &[NumericQuotation],
    keywords: &[K],
) -> Result<SpanMap> {
    let mut claims = Claims(vec![false; text.len()]);
    let mut map = SpanMap::default();

    for (index, quotation) in quotations.iter().enumerate() {
        let starts = occurrences(text, &quotation.quote);
        if starts.is_empty() {
            return Err(Error::QuoteNotInVerse {
                quote: quotation.quote.clone(),
                text: text.to_string(),
            });
        }
        let len = quotation.quote.len();
        match starts.into_iter().find(|&s| claims.is_free(s, s + len)) {
            Some(start) => {
                claims.claim(start, start + len);
                map.spans.push(ResolvedSpan {
                    start,
                    end: start + len,
                    kind: SpanKind::Quotation(index),
                });
            }
            None => map.unplaced.push(index),
        }
    }

    // Pad so that keywords at either edge of the verse still see a boundary space.
    let padded = format!(" {} ", text);
    let mut keyword_spans = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref();
        if keyword.is_empty() {
            continue;
        }
        let needle = format!(" {} ", keyword);
        for at in occurrences(&padded, &needle) {
            let (start, end) = (at, at + keyword.len());
            if claims.is_free(start, end) {
                claims.claim(start, end);
                keyword_spans.push(ResolvedSpan {
                    start,
                    end,
                    kind: SpanKind::Keyword,
                });
            }
        }
    }
    keyword_spans.sort_by_key(|s| s.start);
    map.spans.extend(keyword_spans);

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn q(quote: &str, value: u64) -> NumericQuotation {
        NumericQuotation::new(quote, Value::Integer(value), "")
    }

    const NO_KEYWORDS: &[&str] = &[];

    #[test]
    fn maps_quotation_to_its_occurrence() {
        let text = "וַיְהִי שֵׁשׁ אַמּוֹת";
        let map = map_spans(text, &[q("שֵׁשׁ", 6)], NO_KEYWORDS).unwrap();
        let span = map.span_of(0).unwrap();
        assert_eq!(&text[span.start..span.end], "שֵׁשׁ");
    }

    #[test]
    fn repeated_quote_takes_next_free_occurrence() {
        let text = "שְׁנַיִם שְׁנַיִם";
        let quotations = [q("שְׁנַיִם", 2), q("שְׁנַיִם", 2)];
        let map = map_spans(text, &quotations, NO_KEYWORDS).unwrap();
        let first = map.span_of(0).unwrap();
        let second = map.span_of(1).unwrap();
        assert_eq!(first.start, 0);
        assert!(second.start > first.start);
        assert!(!first.overlaps(second));
    }

    #[test]
    fn fully_claimed_quote_is_unplaced() {
        let text = "שֵׁשׁ מֵאוֹת";
        let quotations = [q("שֵׁשׁ מֵאוֹת", 600), q("שֵׁשׁ", 6)];
        let map = map_spans(text, &quotations, NO_KEYWORDS).unwrap();
        assert_eq!(map.unplaced, vec![1]);
        assert_eq!(map.spans.len(), 1);
    }

    #[test]
    fn missing_quote_is_a_hard_error() {
        let err = map_spans("אֵין כָּאן", &[q("שֵׁשׁ", 6)], NO_KEYWORDS).unwrap_err();
        assert!(matches!(err, Error::QuoteNotInVerse { .. }));
    }

    #[test]
    fn keywords_fill_unclaimed_whole_words_only() {
        let text = "שֵׁשׁ מֵאוֹת וְשֵׁשׁ אִישׁ";
        let keywords = ["שֵׁשׁ", "וְשֵׁשׁ"];
        let map = map_spans(text, &[q("שֵׁשׁ מֵאוֹת", 600)], &keywords).unwrap();

        let keyword_spans: Vec<_> = map
            .spans
            .iter()
            .filter(|s| s.kind == SpanKind::Keyword)
            .collect();
        assert_eq!(keyword_spans.len(), 1);
        let span = keyword_spans[0];
        assert_eq!(&text[span.start..span.end], "וְשֵׁשׁ");
    }

    #[test]
    fn splice_order_is_descending() {
        let text = "שֵׁשׁ וְשֶׁבַע וּשְׁמֹנֶה";
        let quotations = [q("שֵׁשׁ", 6), q("וּשְׁמֹנֶה", 8)];
        let map = map_spans(text, &quotations, &["וְשֶׁבַע"]).unwrap();
        let starts: Vec<_> = map.splice_order().iter().map(|s| s.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(starts, sorted);
        assert_eq!(starts.len(), 3);
    }
}
