//! Property tests over tokenizer, extractor and span mapper.

use hebrew_numerals::{
    map_spans, numeral_keywords, tokenize, Error, ExtractorConfig, Extractor, NumericQuotation,
    Value,
};
use proptest::prelude::*;

/// Vocabulary words, their prefixed forms, and ordinary words. Years are the only unit, so
/// every duration has a single component and extraction cannot fail.
const WORDS: &[&str] = &[
    "אֶחָד",
    "שְׁנַיִם",
    "שְׁנֵי",
    "שָׁלֹשׁ",
    "אַרְבַּע",
    "וְאַרְבָּעִים",
    "חֲמִשָּׁה",
    "שֵׁשׁ",
    "וְשֵׁשׁ",
    "שֶׁבַע",
    "שָׁבַע",
    "שְׁמֹנֶה",
    "תֵּשַׁע",
    "עָשָׂר",
    "עֶשְׂרִים",
    "וּשְׁלֹשִׁים",
    "וְשִׁבְעִים",
    "מֵאָה",
    "וּמֵאָה",
    "מֵאוֹת",
    "אֶלֶף",
    "אֲלָפִים",
    "רִבּוֹא",
    "הַשֵּׁנִי",
    "הָאֶחָד",
    "הָאַחַת",
    "שָׁנָה",
    "שָׁנִים",
    "בִּשְׁנַת",
    "בְּאֵר",
    "מִבְּאֵר",
    "חַיֵּי",
    "שָׁנִי",
    "אִישׁ",
    "וַיְהִי",
    "אָדָם",
    "ארבע",
    "מאות",
    "מאת",
    "שנה",
    "שנים",
];

/// Month, day and night words, which can combine with years into several components.
const OTHER_UNITS: &[&str] = &["בַּחֹדֶשׁ", "חֳדָשִׁים", "יוֹם", "יָמִים", "לַיְלָה"];

const SEPARATORS: &[&str] = &[" ", " ", " ", ", ", "־", "׃ ", " ׀ "];

fn text_from(vocabulary: Vec<&'static str>) -> impl Strategy<Value = String> {
    prop::collection::vec(
        (prop::sample::select(vocabulary), prop::sample::select(SEPARATORS)),
        0..14,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .map(|(word, sep)| format!("{}{}", word, sep))
            .collect::<String>()
    })
}

fn verse_text() -> impl Strategy<Value = String> {
    text_from(WORDS.to_vec())
}

fn mixed_unit_text() -> impl Strategy<Value = String> {
    text_from(WORDS.iter().chain(OTHER_UNITS).copied().collect())
}

proptest! {
    #[test]
    fn tokenizer_round_trips(text in any::<String>()) {
        let joined: String = tokenize(&text).iter().map(|t| t.text).collect();
        prop_assert_eq!(joined, text);
    }

    #[test]
    fn tokens_alternate(text in "[א-ת ֵָ,.׃־a-z]{0,40}") {
        let tokens = tokenize(&text);
        prop_assert!(tokens.len() % 2 == 1);
        for (i, token) in tokens.iter().enumerate() {
            prop_assert_eq!(token.is_word, i % 2 == 0);
            prop_assert_eq!(&text[token.start..token.end()], token.text);
        }
    }

    #[test]
    fn extraction_is_idempotent(text in verse_text()) {
        let extractor = Extractor::default();
        let first = extractor.extract(&text).map_err(|e| e.to_string());
        let second = extractor.extract(&text).map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn quotes_are_substrings_and_never_zero(text in verse_text()) {
        let quotations = Extractor::default().extract(&text);
        prop_assert!(quotations.is_ok(), "{:?} failed: {:?}", text, quotations);
        for q in &quotations.unwrap() {
            prop_assert!(text.contains(&q.quote), "quote {:?} not in {:?}", q.quote, text);
            prop_assert!(!q.value.is_zero(), "zero value from {:?}", text);
        }
    }

    #[test]
    fn mixed_units_fail_only_on_kind_mismatch(text in mixed_unit_text()) {
        match Extractor::default().extract(&text) {
            Ok(quotations) => {
                for q in &quotations {
                    prop_assert!(text.contains(&q.quote));
                    prop_assert!(!q.value.is_zero(), "zero value from {:?}", text);
                }
            }
            Err(e) => prop_assert!(
                matches!(e, Error::KindMismatch { .. }),
                "{:?} failed with {}", text, e
            ),
        }
    }

    #[test]
    fn extracted_spans_never_overlap(text in verse_text()) {
        let quotations = Extractor::default().extract(&text).unwrap();
        let map = map_spans(&text, &quotations, numeral_keywords()).unwrap();
        for (i, a) in map.spans.iter().enumerate() {
            for b in &map.spans[i + 1..] {
                prop_assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn arbitrary_quotations_never_overlap(
        text in verse_text(),
        picks in prop::collection::vec(0usize..64, 0..6),
    ) {
        // Quotations built from the verse's own words, repeats included
        let words: Vec<&str> = tokenize(&text)
            .iter()
            .filter(|t| t.is_word && !t.text.is_empty())
            .map(|t| t.text)
            .collect();
        let quotations: Vec<NumericQuotation> = picks
            .iter()
            .filter(|_| !words.is_empty())
            .map(|at| NumericQuotation::new(words[at % words.len()], Value::Integer(1), ""))
            .collect();
        let map = map_spans(&text, &quotations, numeral_keywords()).unwrap();
        for (i, a) in map.spans.iter().enumerate() {
            for b in &map.spans[i + 1..] {
                prop_assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn exception_pairs_never_quoted_together(text in verse_text()) {
        let config = ExtractorConfig::default();
        let quotations = Extractor::new(config.clone()).unwrap().extract(&text).unwrap();
        let pairs = config
            .exceptions
            .previous_word
            .iter()
            .chain(&config.exceptions.next_word);
        for q in &quotations {
            let words: Vec<&str> = tokenize(&q.quote)
                .iter()
                .filter(|t| t.is_word)
                .map(|t| t.text)
                .collect();
            for (a, b) in pairs.clone() {
                let adjacent = words.windows(2).any(|w| w[0] == a.as_str() && w[1] == b.as_str());
                prop_assert!(!adjacent, "{:?} quoted {:?} {:?}", q.quote, a, b);
            }
        }
    }
}
