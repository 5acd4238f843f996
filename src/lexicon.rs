//! Compiled-in numeral and temporal vocabulary.
//!
//! Words are looked up by consonantal skeleton (every combining mark removed). When a
//! skeleton carries more than one sense, the pointing decides: a pointed token must match
//! one sense's vowel key exactly, an unpointed token falls back to the first sense
//! registered and is reported as ambiguous.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::value::TimeUnit;

/// Magnitude class of a cardinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Unit,
    Ten,
    Hundred,
    Thousand,
}

/// What a vocabulary word means to the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lexeme {
    Cardinal { value: u64, rank: Rank },
    Ordinal(u64),
    /// Plural hundreds/thousands/ten-thousands and the singular thousand and ten-thousand words.
    Multiplier(u64),
    Temporal(TimeUnit),
    /// "in the year of": opens a calendar-date phrase.
    DateStarter(TimeUnit),
}

impl Lexeme {
    /// Cardinals, ordinals and multipliers: words that carry a magnitude.
    pub fn is_numeral(&self) -> bool {
        matches!(
            self,
            Lexeme::Cardinal { .. } | Lexeme::Ordinal(_) | Lexeme::Multiplier(_)
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Lexeme::Temporal(_))
    }
}

const fn unit(value: u64) -> Lexeme {
    Lexeme::Cardinal { value, rank: Rank::Unit }
}

const fn ten(value: u64) -> Lexeme {
    Lexeme::Cardinal { value, rank: Rank::Ten }
}

const fn hundred(value: u64) -> Lexeme {
    Lexeme::Cardinal { value, rank: Rank::Hundred }
}

const fn thousand(value: u64) -> Lexeme {
    Lexeme::Cardinal { value, rank: Rank::Thousand }
}

// Absolute, construct and pausal forms, followed by the common plene spellings.
const CARDINALS: &[(&str, Lexeme)] = &[
    ("אֶחָד", unit(1)),
    ("אַחַד", unit(1)),
    ("אַחַת", unit(1)),
    ("עַשְׁתֵּי", unit(1)),
    ("שְׁנַיִם", unit(2)),
    ("שְׁנָיִם", unit(2)),
    ("שְׁנֵי", unit(2)),
    ("שְׁנֵים", unit(2)),
    ("שְׁתַּיִם", unit(2)),
    ("שְׁתָּיִם", unit(2)),
    ("שְׁתֵּי", unit(2)),
    ("שְׁתֵּים", unit(2)),
    ("שָׁלֹשׁ", unit(3)),
    ("שְׁלֹשׁ", unit(3)),
    ("שְׁלֹשָׁה", unit(3)),
    ("שְׁלֹשֶׁת", unit(3)),
    ("שָׁלוֹשׁ", unit(3)),
    ("שְׁלוֹשׁ", unit(3)),
    ("שְׁלוֹשָׁה", unit(3)),
    ("שְׁלוֹשֶׁת", unit(3)),
    ("אַרְבַּע", unit(4)),
    ("אַרְבָּע", unit(4)),
    ("אַרְבָּעָה", unit(4)),
    ("אַרְבַּעַת", unit(4)),
    ("חָמֵשׁ", unit(5)),
    ("חֲמֵשׁ", unit(5)),
    ("חֲמִשָּׁה", unit(5)),
    ("חֲמֵשֶׁת", unit(5)),
    ("שֵׁשׁ", unit(6)),
    ("שִׁשָּׁה", unit(6)),
    ("שֵׁשֶׁת", unit(6)),
    ("שֶׁבַע", unit(7)),
    ("שְׁבַע", unit(7)),
    ("שָׁבַע", unit(7)),
    ("שִׁבְעָה", unit(7)),
    ("שִׁבְעַת", unit(7)),
    ("שְׁמֹנֶה", unit(8)),
    ("שְׁמֹנָה", unit(8)),
    ("שְׁמֹנַת", unit(8)),
    ("שְׁמוֹנֶה", unit(8)),
    ("שְׁמוֹנָה", unit(8)),
    ("שְׁמוֹנַת", unit(8)),
    ("תֵּשַׁע", unit(9)),
    ("תְּשַׁע", unit(9)),
    ("תִּשְׁעָה", unit(9)),
    ("תִּשְׁעַת", unit(9)),
    ("עֶשֶׂר", ten(10)),
    ("עָשָׂר", ten(10)),
    ("עֲשָׂרָה", ten(10)),
    ("עֶשְׂרֵה", ten(10)),
    ("עֲשֶׂרֶת", ten(10)),
    ("עֶשְׂרִים", ten(20)),
    ("שְׁלֹשִׁים", ten(30)),
    ("שְׁלוֹשִׁים", ten(30)),
    ("אַרְבָּעִים", ten(40)),
    ("חֲמִשִּׁים", ten(50)),
    ("שִׁשִּׁים", ten(60)),
    ("שִׁבְעִים", ten(70)),
    ("שְׁמֹנִים", ten(80)),
    ("שְׁמוֹנִים", ten(80)),
    ("תִּשְׁעִים", ten(90)),
    ("מֵאָה", hundred(100)),
    ("מְאַת", hundred(100)),
];

// Registered after the multipliers so that unpointed אלפים reads as "thousands".
const COUPLES: &[(&str, Lexeme)] = &[
    ("מָאתַיִם", hundred(200)),
    ("אַלְפַּיִם", thousand(2000)),
];

const MULTIPLIERS: &[(&str, Lexeme)] = &[
    ("מֵאוֹת", Lexeme::Multiplier(100)),
    ("אֶלֶף", Lexeme::Multiplier(1000)),
    ("אָלֶף", Lexeme::Multiplier(1000)),
    ("אֲלָפִים", Lexeme::Multiplier(1000)),
    ("אַלְפֵי", Lexeme::Multiplier(1000)),
    ("רְבָבָה", Lexeme::Multiplier(10000)),
    ("רְבָבוֹת", Lexeme::Multiplier(10000)),
    ("רִבּוֹא", Lexeme::Multiplier(10000)),
    ("רִבֹּא", Lexeme::Multiplier(10000)),
    ("רִבּוֹ", Lexeme::Multiplier(10000)),
    ("רִבֹּאוֹת", Lexeme::Multiplier(10000)),
];

const ORDINALS: &[(&str, Lexeme)] = &[
    ("רִאשׁוֹן", Lexeme::Ordinal(1)),
    ("רִאשֹׁן", Lexeme::Ordinal(1)),
    ("רִאשׁוֹנָה", Lexeme::Ordinal(1)),
    ("רִאשֹׁנָה", Lexeme::Ordinal(1)),
    ("שֵׁנִי", Lexeme::Ordinal(2)),
    ("שֵׁנִית", Lexeme::Ordinal(2)),
    ("שְׁלִישִׁי", Lexeme::Ordinal(3)),
    ("שְׁלִשִׁי", Lexeme::Ordinal(3)),
    ("שְׁלִישִׁית", Lexeme::Ordinal(3)),
    ("שְׁלִשִׁית", Lexeme::Ordinal(3)),
    ("רְבִיעִי", Lexeme::Ordinal(4)),
    ("רְבִעִי", Lexeme::Ordinal(4)),
    ("רְבִיעִית", Lexeme::Ordinal(4)),
    ("חֲמִישִׁי", Lexeme::Ordinal(5)),
    ("חֲמִשִׁי", Lexeme::Ordinal(5)),
    ("חֲמִישִׁית", Lexeme::Ordinal(5)),
    ("שִׁשִּׁי", Lexeme::Ordinal(6)),
    ("שִׁשִּׁית", Lexeme::Ordinal(6)),
    ("שְׁבִיעִי", Lexeme::Ordinal(7)),
    ("שְׁבִעִי", Lexeme::Ordinal(7)),
    ("שְׁבִיעִית", Lexeme::Ordinal(7)),
    ("שְׁמִינִי", Lexeme::Ordinal(8)),
    ("שְׁמִינִית", Lexeme::Ordinal(8)),
    ("תְּשִׁיעִי", Lexeme::Ordinal(9)),
    ("תְּשִׁיעִית", Lexeme::Ordinal(9)),
    ("עֲשִׂירִי", Lexeme::Ordinal(10)),
    ("עֲשִׂירִית", Lexeme::Ordinal(10)),
];

const TEMPORALS: &[(&str, Lexeme)] = &[
    ("שָׁנָה", Lexeme::Temporal(TimeUnit::Year)),
    ("שָׁנִים", Lexeme::Temporal(TimeUnit::Year)),
    ("שְׁנוֹת", Lexeme::Temporal(TimeUnit::Year)),
    ("חֹדֶשׁ", Lexeme::Temporal(TimeUnit::Month)),
    ("חוֹדֶשׁ", Lexeme::Temporal(TimeUnit::Month)),
    ("חֳדָשִׁים", Lexeme::Temporal(TimeUnit::Month)),
    ("יוֹם", Lexeme::Temporal(TimeUnit::Day)),
    ("יָמִים", Lexeme::Temporal(TimeUnit::Day)),
    ("יְמֵי", Lexeme::Temporal(TimeUnit::Day)),
    ("לַיְלָה", Lexeme::Temporal(TimeUnit::Night)),
    ("לָיְלָה", Lexeme::Temporal(TimeUnit::Night)),
    ("לֵילוֹת", Lexeme::Temporal(TimeUnit::Night)),
    ("לֵיל", Lexeme::Temporal(TimeUnit::Night)),
    ("שְׁנַת", Lexeme::DateStarter(TimeUnit::Year)),
];

// Non-numeral words spelled like a vocabulary word; they force pointed tokens to be matched
// by vowels. Only registered under skeletons that already carry a sense.
const HOMOGRAPHS: &[&str] = &[
    "שָׁנִי",     // scarlet
    "שֵׁנָה",     // sleep
    "חָדָשׁ",     // new
    "חֲדָשִׁים",  // new (pl.)
    "מֵאֵת",     // from
    "עֹשֶׁר",     // wealth
    "שָׂבַע",     // satiated
    "שָׁלִשִׁים",  // officers
    "חֲמֻשִׁים",  // armed
    "יַמִּים",    // seas
];

/// A word as the lexicon sees it: consonants only.
pub fn skeleton(word: &str) -> String {
    word.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Letters plus vowel points and the shin/sin dots. Dagesh, meteg and cantillation are dropped.
pub fn vowel_key(word: &str) -> String {
    word.nfd()
        .filter_map(|c| match c {
            '\u{05BA}' => Some('\u{05B9}'),
            '\u{05C7}' => Some('\u{05B8}'),
            '\u{05B0}'..='\u{05BB}' | '\u{05C1}' | '\u{05C2}' => Some(c),
            _ if is_combining_mark(c) => None,
            _ => Some(c),
        })
        .collect()
}

/// Whether the word carries any vowel point.
pub fn has_vowels(word: &str) -> bool {
    word.nfd()
        .any(|c| matches!(c, '\u{05B0}'..='\u{05BB}' | '\u{05C7}'))
}

#[derive(Debug, Clone)]
struct Sense {
    vowels: String,
    lexeme: Option<Lexeme>,
}

/// Result of looking a word up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub lexeme: Lexeme,
    /// The word was unpointed and its skeleton has more than one sense.
    pub ambiguous: bool,
}

/// Skeleton-indexed vocabulary.
#[derive(Debug)]
pub struct Lexicon {
    senses: HashMap<String, Vec<Sense>>,
}

static LEXICON: Lazy<Lexicon> = Lazy::new(Lexicon::build);

static NUMERAL_KEYWORDS: Lazy<Vec<String>> = Lazy::new(|| {
    let mut keywords = Vec::new();
    for (form, _) in CARDINALS.iter().chain(MULTIPLIERS).chain(COUPLES) {
        keywords.push(form.to_string());
        keywords.push(format!("וְ{}", form));
        keywords.push(format!("וּ{}", form));
    }
    keywords
});

impl Lexicon {
    fn build() -> Self {
        let mut senses: HashMap<String, Vec<Sense>> = HashMap::new();
        let tables = [CARDINALS, MULTIPLIERS, COUPLES, ORDINALS, TEMPORALS];
        for (form, lexeme) in tables.iter().flat_map(|t| t.iter()) {
            senses.entry(skeleton(form)).or_default().push(Sense {
                vowels: vowel_key(form),
                lexeme: Some(*lexeme),
            });
        }
        for form in HOMOGRAPHS {
            if let Some(existing) = senses.get_mut(&skeleton(form)) {
                existing.push(Sense {
                    vowels: vowel_key(form),
                    lexeme: None,
                });
            }
        }
        Lexicon { senses }
    }

    /// The process-wide lexicon.
    pub fn global() -> &'static Lexicon {
        &LEXICON
    }

    pub fn classify(&self, word: &str) -> Option<Classification> {
        let senses = self.senses.get(&skeleton(word))?;
        let first = senses.first()?.lexeme?;

        if senses.iter().all(|s| s.lexeme == Some(first)) {
            return Some(Classification {
                lexeme: first,
                ambiguous: false,
            });
        }

        if !has_vowels(word) {
            return Some(Classification {
                lexeme: first,
                ambiguous: true,
            });
        }

        let key = vowel_key(word);
        senses
            .iter()
            .find(|s| s.vowels == key)
            .and_then(|s| s.lexeme)
            .map(|lexeme| Classification {
                lexeme,
                ambiguous: false,
            })
    }

    /// The temporal unit among the senses of `word`'s skeleton, whatever sense comes first.
    pub fn temporal_sense(&self, word: &str) -> Option<TimeUnit> {
        self.senses.get(&skeleton(word))?.iter().find_map(|s| match s.lexeme {
            Some(Lexeme::Temporal(unit)) => Some(unit),
            _ => None,
        })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.classify(word).is_some()
    }
}

/// Bare numeral surface forms with their "and"-prefixed variants, for keyword highlighting.
pub fn numeral_keywords() -> &'static [String] {
    &NUMERAL_KEYWORDS
}
