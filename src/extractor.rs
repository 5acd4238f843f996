//! Numeral and duration phrase extraction.
//!
//! A verse is tokenized and every word resolved once against the lexicon. The extractor then
//! walks the word tokens with a two-state machine: [`Phase::Idle`] or
//! [`Phase::Accumulating`] with an open [`PhraseState`]. Each word is handed to
//! [`VerseScan::step`], which returns the next phase and whatever quotations the word closed.
//!
//! Inside a phrase magnitudes are built in two levels. The [`Segment`] holds the pending parts
//! ("four", then "four hundred", then "and seventy"), the running total holds what temporal
//! words have already folded in ("nine hundred years").

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::config::{ExceptionTables, ExtractorConfig};
use crate::error::Result;
use crate::lexicon::{skeleton, Lexeme, Lexicon, Rank};
use crate::prefix::{resolve, ConjugateLetter, ResolvedWord};
use crate::tokenizer::{tokenize, Token};
use crate::value::{Duration, TimeUnit, Value};
use crate::verse::{NumericQuotation, Verse, VerseQuotations};

/// Word tokens sit at even positions, so a phrase grows by two tokens per word.
const WORD_STRIDE: usize = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Segment
// ─────────────────────────────────────────────────────────────────────────────

/// Pending magnitude parts of the open phrase, not yet folded into its total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    parts: Vec<u64>,
}

impl Segment {
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn push(&mut self, part: u64) {
        self.parts.push(part);
    }

    pub fn sum(&self) -> u64 {
        self.parts.iter().fold(0, |acc, p| acc.saturating_add(*p))
    }

    /// Sum of the parts; the segment is left empty.
    pub fn take_sum(&mut self) -> u64 {
        let sum = self.sum();
        self.parts.clear();
        sum
    }

    /// Multiplies the trailing parts smaller than `weight` as one group ("three" + "thousands"),
    /// or the last part when none is smaller ("thousand" + "thousands").
    ///
    /// Returns false when the segment is empty and nothing was multiplied.
    pub fn apply_multiplier(&mut self, weight: u64) -> bool {
        if self.parts.is_empty() {
            return false;
        }
        let group_start = self
            .parts
            .iter()
            .rposition(|p| *p >= weight)
            .map_or(0, |i| i + 1);
        if group_start < self.parts.len() {
            let group = self.parts.split_off(group_start);
            let sum = group.iter().fold(0u64, |acc, p| acc.saturating_add(*p));
            self.parts.push(sum.saturating_mul(weight));
        } else if let Some(last) = self.parts.last_mut() {
            *last = last.saturating_mul(weight);
        }
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Phrase state
// ─────────────────────────────────────────────────────────────────────────────

/// Working state of one open phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseState {
    /// Token index of the first word.
    pub start: usize,
    /// Token index of the last word.
    pub end: usize,
    pub segment: Segment,
    pub total: Value,
    /// A numeral word has been read. Phrases of temporal words alone are discarded.
    pub has_magnitude: bool,
    pub saw_multiplier: bool,
}

impl PhraseState {
    fn open(index: usize) -> Self {
        PhraseState {
            start: index,
            end: index,
            segment: Segment::default(),
            total: Value::Integer(0),
            has_magnitude: false,
            saw_multiplier: false,
        }
    }

    fn date_seed(index: usize, unit: TimeUnit) -> Self {
        PhraseState {
            total: Value::Duration(Duration::date_seed(unit)),
            ..Self::open(index)
        }
    }

    fn extend_to(&mut self, index: usize) {
        debug_assert_eq!(index, self.end + WORD_STRIDE, "phrase must grow one word at a time");
        self.end = index;
    }

    /// Opened by a date word, no number read yet ("in the month, the second").
    pub fn is_fresh_date_seed(&self) -> bool {
        !self.has_magnitude && matches!(self.total, Value::Duration(d) if d.is_date)
    }

    fn value(&self) -> Result<Value> {
        self.total.checked_add(Value::Integer(self.segment.sum()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Accumulating(PhraseState),
}

/// A quotation together with the token range it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub quotation: NumericQuotation,
    pub first_token: usize,
    pub last_token: usize,
}

/// Outcome of feeding one word to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub phase: Phase,
    pub emitted: Vec<Emission>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Exceptions
// ─────────────────────────────────────────────────────────────────────────────

/// Exception tables keyed by skeleton, so that pausal and plene spellings are caught too.
#[derive(Debug, Clone)]
struct Blocklist {
    previous_word: HashSet<(String, String)>,
    next_word: HashSet<(String, String)>,
    words: HashSet<String>,
    /// Prefix letters that may be peeled off the previous word ("from Beersheba").
    max_prefix_depth: usize,
}

impl Blocklist {
    fn new(tables: &ExceptionTables, max_prefix_depth: usize) -> Self {
        Blocklist {
            previous_word: skeleton_pairs(&tables.previous_word),
            next_word: skeleton_pairs(&tables.next_word),
            words: tables.words.iter().map(|w| skeleton(w)).collect(),
            max_prefix_depth,
        }
    }

    fn blocks(&self, previous: Option<&str>, current: &str, next: Option<&str>) -> bool {
        let current = skeleton(current);
        if self.words.contains(&current) {
            return true;
        }
        let follows_blocked = previous.map_or(false, |p| {
            self.previous_forms(&skeleton(p))
                .into_iter()
                .any(|form| self.previous_word.contains(&(form, current.clone())))
        });
        let precedes_blocked = next
            .map(|n| self.next_word.contains(&(current.clone(), skeleton(n))))
            .unwrap_or(false);
        follows_blocked || precedes_blocked
    }

    /// The previous word's skeleton, then the same with each leading prefix letter removed.
    fn previous_forms(&self, previous: &str) -> Vec<String> {
        let mut forms = vec![previous.to_string()];
        let mut rest = previous;
        for _ in 0..self.max_prefix_depth {
            let mut chars = rest.chars();
            match chars.next() {
                Some(c) if ConjugateLetter::ALL.iter().any(|l| l.letter() == c) => {
                    rest = chars.as_str();
                    if rest.is_empty() {
                        break;
                    }
                    forms.push(rest.to_string());
                }
                _ => break,
            }
        }
        forms
    }
}

fn skeleton_pairs(list: &[(String, String)]) -> HashSet<(String, String)> {
    list.iter().map(|(a, b)| (skeleton(a), skeleton(b))).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Extractor
// ─────────────────────────────────────────────────────────────────────────────

/// Rule-based numeral phrase extractor.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    lexicon: &'static Lexicon,
    blocklist: Blocklist,
}

impl Default for Extractor {
    fn default() -> Self {
        let config = ExtractorConfig::default();
        let blocklist = Blocklist::new(&config.exceptions, config.max_prefix_depth);
        Extractor {
            config,
            lexicon: Lexicon::global(),
            blocklist,
        }
    }
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        let blocklist = Blocklist::new(&config.exceptions, config.max_prefix_depth);
        Ok(Extractor {
            config,
            lexicon: Lexicon::global(),
            blocklist,
        })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Tokenizes and resolves `text` without running the state machine.
    pub fn scan<'e, 't>(&'e self, text: &'t str) -> VerseScan<'e, 't> {
        VerseScan::new(self, text)
    }

    /// All quotations in `text`, in order.
    pub fn extract(&self, text: &str) -> Result<Vec<NumericQuotation>> {
        self.scan(text).run()
    }

    pub fn extract_verse(&self, verse: &Verse) -> Result<VerseQuotations> {
        let quotations = self.extract(&verse.text)?;
        if !quotations.is_empty() {
            debug!(verse = %verse.id, count = quotations.len(), "extracted quotations");
        }
        Ok(VerseQuotations {
            verse: verse.clone(),
            quotations,
        })
    }
}

/// One verse, tokenized, with every word resolved.
#[derive(Debug)]
pub struct VerseScan<'e, 't> {
    extractor: &'e Extractor,
    text: &'t str,
    tokens: Vec<Token<'t>>,
    /// One per word token.
    words: Vec<ResolvedWord<'t>>,
    blocked: Vec<bool>,
}

impl<'e, 't> VerseScan<'e, 't> {
    fn new(extractor: &'e Extractor, text: &'t str) -> Self {
        let tokens = tokenize(text);
        let words: Vec<_> = tokens
            .iter()
            .step_by(WORD_STRIDE)
            .map(|t| resolve(extractor.lexicon, t.text, extractor.config.max_prefix_depth))
            .collect();

        let raw: Vec<&str> = tokens.iter().step_by(WORD_STRIDE).map(|t| t.text).collect();
        let blocked = (0..raw.len())
            .map(|i| {
                let previous = i.checked_sub(1).map(|p| raw[p]);
                let next = raw.get(i + 1).copied();
                !raw[i].is_empty() && extractor.blocklist.blocks(previous, raw[i], next)
            })
            .collect();

        VerseScan {
            extractor,
            text,
            tokens,
            words,
            blocked,
        }
    }

    pub fn tokens(&self) -> &[Token<'t>] {
        &self.tokens
    }

    /// The resolved word at token `index` (an even position).
    pub fn word(&self, index: usize) -> &ResolvedWord<'t> {
        &self.words[index / WORD_STRIDE]
    }

    fn next_word(&self, index: usize) -> Option<&ResolvedWord<'t>> {
        self.words.get(index / WORD_STRIDE + 1)
    }

    fn previous_word(&self, index: usize) -> Option<&ResolvedWord<'t>> {
        index
            .checked_sub(WORD_STRIDE)
            .map(|p| &self.words[p / WORD_STRIDE])
    }

    fn is_blocked(&self, index: usize) -> bool {
        self.blocked[index / WORD_STRIDE]
    }

    fn run(&self) -> Result<Vec<NumericQuotation>> {
        let mut phase = Phase::Idle;
        let mut claimed: Option<usize> = None;
        let mut quotations = Vec::new();

        for index in (0..self.tokens.len()).step_by(WORD_STRIDE) {
            if index > 0
                && self.extractor.config.stop_at_sentence_end
                && self.tokens[index - 1].is_hard_stop()
            {
                if let Some(emission) = self.close(phase, claimed)? {
                    claimed = Some(emission.last_token);
                    quotations.push(emission.quotation);
                }
                phase = Phase::Idle;
            }
            if self.tokens[index].text.is_empty() {
                continue;
            }

            let step = self.step(phase, index, claimed)?;
            for emission in step.emitted {
                claimed = Some(emission.last_token);
                quotations.push(emission.quotation);
            }
            phase = step.phase;
        }

        if let Some(emission) = self.close(phase, claimed)? {
            quotations.push(emission.quotation);
        }
        Ok(quotations)
    }

    /// Feeds the word at token `index` to the state machine.
    ///
    /// `claimed` is the last token index covered by a quotation already emitted in this verse.
    pub fn step(&self, phase: Phase, index: usize, claimed: Option<usize>) -> Result<Step> {
        let word = self.word(index);
        let mut claimed = claimed;
        let mut emitted = Vec::new();
        let mut close = |phase: Phase, claimed: &mut Option<usize>| -> Result<Phase> {
            if let Some(emission) = self.close(phase, *claimed)? {
                *claimed = Some(emission.last_token);
                emitted.push(emission);
            }
            Ok(Phase::Idle)
        };

        if self.is_blocked(index) {
            trace!(index, token = word.root, "exception list, read as text");
            let phase = close(phase, &mut claimed)?;
            return Ok(Step { phase, emitted });
        }

        let Some(lexeme) = word.lexeme else {
            let phase = close(phase, &mut claimed)?;
            return Ok(Step { phase, emitted });
        };

        let mut phase = phase;
        if let Some(previous) = self.previous_word(index) {
            if previous.lexeme.is_some() && previous.key == word.key {
                trace!(index, token = word.root, "repeated word, phrase break");
                phase = close(phase, &mut claimed)?;
            }
        }
        let lexeme = self.reading(word, lexeme, &phase);

        if phase == Phase::Idle && self.is_literal_one(index, lexeme) {
            trace!(index, token = word.root, "literal one");
            let token = &self.tokens[index];
            emitted.push(Emission {
                quotation: NumericQuotation::new(token.text, Value::Integer(1), ""),
                first_token: index,
                last_token: index,
            });
            return Ok(Step {
                phase: Phase::Idle,
                emitted,
            });
        }

        if let Some(unit) = date_unit(word, lexeme) {
            trace!(index, token = word.root, ?unit, "date starter");
            close(phase, &mut claimed)?;
            return Ok(Step {
                phase: Phase::Accumulating(PhraseState::date_seed(index, unit)),
                emitted,
            });
        }

        match lexeme {
            Lexeme::Temporal(unit) => {
                let state = match phase {
                    Phase::Accumulating(state) if word.has_plain_prefixes() => state,
                    other => {
                        let phase = close(other, &mut claimed)?;
                        return Ok(Step { phase, emitted });
                    }
                };
                let state = fold_temporal(state, index, unit)?;
                trace!(index, token = word.root, total = %state.total, "temporal fold");
                Ok(Step {
                    phase: Phase::Accumulating(state),
                    emitted,
                })
            }
            Lexeme::Cardinal { .. } | Lexeme::Ordinal(_) | Lexeme::Multiplier(_) => {
                let saw_multiplier =
                    matches!(&phase, Phase::Accumulating(state) if state.saw_multiplier);
                if word.ambiguous
                    && matches!(lexeme, Lexeme::Cardinal { rank: Rank::Hundred, .. })
                    && !saw_multiplier
                    && !self
                        .next_word(index)
                        .map_or(false, |next| self.is_temporal_word(next))
                {
                    trace!(index, token = word.root, "lone hundred, read as text");
                    let phase = close(phase, &mut claimed)?;
                    return Ok(Step { phase, emitted });
                }

                let mut state = match phase {
                    Phase::Accumulating(state)
                        if word.prefixes.is_empty()
                            || word.has_only_and()
                            || state.is_fresh_date_seed() =>
                    {
                        let mut state = state;
                        state.extend_to(index);
                        state
                    }
                    other => {
                        close(other, &mut claimed)?;
                        PhraseState::open(index)
                    }
                };
                add_numeral(&mut state, word, lexeme)?;
                trace!(index, token = word.root, parts = ?state.segment.parts(), "numeral");
                Ok(Step {
                    phase: Phase::Accumulating(state),
                    emitted,
                })
            }
            Lexeme::DateStarter(_) => {
                // date_unit() always claims these
                let phase = close(phase, &mut claimed)?;
                Ok(Step { phase, emitted })
            }
        }
    }

    /// An unpointed bare word that directly follows pending numerals is read as its temporal
    /// sense when it has one ("seven years", not "seven two").
    fn reading(&self, word: &ResolvedWord<'_>, lexeme: Lexeme, phase: &Phase) -> Lexeme {
        let counting = matches!(phase, Phase::Accumulating(state) if !state.segment.is_empty());
        if !word.ambiguous || !word.prefixes.is_empty() || lexeme.is_temporal() || !counting {
            return lexeme;
        }
        match self.extractor.lexicon.temporal_sense(word.root) {
            Some(unit) => {
                trace!(token = word.root, ?unit, "ambiguous word read as temporal");
                Lexeme::Temporal(unit)
            }
            None => lexeme,
        }
    }

    fn is_literal_one(&self, index: usize, lexeme: Lexeme) -> bool {
        let word = self.word(index);
        matches!(lexeme, Lexeme::Cardinal { value: 1, .. })
            && word.innermost_prefix() == Some(ConjugateLetter::The)
            && !self.next_word(index).map_or(false, |next| {
                matches!(next.lexeme, Some(Lexeme::Cardinal { rank: Rank::Ten, .. }))
            })
    }

    /// A temporal word, or an unpointed word one of whose senses is temporal.
    fn is_temporal_word(&self, word: &ResolvedWord<'_>) -> bool {
        match word.lexeme {
            Some(lexeme) if lexeme.is_temporal() => true,
            Some(_) if word.ambiguous => self.extractor.lexicon.temporal_sense(word.root).is_some(),
            _ => false,
        }
    }

    /// Terminates `phase`, producing a quotation when it holds a non-zero magnitude.
    fn close(&self, phase: Phase, claimed: Option<usize>) -> Result<Option<Emission>> {
        match phase {
            Phase::Idle => Ok(None),
            Phase::Accumulating(state) => self.finish(state, claimed),
        }
    }

    fn finish(&self, state: PhraseState, claimed: Option<usize>) -> Result<Option<Emission>> {
        let mut start = state.start;
        let end = state.end;
        let mut value = state.value()?;

        if !state.has_magnitude {
            debug!(start, end, "discarding phrase of temporal words only");
            return Ok(None);
        }

        if let Value::Integer(days) = value {
            if let Some(day_index) = self.preceding_day_word(start, claimed) {
                value = Value::Duration(Duration::days(days));
                start = day_index;
            }
        }

        if value.is_zero() {
            debug!(start, end, "discarding zero-valued phrase");
            return Ok(None);
        }

        let entity = match value {
            Value::Integer(_) if self.extractor.config.label_entities => self.entity_after(end),
            _ => String::new(),
        };
        let quote = &self.text[self.tokens[start].start..self.tokens[end].end()];
        let quotation = NumericQuotation::new(quote, value, entity);
        debug!(quote, value = %quotation.value, entity = %quotation.entity, "emitting quotation");

        Ok(Some(Emission {
            quotation,
            first_token: start,
            last_token: end,
        }))
    }

    /// Token index of an unclaimed day word directly before `start`.
    fn preceding_day_word(&self, start: usize, claimed: Option<usize>) -> Option<usize> {
        let day_index = start.checked_sub(WORD_STRIDE)?;
        if claimed.map_or(false, |c| day_index <= c) || self.is_blocked(day_index) {
            return None;
        }
        if self.extractor.config.stop_at_sentence_end && self.tokens[start - 1].is_hard_stop() {
            return None;
        }
        let day = self.word(day_index);
        let is_day = matches!(day.lexeme, Some(Lexeme::Temporal(TimeUnit::Day)));
        (is_day && day.has_plain_prefixes()).then_some(day_index)
    }

    /// The counted noun: the next word, if it is not itself a vocabulary word.
    fn entity_after(&self, end: usize) -> String {
        let Some(separator) = self.tokens.get(end + 1) else {
            return String::new();
        };
        if separator.is_hard_stop() {
            return String::new();
        }
        match self.next_word(end) {
            Some(next) if next.lexeme.is_none() && !next.root.is_empty() => {
                self.tokens[end + WORD_STRIDE].text.to_string()
            }
            _ => String::new(),
        }
    }
}

/// The unit a date phrase opens with: a date-starter word, or a year/month/day word
/// whose innermost prefix is "in" ("in the month").
fn date_unit(word: &ResolvedWord<'_>, lexeme: Lexeme) -> Option<TimeUnit> {
    match lexeme {
        Lexeme::DateStarter(unit) => Some(unit),
        Lexeme::Temporal(unit) if unit != TimeUnit::Night => {
            let (innermost, outer) = word.prefixes.split_last()?;
            let starts = *innermost == ConjugateLetter::In
                && outer.iter().all(|p| *p == ConjugateLetter::And);
            starts.then_some(unit)
        }
        _ => None,
    }
}


fn fold_temporal(mut state: PhraseState, index: usize, unit: TimeUnit) -> Result<PhraseState> {
    state.extend_to(index);
    let count = state.segment.take_sum();
    // "forty days and forty nights" names one span of forty days
    if unit == TimeUnit::Night {
        if let Value::Duration(Duration { days: Some(days), .. }) = &mut state.total {
            *days = (*days).max(count);
            return Ok(state);
        }
    }
    let addend = match (count, &state.total) {
        (0, Value::Duration(_)) => Duration::zero_of(unit),
        (0, Value::Integer(_)) => Duration::of(unit, 1),
        (n, _) => Duration::of(unit, n),
    };
    state.total = state.total.checked_add(Value::Duration(addend))?;
    Ok(state)
}

fn add_numeral(state: &mut PhraseState, word: &ResolvedWord<'_>, lexeme: Lexeme) -> Result<()> {
    state.has_magnitude = true;
    match lexeme {
        Lexeme::Cardinal { value, .. } | Lexeme::Ordinal(value) => state.segment.push(value),
        Lexeme::Multiplier(weight) => {
            state.saw_multiplier = true;
            if word.has_only_and() {
                state.segment.push(weight);
            } else if !state.segment.apply_multiplier(weight) {
                if state.total.is_zero() {
                    state.segment.push(weight);
                } else {
                    state.total = state.total.checked_mul(Value::Integer(weight))?;
                }
            }
        }
        Lexeme::Temporal(_) | Lexeme::DateStarter(_) => {}
    }
    Ok(())
}
