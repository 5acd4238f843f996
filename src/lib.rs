//! Extraction of numeral and duration phrases from pointed or unpointed Biblical Hebrew.
//!
//! ```
//! use hebrew_numerals::{extract, Duration, Value};
//!
//! let quotations = extract("תְּשַׁע מֵאוֹת שָׁנָה וּשְׁלֹשִׁים שָׁנָה").unwrap();
//! assert_eq!(quotations[0].value, Value::Duration(Duration::years(930)));
//! ```

pub mod config;
pub mod error;
pub mod extractor;
pub mod lexicon;
pub mod parallel;
pub mod prefix;
pub mod reconcile;
pub mod spans;
pub mod tokenizer;
pub mod value;
pub mod verse;

pub use config::{ExceptionTables, ExtractorConfig};
pub use error::{Error, Result};
pub use extractor::{Extractor, Phase, PhraseState, Segment, Step};
pub use lexicon::{numeral_keywords, Lexeme, Lexicon, Rank};
pub use parallel::{process_corpus, CorpusReport, CorpusStats, ParallelConfig, Strategy};
pub use prefix::{ConjugateLetter, ResolvedWord};
pub use reconcile::{check_match, reconcile, MatchOutcome, ModelQuotation, ModelResponse, Reconciliation};
pub use spans::{map_spans, ResolvedSpan, SpanKind, SpanMap};
pub use tokenizer::{tokenize, Token};
pub use value::{Duration, TimeUnit, Value};
pub use verse::{gematria, NumericQuotation, Verse, VerseId, VerseQuotations};

/// Extracts quotations from `text` with the default configuration.
pub fn extract(text: &str) -> Result<Vec<NumericQuotation>> {
    Extractor::default().extract(text)
}
