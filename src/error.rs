use thiserror::Error;

/// Errors raised by extraction, span mapping and configuration loading.
///
/// Unrecognized words are never errors; they simply end a phrase.
#[derive(Debug, Error)]
pub enum Error {
    /// Duration arithmetic whose component kinds cannot be reconciled
    #[error("cannot {operation} {lhs} and {rhs}: duration components do not line up")]
    KindMismatch {
        operation: &'static str,
        lhs: String,
        rhs: String,
    },

    /// A quotation that does not occur anywhere in the verse it was extracted from
    #[error("quote {quote:?} does not occur in verse text {text:?}")]
    QuoteNotInVerse { quote: String, text: String },

    #[error("invalid extractor configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid Hebrew numeral letter {letter:?} in {input:?}")]
    InvalidNumeralLetter { letter: char, input: String },

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse model response JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
