//! Extractor configuration, loadable from YAML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::prefix::MAX_PREFIX_DEPTH;

/// Curated false positives: place names and idioms spelled like numerals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionTables {
    /// `(previous, current)`: `current` is never read as a numeral after `previous`.
    pub previous_word: Vec<(String, String)>,
    /// `(current, next)`: `current` is never read as a numeral before `next`.
    pub next_word: Vec<(String, String)>,
    /// Words that are never read as numerals.
    pub words: Vec<String>,
}

impl Default for ExceptionTables {
    fn default() -> Self {
        ExceptionTables {
            previous_word: pairs(&[
                ("בְּאֵר", "שֶׁבַע"),
                ("קִרְיַת", "אַרְבַּע"),
                ("בִּגְדֵי", "שֵׁשׁ"),
                ("יְמֵי", "שֵׁנִי"),
                ("תוֹלַעַת", "שָׁנִי"),
                ("שָׁנִי", "וְשֵׁשׁ"),
            ]),
            next_word: pairs(&[
                ("שְׁנֵי", "חַיֵּי"),
                ("שְׁנֵי", "חַיֶּיךָ"),
                ("שְׁנֵי", "חַיָּיו"),
            ]),
            words: vec!["הָאַחַת".to_string()],
        }
    }
}

fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

/// Runtime knobs for [`Extractor`](crate::extractor::Extractor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub exceptions: ExceptionTables,
    /// How many stacked prefixes the stripper may remove (1..=3).
    pub max_prefix_depth: usize,
    /// Close the open phrase at sof pasuq and sentence punctuation.
    pub stop_at_sentence_end: bool,
    /// Attach the counted noun to integer quotations.
    pub label_entities: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            exceptions: ExceptionTables::default(),
            max_prefix_depth: MAX_PREFIX_DEPTH,
            stop_at_sentence_end: true,
            label_entities: true,
        }
    }
}

impl ExtractorConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: ExtractorConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PREFIX_DEPTH).contains(&self.max_prefix_depth) {
            return Err(Error::InvalidConfig(format!(
                "max_prefix_depth must be between 1 and {}, got {}",
                MAX_PREFIX_DEPTH, self.max_prefix_depth
            )));
        }

        let pairs = self
            .exceptions
            .previous_word
            .iter()
            .chain(&self.exceptions.next_word);
        for (a, b) in pairs {
            if a.trim().is_empty() || b.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "exception pair ({:?}, {:?}) has an empty word",
                    a, b
                )));
            }
        }
        if self.exceptions.words.iter().any(|w| w.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "exception word list contains an empty entry".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ExtractorConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ExtractorConfig::default());
    }

    #[test]
    fn partial_document_overrides_fields() {
        let yaml = "max_prefix_depth: 2\nlabel_entities: false\n";
        let config = ExtractorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.max_prefix_depth, 2);
        assert!(!config.label_entities);
        assert!(config.stop_at_sentence_end);
        assert_eq!(config.exceptions, ExceptionTables::default());
    }

    #[test]
    fn exception_tables_parse_as_pairs() {
        let yaml = r#"
exceptions:
  previous_word:
    - ["עֵין", "שֶׁמֶשׁ"]
  next_word: []
  words: ["הָאַחַת"]
"#;
        let config = ExtractorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.exceptions.previous_word,
            vec![("עֵין".to_string(), "שֶׁמֶשׁ".to_string())]
        );
        assert!(config.exceptions.next_word.is_empty());
    }

    #[test]
    fn out_of_range_depth_is_rejected() {
        let err = ExtractorConfig::from_yaml_str("max_prefix_depth: 0").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        let err = ExtractorConfig::from_yaml_str("max_prefix_depth: 4").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn empty_exception_entry_is_rejected() {
        let mut config = ExtractorConfig::default();
        config.exceptions.words.push("  ".to_string());
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = ExtractorConfig::from_yaml_str("max_prefix_depth: [").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ExtractorConfig::from_path("/nonexistent/extractor.yaml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
