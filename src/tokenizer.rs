//! Lossless word/separator tokenization.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Letters with their points and cantillation. Maqaf, sof pasuq and paseq are separators.
    static ref WORD_PATTERN: Regex = Regex::new(r"[\p{L}\p{M}]+").unwrap();
}

const HARD_STOPS: [char; 5] = ['\u{05C3}', '.', '!', '?', ';'];

/// A slice of the source text. Even positions are words, odd positions separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub is_word: bool,
    /// Byte offset into the source.
    pub start: usize,
}

impl<'a> Token<'a> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// A separator that ends a sentence.
    pub fn is_hard_stop(&self) -> bool {
        !self.is_word && self.text.contains(&HARD_STOPS[..])
    }
}

/// Splits `text` into word and separator tokens.
///
/// The result always has odd length, starts and ends with a word slot (possibly empty),
/// and concatenates back to `text`.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for m in WORD_PATTERN.find_iter(text) {
        if tokens.is_empty() {
            if m.start() > 0 {
                tokens.push(word(text, 0, 0));
                tokens.push(separator(text, 0, m.start()));
            }
        } else {
            tokens.push(separator(text, cursor, m.start()));
        }
        tokens.push(word(text, m.start(), m.end()));
        cursor = m.end();
    }

    if tokens.is_empty() {
        if text.is_empty() {
            return vec![word(text, 0, 0)];
        }
        tokens.push(word(text, 0, 0));
    }
    if cursor < text.len() {
        tokens.push(separator(text, cursor, text.len()));
        tokens.push(word(text, text.len(), text.len()));
    }
    tokens
}

fn word(text: &str, start: usize, end: usize) -> Token<'_> {
    Token {
        text: &text[start..end],
        is_word: true,
        start,
    }
}

fn separator(text: &str, start: usize, end: usize) -> Token<'_> {
    Token {
        text: &text[start..end],
        is_word: false,
        start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
        tokens.iter().map(|t| t.text).collect()
    }

    #[test]
    fn alternates_words_and_separators() {
        let tokens = tokenize("אַרְבַּע מֵאוֹת וְשִׁבְעִים");
        assert_eq!(
            texts(&tokens),
            vec!["אַרְבַּע", " ", "מֵאוֹת", " ", "וְשִׁבְעִים"]
        );
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.is_word, i % 2 == 0);
        }
    }

    #[test]
    fn empty_input_is_one_empty_word() {
        assert_eq!(texts(&tokenize("")), vec![""]);
    }

    #[test]
    fn separator_only_input_is_padded_with_empty_words() {
        assert_eq!(texts(&tokenize(" ׃ ")), vec!["", " ׃ ", ""]);
    }

    #[test]
    fn leading_and_trailing_separators() {
        let tokens = tokenize(" שֵׁשׁ׃");
        assert_eq!(texts(&tokens), vec!["", " ", "שֵׁשׁ", "׃", ""]);
        assert_eq!(tokens[2].start, 1);
        assert_eq!(tokens[4].start, " שֵׁשׁ׃".len());
    }

    #[test]
    fn maqaf_separates_words() {
        let tokens = tokenize("כָּל־יְמֵי");
        assert_eq!(texts(&tokens), vec!["כָּל", "־", "יְמֵי"]);
    }

    #[test]
    fn cantillation_stays_inside_words() {
        let tokens = tokenize("מֵ֣אָה שָׁנָ֔ה");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "מֵ֣אָה");
    }

    #[test]
    fn concatenation_reproduces_input() {
        let text = "וַיְהִי֙ בְּשֵׁ֨שׁ מֵא֤וֹת שָׁנָה֙, לְחַיֵּי־נֹ֔חַ׃";
        let joined: String = tokenize(text).iter().map(|t| t.text).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn sentence_punctuation_is_a_hard_stop() {
        let tokens = tokenize("שֵׁשׁ׃ שֶׁבַע, שְׁמֹנֶה");
        assert!(tokens[1].is_hard_stop());
        assert!(!tokens[3].is_hard_stop());
        assert!(!tokens[0].is_hard_stop());
    }
}
