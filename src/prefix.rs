//! Removal of one-letter grammatical prefixes.

use std::fmt;

use unicode_normalization::char::is_combining_mark;

use crate::lexicon::{skeleton, Lexeme, Lexicon};

/// Deepest prefix stack the stripper will try.
pub const MAX_PREFIX_DEPTH: usize = 3;

/// A one-letter prefix, in the order the stripper tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConjugateLetter {
    And,
    In,
    The,
    From,
    To,
    Like,
}

impl ConjugateLetter {
    pub const ALL: [ConjugateLetter; 6] = [
        ConjugateLetter::And,
        ConjugateLetter::In,
        ConjugateLetter::The,
        ConjugateLetter::From,
        ConjugateLetter::To,
        ConjugateLetter::Like,
    ];

    pub fn letter(self) -> char {
        match self {
            ConjugateLetter::And => 'ו',
            ConjugateLetter::In => 'ב',
            ConjugateLetter::The => 'ה',
            ConjugateLetter::From => 'מ',
            ConjugateLetter::To => 'ל',
            ConjugateLetter::Like => 'כ',
        }
    }

    /// `word` without this letter and the marks attached to it, if it starts with the letter
    /// and something is left.
    pub fn strip(self, word: &str) -> Option<&str> {
        let mut chars = word.char_indices();
        match chars.next() {
            Some((_, c)) if c == self.letter() => {}
            _ => return None,
        }
        let rest = chars
            .find(|(_, c)| !is_combining_mark(*c))
            .map(|(i, _)| &word[i..])?;
        Some(rest)
    }
}

impl fmt::Display for ConjugateLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A token after prefix resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWord<'a> {
    /// The token with the stripped prefixes removed, or the whole token.
    pub root: &'a str,
    /// Outermost first.
    pub prefixes: Vec<ConjugateLetter>,
    pub lexeme: Option<Lexeme>,
    /// Unpointed token whose skeleton has several senses.
    pub ambiguous: bool,
    /// Skeleton of `root`, used to compare words.
    pub key: String,
}

impl<'a> ResolvedWord<'a> {
    fn unresolved(token: &'a str) -> Self {
        ResolvedWord {
            root: token,
            prefixes: Vec::new(),
            lexeme: None,
            ambiguous: false,
            key: skeleton(token),
        }
    }

    /// No prefixes, or only "and".
    pub fn has_plain_prefixes(&self) -> bool {
        matches!(self.prefixes.as_slice(), [] | [ConjugateLetter::And])
    }

    pub fn has_only_and(&self) -> bool {
        self.prefixes == [ConjugateLetter::And]
    }

    /// The prefix closest to the root.
    pub fn innermost_prefix(&self) -> Option<ConjugateLetter> {
        self.prefixes.last().copied()
    }
}

/// Resolves `token` against the lexicon, stripping at most `max_depth` prefixes.
///
/// The whole token is tried first. At each depth every letter is tried for a direct hit
/// before any deeper strip is attempted. A token that resolves nowhere comes back unchanged
/// with no prefixes.
pub fn resolve<'a>(lexicon: &Lexicon, token: &'a str, max_depth: usize) -> ResolvedWord<'a> {
    if let Some(found) = lexicon.classify(token) {
        return ResolvedWord {
            root: token,
            prefixes: Vec::new(),
            lexeme: Some(found.lexeme),
            ambiguous: found.ambiguous,
            key: skeleton(token),
        };
    }

    let mut frontier: Vec<(&'a str, Vec<ConjugateLetter>)> = vec![(token, Vec::new())];
    for _ in 0..max_depth.min(MAX_PREFIX_DEPTH) {
        let mut next = Vec::new();
        for (word, prefixes) in &frontier {
            for letter in ConjugateLetter::ALL {
                let Some(rest) = letter.strip(*word) else {
                    continue;
                };
                let mut stripped = prefixes.clone();
                stripped.push(letter);
                if let Some(found) = lexicon.classify(rest) {
                    return ResolvedWord {
                        root: rest,
                        prefixes: stripped,
                        lexeme: Some(found.lexeme),
                        ambiguous: found.ambiguous,
                        key: skeleton(rest),
                    };
                }
                next.push((rest, stripped));
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    ResolvedWord::unresolved(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Rank;
    use crate::value::TimeUnit;
    use rstest::rstest;
    use super::ConjugateLetter::*;

    fn resolved(token: &str) -> ResolvedWord<'_> {
        resolve(Lexicon::global(), token, MAX_PREFIX_DEPTH)
    }

    #[test]
    fn strip_removes_attached_marks() {
        assert_eq!(And.strip("וּשְׁלֹשִׁים"), Some("שְׁלֹשִׁים"));
        assert_eq!(In.strip("בִּשְׁנַת"), Some("שְׁנַת"));
        assert_eq!(The.strip("ה"), None);
        assert_eq!(To.strip("שֵׁשׁ"), None);
    }

    #[rstest]
    #[case("וְשִׁבְעִים", vec![And], "שִׁבְעִים")]
    #[case("בִּשְׁנַת", vec![In], "שְׁנַת")]
    #[case("הַשֵּׁנִי", vec![The], "שֵּׁנִי")]
    #[case("וּבַחֹדֶשׁ", vec![And, In], "חֹדֶשׁ")]
    #[case("וְהַשְּׁלִישִׁי", vec![And, The], "שְּׁלִישִׁי")]
    #[case("מֵאָה", vec![], "מֵאָה")]
    fn strips_prefixes_outermost_first(
        #[case] token: &str,
        #[case] prefixes: Vec<ConjugateLetter>,
        #[case] root: &str,
    ) {
        let word = resolved(token);
        assert_eq!(word.prefixes, prefixes);
        assert_eq!(word.root, root);
        assert!(word.lexeme.is_some());
    }

    #[test]
    fn whole_token_wins_over_stripping() {
        // מֵאוֹת starts with the "from" letter but is itself a vocabulary word.
        let word = resolved("מֵאוֹת");
        assert!(word.prefixes.is_empty());
        assert_eq!(word.lexeme, Some(Lexeme::Multiplier(100)));
    }

    #[test]
    fn unresolved_token_is_returned_unchanged() {
        let word = resolved("וַיְהִי");
        assert_eq!(word.root, "וַיְהִי");
        assert!(word.prefixes.is_empty());
        assert_eq!(word.lexeme, None);
    }

    #[test]
    fn depth_limit_is_respected() {
        let shallow = resolve(Lexicon::global(), "וּבַחֹדֶשׁ", 1);
        assert_eq!(shallow.lexeme, None);
        let deep = resolve(Lexicon::global(), "וּבַחֹדֶשׁ", 2);
        assert_eq!(deep.lexeme, Some(Lexeme::Temporal(TimeUnit::Month)));
    }

    #[test]
    fn plain_prefix_helpers() {
        let and = resolved("וְאַרְבָּעִים");
        assert!(and.has_plain_prefixes());
        assert!(and.has_only_and());
        assert_eq!(
            and.lexeme,
            Some(Lexeme::Cardinal { value: 40, rank: Rank::Ten })
        );

        let the = resolved("הָאֶחָד");
        assert!(!the.has_plain_prefixes());
        assert_eq!(the.innermost_prefix(), Some(The));
    }
}
