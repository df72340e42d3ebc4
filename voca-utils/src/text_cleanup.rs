//! Text cleanup and answer matching for vocabulary words.
//!
//! Catalog words look like `"feel/felt (v.)"`: a parenthesised part-of-speech
//! annotation that is never part of the answer, and `/`-separated forms that
//! are each accepted on their own.

use unicode_normalization::UnicodeNormalization;

/// Remove every parenthesised group, along with the whitespace before it.
///
/// An unclosed `(` is left in place.
pub fn strip_annotations(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        result.push_str(rest[..open].trim_end());
        rest = &rest[open + close + 1..];
    }
    result.push_str(rest);
    result.trim().to_string()
}

/// The contents of the first parenthesised group, e.g. `"v."` for `"feel/felt (v.)"`.
pub fn annotation(text: &str) -> Option<&str> {
    let open = text.find('(')?;
    let inner = &text[open + 1..];
    let close = inner.find(')')?;
    let inner = inner[..close].trim();
    (!inner.is_empty()).then_some(inner)
}

/// Normalize text before comparing a learner's answer against a target.
///
/// - Composes Unicode (NFC), so Hangul typed as jamo compares equal to precomposed syllables
/// - Folds typographic quotes and dashes to their ASCII forms
/// - Lowercases, trims and collapses whitespace
pub fn normalize_for_grading(text: &str) -> String {
    text.nfc()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{02BC}' | '`'
            | '\u{00B4}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            _ => c,
        })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every form of `word` a typed answer may match, already normalized.
pub fn accepted_answers(word: &str) -> Vec<String> {
    strip_annotations(word)
        .split('/')
        .map(normalize_for_grading)
        .filter(|answer| !answer.is_empty())
        .collect()
}

pub fn is_typed_answer_correct(word: &str, input: &str) -> bool {
    let input = normalize_for_grading(input);
    if input.is_empty() {
        return false;
    }
    accepted_answers(word).contains(&input)
}

/// Speech recognition tends to return whole phrases, so a transcript that
/// contains one of the accepted forms counts.
pub fn is_spoken_answer_correct(word: &str, transcript: &str) -> bool {
    let transcript = normalize_for_grading(transcript);
    if transcript.is_empty() {
        return false;
    }
    if transcript == normalize_for_grading(&strip_annotations(word)) {
        return true;
    }
    accepted_answers(word)
        .iter()
        .any(|answer| transcript.contains(answer.as_str()))
}
