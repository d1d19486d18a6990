//! Topic routing
//!
//! Routing keys are `.`-separated words. A binding key matches a routing key
//! word by word, where `*` stands for exactly one word and `#` for zero or
//! more words. Any other word must match literally.

use std::fmt;

/// One word of a binding pattern
#[derive(Debug, Clone, PartialEq, Eq)]
enum Word {
    Literal(String),
    /// `*`
    One,
    /// `#`
    Many,
}

/// Parsed topic binding key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingKey {
    raw: String,
    words: Vec<Word>,
}

impl BindingKey {
    /// Parse a binding pattern such as `*`, `stock.#` or `nyse.*.trade`
    pub fn parse(pattern: &str) -> Self {
        let words = pattern
            .split('.')
            .map(|w| match w {
                "*" => Word::One,
                "#" => Word::Many,
                lit => Word::Literal(lit.to_string()),
            })
            .collect();
        Self {
            raw: pattern.to_string(),
            words,
        }
    }

    /// Original pattern text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check a routing key against this pattern
    #[inline]
    pub fn matches(&self, routing_key: &str) -> bool {
        // Fast path: `#` alone binds everything
        if let [Word::Many] = self.words.as_slice() {
            return true;
        }
        let key: Vec<&str> = routing_key.split('.').collect();
        match_words(&self.words, &key)
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn match_words(pattern: &[Word], key: &[&str]) -> bool {
    match pattern.split_first() {
        None => key.is_empty(),
        Some((Word::Many, rest)) => {
            // Collapse runs of `#`, they add nothing
            if matches!(rest.first(), Some(Word::Many)) {
                return match_words(rest, key);
            }
            (0..=key.len()).any(|skip| match_words(rest, &key[skip..]))
        }
        Some((Word::One, rest)) => !key.is_empty() && match_words(rest, &key[1..]),
        Some((Word::Literal(lit), rest)) => {
            key.first().is_some_and(|w| *w == lit.as_str()) && match_words(rest, &key[1..])
        }
    }
}
