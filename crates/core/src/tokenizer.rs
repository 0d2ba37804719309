//! Delimiter-based tokenizer
//!
//! Splits a raw line on any delimiter character. Runs of delimiters
//! collapse, surrounding whitespace is stripped from each token, and
//! empty tokens are never emitted.

#[cfg(test)]
#[path = "tokenizer_test.rs"]
mod tests;

/// Splits log lines into tokens borrowed from the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenizer {
    delimiters: Vec<char>,
}

impl Tokenizer {
    /// Create a tokenizer splitting on every character of `delimiters`
    pub fn new(delimiters: &str) -> Self {
        let mut chars: Vec<char> = delimiters.chars().collect();
        chars.sort_unstable();
        chars.dedup();
        Self { delimiters: chars }
    }

    /// Split `line` into tokens
    pub fn tokenize<'a>(&self, line: &'a str) -> Vec<&'a str> {
        line.split(|c: char| self.delimiters.contains(&c))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Delimiter characters, sorted
    pub fn delimiters(&self) -> &[char] {
        &self.delimiters
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(" \t")
    }
}

/// One-shot tokenization without building a [`Tokenizer`]
pub fn tokenize<'a>(line: &'a str, delimiters: &str) -> Vec<&'a str> {
    Tokenizer::new(delimiters).tokenize(line)
}
