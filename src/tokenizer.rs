/// Tokenization policy injected into the parser and resolver.
///
/// Keeping this behind a trait means alternate word-splitting rules (quoting,
/// escaping) can be swapped in without touching pipeline handling.
pub trait Tokenizer {
    /// Split a line into whitespace-separated words.
    fn split(&self, text: &str) -> Vec<String>;

    /// Split on an explicit delimiter, dropping empty pieces. Used for
    /// colon-separated PATH lists.
    fn split_on(&self, text: &str, delim: char) -> Vec<String>;
}

/// Default policy: plain whitespace words, no quoting.
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn split(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(|s| s.to_string()).collect()
    }

    fn split_on(&self, text: &str, delim: char) -> Vec<String> {
        text.split(delim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}
