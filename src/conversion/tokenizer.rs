//! Splitting of container values

use crate::contract::OperationMetadata;

/// Splits a raw value into container elements
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'a> {
    delimiter: &'a str,
    strip_empty_values: bool,
}

impl<'a> Tokenizer<'a> {
    /// Default element delimiter
    pub const DEFAULT_DELIMITER: &'static str = ",";

    /// Tokenizer with an explicit delimiter
    pub fn new(delimiter: &'a str, strip_empty_values: bool) -> Self {
        Self {
            delimiter,
            strip_empty_values,
        }
    }

    /// Tokenizer configured by an operation's declared modifiers
    pub fn from_metadata(metadata: &'a OperationMetadata) -> Self {
        let delimiter = match metadata.delimiter.as_deref() {
            Some(delimiter) if !delimiter.is_empty() => delimiter,
            _ => Self::DEFAULT_DELIMITER,
        };
        Self::new(delimiter, metadata.strip_empty_values)
    }

    /// Split `value` on the literal delimiter. Empty input has no elements.
    pub fn tokenize<'v>(&self, value: &'v str) -> Vec<&'v str> {
        if value.is_empty() {
            return Vec::new();
        }
        value
            .split(self.delimiter)
            .filter(|token| !(self.strip_empty_values && token.is_empty()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delimiter() {
        let metadata = OperationMetadata::default();
        let tokenizer = Tokenizer::from_metadata(&metadata);
        assert_eq!(tokenizer.tokenize("a,b,,c"), vec!["a", "b", "", "c"]);
        assert!(tokenizer.tokenize("").is_empty());
    }

    #[test]
    fn test_strip_empty_values() {
        let tokenizer = Tokenizer::new(",", true);
        assert_eq!(tokenizer.tokenize(",a,,b,"), vec!["a", "b"]);
    }

    #[test]
    fn test_delimiter_is_literal() {
        let metadata = OperationMetadata {
            delimiter: Some("|".into()),
            ..Default::default()
        };
        let tokenizer = Tokenizer::from_metadata(&metadata);
        assert_eq!(tokenizer.tokenize("a|b.c"), vec!["a", "b.c"]);
    }
}
