//! Token categories and the token type emitted by the tokenizer.
//!
//! A token is a category plus the exact substring it covers. Tokens are
//! produced in input order and never overlap; concatenating their text in
//! order reproduces the input byte for byte. Renderers map each category to a
//! style class and wrap the span accordingly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of classifications a span can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenCategory {
    /// A recognized program name (`ffmpeg`, `ffplay`, `ffprobe`), with an
    /// optional `./` prefix
    Namespace,

    /// A `#`-to-end-of-line comment
    Comment,

    /// A `-`-prefixed command-line flag
    CliArgument,

    /// Unclassified literal text
    Text,

    /// Whitespace between words
    Whitespace,

    /// A backslash escape, including the line-continuation escape
    StringEscape,

    /// Structural punctuation: `=`, `:`, `,`, `;`, parentheses
    Operator,

    /// A filter name in a filtergraph chain
    NameFunction,

    /// An `@instance` label following a filter name
    NameLabel,

    /// A parameter key on the left of `key=value`
    NameAttribute,

    /// A `[name]` link label connecting filter stages
    LinkLabel,

    /// A quote character delimiting a string
    StringLiteral,

    /// A recognized constant value (the `lavfi` demuxer name)
    Constant,
}

impl TokenCategory {
    /// Stable class name for renderers, in kebab case.
    pub fn class_name(&self) -> &'static str {
        match self {
            TokenCategory::Namespace => "namespace",
            TokenCategory::Comment => "comment",
            TokenCategory::CliArgument => "cli-argument",
            TokenCategory::Text => "text",
            TokenCategory::Whitespace => "whitespace",
            TokenCategory::StringEscape => "string-escape",
            TokenCategory::Operator => "operator",
            TokenCategory::NameFunction => "name-function",
            TokenCategory::NameLabel => "name-label",
            TokenCategory::NameAttribute => "name-attribute",
            TokenCategory::LinkLabel => "link-label",
            TokenCategory::StringLiteral => "string-literal",
            TokenCategory::Constant => "constant",
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name())
    }
}

/// A categorized span of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The classification attached to this span
    pub category: TokenCategory,

    /// The exact substring the span covers
    pub text: String,
}

impl Token {
    pub fn new(category: TokenCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.category, self.text)
    }
}

/// Reconstruct the original input from a token stream.
pub fn detokenize(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

/// Append a span to the stream, merging it into the previous token when the
/// categories match. Adjacent equal-category spans carry no extra information
/// for a renderer, so the stream stays compact.
pub(crate) fn push_span(tokens: &mut Vec<Token>, category: TokenCategory, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = tokens.last_mut() {
        if last.category == category {
            last.text.push_str(text);
            return;
        }
    }
    tokens.push(Token::new(category, text));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detokenize_roundtrip() {
        let tokens = vec![
            Token::new(TokenCategory::Namespace, "ffmpeg"),
            Token::new(TokenCategory::Whitespace, " "),
            Token::new(TokenCategory::CliArgument, "-i"),
        ];
        assert_eq!(detokenize(&tokens), "ffmpeg -i");
    }

    #[test]
    fn test_push_span_coalesces_same_category() {
        let mut tokens = Vec::new();
        push_span(&mut tokens, TokenCategory::Text, "a");
        push_span(&mut tokens, TokenCategory::Text, "b");
        push_span(&mut tokens, TokenCategory::Operator, ",");
        push_span(&mut tokens, TokenCategory::Text, "c");

        assert_eq!(
            tokens,
            vec![
                Token::new(TokenCategory::Text, "ab"),
                Token::new(TokenCategory::Operator, ","),
                Token::new(TokenCategory::Text, "c"),
            ]
        );
    }

    #[test]
    fn test_push_span_skips_empty_text() {
        let mut tokens = Vec::new();
        push_span(&mut tokens, TokenCategory::Text, "");
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_class_names_are_kebab_case() {
        assert_eq!(TokenCategory::CliArgument.class_name(), "cli-argument");
        assert_eq!(TokenCategory::NameFunction.to_string(), "name-function");
    }
}
