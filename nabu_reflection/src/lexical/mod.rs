//! Lexical analysis module
//!
//! Converts PHP source text into the flat token list consumed by
//! [`crate::tokens::TokenCursor`].

pub mod analyzer;

use crate::tokens::Token;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};

/// Tokenize raw PHP source
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_tokenize() {
        let tokens = tokenize("<?php function f() {}").unwrap();
        assert_eq!(tokens.first().map(|t| t.text.as_str()), Some("<?php"));
    }
}
