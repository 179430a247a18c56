//! Inline markup spans
//!
//! A paragraph is turned into placeholder text plus the tokens each
//! placeholder stands for; rendering substitutes them back.

pub mod patterns;
pub mod token;
pub mod tokenizer;

pub use token::{ReferenceData, SpanPayload, SpanResult, SpanToken, SpanTokenKind};
pub use tokenizer::SpanTokenizer;
