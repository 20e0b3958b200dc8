//! Query expressions for file search.
//!
//! This module provides:
//! - The expression tree (`All`, name glob, size, writable, NOT/AND/OR)
//! - Glob matching on base names
//! - Size literals (`10kb`, `1.5M`)
//! - A textual query parser that produces expression trees

mod expression;
mod parser;
mod pattern;
mod size;

pub use expression::Expression;
pub use parser::{QueryParser, MAX_QUERY_DEPTH};
pub use pattern::NamePattern;
pub use size::parse_size_literal;
