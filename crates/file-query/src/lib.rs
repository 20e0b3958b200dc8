//! Predicate-expression file search.
//!
//! Build an [`Expression`] tree (or parse one from query text) and evaluate
//! it against a directory:
//! - Leaves: every file, base-name glob, size threshold, writability
//! - Combinators: NOT, AND (intersection), OR (union)
//! - Results: a deduplicated, ordered set of file paths
//!
//! ```no_run
//! use file_query::{evaluate, Expression};
//!
//! let query = Expression::name_matches("*.txt")? & Expression::writable();
//! let matches = evaluate(&query, "/tmp")?;
//! # Ok::<(), file_query::FileQueryError>(())
//! ```

pub mod error;
pub mod evaluate;
pub mod options;
pub mod permissions;
pub mod query;
pub mod walk;

// Re-export main types
pub use error::{FileQueryError, Result};
pub use evaluate::{evaluate, search, Evaluator, PathSet};
pub use options::SearchOptions;
pub use query::{Expression, NamePattern, QueryParser};
pub use walk::{walk_files, FileEntry};
