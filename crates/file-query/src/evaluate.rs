//! Expression evaluation over a directory tree.
//!
//! Each call walks the root once and evaluates every node of the
//! expression against that snapshot using set algebra:
//! `Not` is `All − inner`, `And` is intersection, `Or` is union.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::Result;
use crate::options::SearchOptions;
use crate::permissions::is_writable;
use crate::query::{Expression, QueryParser};
use crate::walk::{walk_files, FileEntry};

/// Matching paths, deduplicated and ordered.
pub type PathSet = BTreeSet<PathBuf>;

/// Evaluates expressions against directory trees.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: SearchOptions,
}

impl Evaluator {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Returns every regular file under `root` matched by `expression`.
    ///
    /// Paths are `root` joined with each file's relative path. Fails with
    /// `NotFound` when `root` does not exist.
    pub fn evaluate(&self, expression: &Expression, root: impl AsRef<Path>) -> Result<PathSet> {
        let root = root.as_ref();
        let files = walk_files(root, &self.options)?;
        let snapshot = Snapshot::new(files, expression.requires_permission_check());
        let matches = snapshot.evaluate(expression);

        log::debug!(
            "evaluated `{expression}` under {}: {} of {} files matched",
            root.display(),
            matches.len(),
            snapshot.len(),
        );

        Ok(matches)
    }

    /// Parses `raw_query` and evaluates it against `root`.
    pub fn search(&self, raw_query: &str, root: impl AsRef<Path>) -> Result<PathSet> {
        let expression = QueryParser::parse(raw_query)?;
        self.evaluate(&expression, root)
    }
}

/// Evaluates `expression` under `root` with default options.
pub fn evaluate(expression: &Expression, root: impl AsRef<Path>) -> Result<PathSet> {
    Evaluator::default().evaluate(expression, root)
}

/// Parses and evaluates a query string under `root` with default options.
pub fn search(raw_query: &str, root: impl AsRef<Path>) -> Result<PathSet> {
    Evaluator::default().search(raw_query, root)
}

/// The files of one walk, plus their writability when the expression needs it.
struct Snapshot {
    files: Vec<FileEntry>,
    writable: Vec<bool>,
}

impl Snapshot {
    fn new(files: Vec<FileEntry>, check_permissions: bool) -> Self {
        let writable = if check_permissions {
            files
                .par_iter()
                .map(|entry| is_writable(&entry.path))
                .collect()
        } else {
            Vec::new()
        };
        Self { files, writable }
    }

    fn len(&self) -> usize {
        self.files.len()
    }

    fn evaluate(&self, expression: &Expression) -> PathSet {
        match expression {
            Expression::All => self.select(|_, _| true),
            Expression::NameMatches(pattern) => {
                self.select(|entry, _| pattern.matches(entry.name.as_str()))
            }
            Expression::SizeGreaterThan(threshold) => {
                self.select(|entry, _| entry.size > *threshold)
            }
            Expression::Writable => self.select(|_, writable| writable),
            Expression::Not(inner) => {
                let all = self.evaluate(&Expression::All);
                let excluded = self.evaluate(inner);
                &all - &excluded
            }
            Expression::And(left, right) => {
                let left = self.evaluate(left);
                if left.is_empty() {
                    return left;
                }
                let right = self.evaluate(right);
                &left & &right
            }
            Expression::Or(left, right) => {
                let mut union = self.evaluate(left);
                union.extend(self.evaluate(right));
                union
            }
        }
    }

    fn select(&self, predicate: impl Fn(&FileEntry, bool) -> bool) -> PathSet {
        self.files
            .iter()
            .enumerate()
            .filter(|(index, entry)| {
                let writable = self.writable.get(*index).copied().unwrap_or(false);
                predicate(entry, writable)
            })
            .map(|(_, entry)| entry.path.clone())
            .collect()
    }
}
