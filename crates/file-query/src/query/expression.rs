//! Query expression types and AST nodes.

use std::fmt;
use std::ops;

use crate::error::Result;

use super::pattern::NamePattern;

/// A file-search expression (AST node).
///
/// Leaves select files by a single property; `Not`, `And` and `Or` combine
/// sub-expressions. Building a tree never touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Every regular file under the root.
    All,
    /// Files whose base name matches a shell glob.
    NameMatches(NamePattern),
    /// Files strictly larger than the threshold, in bytes.
    SizeGreaterThan(u64),
    /// Files the current process can write to.
    Writable,
    /// Complement of the inner expression relative to `All`.
    Not(Box<Expression>),
    /// Intersection of both operands.
    And(Box<Expression>, Box<Expression>),
    /// Union of both operands.
    Or(Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn all() -> Self {
        Self::All
    }

    /// Compiles `pattern` into a name filter. Fails on an empty pattern.
    pub fn name_matches(pattern: &str) -> Result<Self> {
        Ok(Self::NameMatches(NamePattern::new(pattern)?))
    }

    pub fn size_greater_than(threshold: u64) -> Self {
        Self::SizeGreaterThan(threshold)
    }

    pub fn writable() -> Self {
        Self::Writable
    }

    pub fn not(inner: Expression) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    /// Returns true if evaluating this tree needs a writability check.
    pub fn requires_permission_check(&self) -> bool {
        match self {
            Self::Writable => true,
            Self::All | Self::NameMatches(_) | Self::SizeGreaterThan(_) => false,
            Self::Not(inner) => inner.requires_permission_check(),
            Self::And(left, right) | Self::Or(left, right) => {
                left.requires_permission_check() || right.requires_permission_check()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Operator sugar
// ---------------------------------------------------------------------------

impl ops::BitOr for Expression {
    type Output = Expression;

    fn bitor(self, other: Expression) -> Expression {
        Expression::or(self, other)
    }
}

impl ops::BitAnd for Expression {
    type Output = Expression;

    fn bitand(self, other: Expression) -> Expression {
        Expression::and(self, other)
    }
}

impl ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        Expression::not(self)
    }
}

// ---------------------------------------------------------------------------
// Display (query syntax)
// ---------------------------------------------------------------------------

/// Renders the expression in query syntax; the output parses back into
/// an equal tree.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::NameMatches(pattern) => {
                f.write_str("name:")?;
                write_quoted(f, pattern.as_str())
            }
            Self::SizeGreaterThan(threshold) => write!(f, "size:>{threshold}"),
            Self::Writable => f.write_str("writable"),
            Self::Not(inner) => {
                f.write_str("!")?;
                write_operand(f, inner)
            }
            Self::And(left, right) => {
                write_operand(f, left)?;
                f.write_str(" & ")?;
                write_operand(f, right)
            }
            Self::Or(left, right) => {
                write_operand(f, left)?;
                f.write_str(" | ")?;
                write_operand(f, right)
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expression: &Expression) -> fmt::Result {
    match expression {
        Expression::And(..) | Expression::Or(..) => write!(f, "({expression})"),
        _ => write!(f, "{expression}"),
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in value.chars() {
        if matches!(ch, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{ch}")?;
    }
    f.write_str("\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(pattern: &str) -> Expression {
        Expression::name_matches(pattern).unwrap()
    }

    #[test]
    fn operators_build_combinators() {
        let expr = name("*.txt") | Expression::size_greater_than(10);
        assert_eq!(
            expr,
            Expression::or(name("*.txt"), Expression::SizeGreaterThan(10))
        );

        let expr = name("*.txt") & Expression::writable();
        assert_eq!(expr, Expression::and(name("*.txt"), Expression::Writable));

        let expr = !Expression::all();
        assert_eq!(expr, Expression::Not(Box::new(Expression::All)));
    }

    #[test]
    fn empty_glob_fails_construction() {
        assert!(Expression::name_matches("").is_err());
    }

    #[test]
    fn display_keeps_escapes_verbatim() {
        assert_eq!(name("a\\*b").to_string(), "name:\"a\\\\*b\"");
    }

    #[test]
    fn permission_check_detection() {
        assert!(!name("*.rs").requires_permission_check());
        assert!((!Expression::writable()).requires_permission_check());
        assert!((Expression::all() | (name("a") & Expression::writable()))
            .requires_permission_check());
        assert!(!(Expression::all() & Expression::size_greater_than(3))
            .requires_permission_check());
    }

    #[test]
    fn display_leaves() {
        assert_eq!(Expression::all().to_string(), "all");
        assert_eq!(Expression::writable().to_string(), "writable");
        assert_eq!(Expression::size_greater_than(50).to_string(), "size:>50");
        assert_eq!(name("*.txt").to_string(), "name:\"*.txt\"");
    }

    #[test]
    fn display_escapes_quotes() {
        assert_eq!(name("a\"b").to_string(), "name:\"a\\\"b\"");
    }

    #[test]
    fn display_parenthesizes_nested_binary_nodes() {
        let expr = (name("*.txt") | name("*.md")) & !Expression::writable();
        assert_eq!(
            expr.to_string(),
            "(name:\"*.txt\" | name:\"*.md\") & !writable"
        );

        let expr = !(Expression::all() & Expression::size_greater_than(1));
        assert_eq!(expr.to_string(), "!(all & size:>1)");
    }
}
