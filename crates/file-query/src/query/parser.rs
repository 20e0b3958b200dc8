//! Query parser and tokenizer.
//!
//! Grammar, loosest binding first:
//! - and: operands joined by `&`, `and`, or plain juxtaposition
//! - or: operands joined by `|` or `or`
//! - not: any number of `!` / `not` prefixes
//! - primary: a term or a parenthesized group
//!
//! Terms are `all`, `writable`, `name:<glob>`, `size:<op><size>`,
//! `bigger:<size>`, or a bare word / quoted phrase used as a name glob.

use crate::error::{FileQueryError, Result};

use super::expression::Expression;
use super::size::parse_size_literal;

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct QueryToken {
    kind: QueryTokenKind,
    position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryTokenKind {
    Word(String),
    Phrase(String),
    LParen,
    RParen,
    Pipe,
    Amp,
    Bang,
    And,
    Or,
    Not,
}

// ---------------------------------------------------------------------------
// Query parser
// ---------------------------------------------------------------------------

/// Deepest expression tree (and deepest parenthesis nesting) a query may
/// produce. Evaluation and drop recurse once per level.
pub const MAX_QUERY_DEPTH: usize = 256;

/// An expression together with the height of its tree.
type Parsed = (Expression, usize);

pub struct QueryParser {
    tokens: Vec<QueryToken>,
    index: usize,
    nesting: usize,
}

impl QueryParser {
    pub fn parse(input: &str) -> Result<Expression> {
        let tokens = tokenize_query_input(input)?;
        if tokens.is_empty() {
            return Err(FileQueryError::QueryParse(
                "query must contain at least one term".to_string(),
            ));
        }

        let mut parser = Self {
            tokens,
            index: 0,
            nesting: 0,
        };
        let (expression, _) = parser.parse_and_expression(false)?;
        if let Some(token) = parser.peek() {
            return Err(FileQueryError::QueryParse(format!(
                "unexpected token near byte {}",
                token.position
            )));
        }

        Ok(expression)
    }

    fn parse_and_expression(&mut self, in_group: bool) -> Result<Parsed> {
        let (mut expression, mut height) = self.parse_or_expression()?;

        loop {
            if self.is_end() || (in_group && self.next_is_group_close()) {
                break;
            }
            if self.consume_and_separator() {
                if self.is_end() || self.next_is_group_close() {
                    return Err(self.error_here("expected query term after 'and'"));
                }
            } else if !self.next_starts_operand() {
                break;
            }
            let (right, right_height) = self.parse_or_expression()?;
            height = self.check_height(height.max(right_height) + 1)?;
            expression = Expression::and(expression, right);
        }

        Ok((expression, height))
    }

    fn parse_or_expression(&mut self) -> Result<Parsed> {
        let (mut expression, mut height) = self.parse_not_expression()?;

        while self.consume_or_separator() {
            if self.is_end() || self.next_is_group_close() {
                return Err(self.error_here("expected query term after 'or'"));
            }
            let (right, right_height) = self.parse_not_expression()?;
            height = self.check_height(height.max(right_height) + 1)?;
            expression = Expression::or(expression, right);
        }

        Ok((expression, height))
    }

    fn parse_not_expression(&mut self) -> Result<Parsed> {
        let mut negations = 0usize;
        while self.consume_not_prefix() {
            negations += 1;
            if negations >= MAX_QUERY_DEPTH {
                return Err(self.error_here("query nested too deeply"));
            }
        }

        let (mut expression, height) = self.parse_primary_expression()?;
        let height = self.check_height(height + negations)?;
        for _ in 0..negations {
            expression = Expression::not(expression);
        }
        Ok((expression, height))
    }

    fn parse_primary_expression(&mut self) -> Result<Parsed> {
        if self.consume_kind(&QueryTokenKind::LParen) {
            return self.parse_group();
        }

        let token = self.peek().cloned().ok_or_else(|| {
            FileQueryError::QueryParse("expected query term but reached end of query".to_string())
        })?;

        match &token.kind {
            QueryTokenKind::RParen => Err(FileQueryError::QueryParse(format!(
                "unexpected ')' near byte {}",
                token.position
            ))),
            QueryTokenKind::Word(_) | QueryTokenKind::Phrase(_) => {
                self.index += 1;
                let expression = parse_query_term(&token)?;
                let height = expression_height(&expression);
                Ok((expression, height))
            }
            _ => Err(FileQueryError::QueryParse(format!(
                "expected query term near byte {}",
                token.position
            ))),
        }
    }

    fn parse_group(&mut self) -> Result<Parsed> {
        if self.next_is_group_close() {
            return Err(self.error_here("empty group"));
        }
        self.nesting += 1;
        if self.nesting >= MAX_QUERY_DEPTH {
            return Err(self.error_here("query nested too deeply"));
        }
        let parsed = self.parse_and_expression(true)?;
        self.nesting -= 1;
        if self.consume_kind(&QueryTokenKind::RParen) {
            return Ok(parsed);
        }
        let position = self
            .peek()
            .map(|token| token.position)
            .unwrap_or_else(|| self.last_position());
        Err(FileQueryError::QueryParse(format!(
            "missing closing ')' near byte {position}"
        )))
    }

    fn check_height(&self, height: usize) -> Result<usize> {
        if height > MAX_QUERY_DEPTH {
            return Err(self.error_here("query nested too deeply"));
        }
        Ok(height)
    }

    fn next_starts_operand(&self) -> bool {
        matches!(
            self.peek().map(|token| &token.kind),
            Some(
                QueryTokenKind::Word(_)
                    | QueryTokenKind::Phrase(_)
                    | QueryTokenKind::LParen
                    | QueryTokenKind::Bang
                    | QueryTokenKind::Not
            )
        )
    }

    fn consume_and_separator(&mut self) -> bool {
        match self.peek().map(|token| &token.kind) {
            Some(QueryTokenKind::Amp | QueryTokenKind::And) => {
                self.index += 1;
                true
            }
            _ => false,
        }
    }

    fn consume_or_separator(&mut self) -> bool {
        match self.peek().map(|token| &token.kind) {
            Some(QueryTokenKind::Pipe | QueryTokenKind::Or) => {
                self.index += 1;
                true
            }
            _ => false,
        }
    }

    fn consume_not_prefix(&mut self) -> bool {
        match self.peek().map(|token| &token.kind) {
            Some(QueryTokenKind::Bang | QueryTokenKind::Not) => {
                self.index += 1;
                true
            }
            _ => false,
        }
    }

    fn consume_kind(&mut self, expected: &QueryTokenKind) -> bool {
        matches!(self.peek().map(|token| &token.kind), Some(kind) if kind == expected) && {
            self.index += 1;
            true
        }
    }

    fn next_is_group_close(&self) -> bool {
        matches!(
            self.peek().map(|token| &token.kind),
            Some(QueryTokenKind::RParen)
        )
    }

    fn is_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn peek(&self) -> Option<&QueryToken> {
        self.tokens.get(self.index)
    }

    fn last_position(&self) -> usize {
        self.tokens
            .last()
            .map(|token| token.position)
            .unwrap_or_default()
    }

    fn error_here(&self, message: &str) -> FileQueryError {
        let position = self
            .peek()
            .map(|token| token.position)
            .unwrap_or_else(|| self.last_position());
        FileQueryError::QueryParse(format!("{message} near byte {position}"))
    }
}

// ---------------------------------------------------------------------------
// Term parsing
// ---------------------------------------------------------------------------

/// Height of a term's own tree; `size:` comparisons lower to at most two levels.
fn expression_height(expression: &Expression) -> usize {
    match expression {
        Expression::Not(inner) => 1 + expression_height(inner),
        Expression::And(left, right) | Expression::Or(left, right) => {
            1 + expression_height(left).max(expression_height(right))
        }
        _ => 1,
    }
}

fn parse_query_term(token: &QueryToken) -> Result<Expression> {
    match &token.kind {
        QueryTokenKind::Phrase(value) => Expression::name_matches(value),
        QueryTokenKind::Word(raw) => {
            if raw.eq_ignore_ascii_case("all") {
                return Ok(Expression::all());
            }
            if raw.eq_ignore_ascii_case("writable") {
                return Ok(Expression::writable());
            }
            let Some(split) = raw.find(':') else {
                return Expression::name_matches(raw);
            };
            if split == 0 {
                return Expression::name_matches(raw);
            }
            let name = raw[..split].to_ascii_lowercase();
            let argument = &raw[split + 1..];
            match name.as_str() {
                "name" => {
                    if argument.is_empty() {
                        return Err(FileQueryError::QueryParse(
                            "name: requires a pattern".to_string(),
                        ));
                    }
                    Expression::name_matches(argument)
                }
                "size" => parse_size_filter(argument.trim()),
                "bigger" => Ok(Expression::size_greater_than(parse_size_literal(argument)?)),
                _ => Err(FileQueryError::QueryParse(format!(
                    "unknown filter {name:?} near byte {}",
                    token.position
                ))),
            }
        }
        _ => Err(FileQueryError::QueryParse(
            "invalid query token while parsing term".to_string(),
        )),
    }
}

/// Lowers a size comparison onto `SizeGreaterThan`, `Not` and `All`.
fn parse_size_filter(raw: &str) -> Result<Expression> {
    if raw.is_empty() {
        return Err(FileQueryError::QueryParse(
            "size: requires a value".to_string(),
        ));
    }

    for operator in [">=", "<=", ">", "<"] {
        let Some(value_raw) = raw.strip_prefix(operator) else {
            continue;
        };
        let value = parse_size_literal(value_raw)?;
        return Ok(match operator {
            ">" => Expression::size_greater_than(value),
            ">=" => at_least(value),
            "<=" => Expression::not(Expression::size_greater_than(value)),
            _ => Expression::not(at_least(value)),
        });
    }

    Err(FileQueryError::QueryParse(format!(
        "size: expected one of >, >=, <, <= before {raw:?}"
    )))
}

fn at_least(value: u64) -> Expression {
    match value.checked_sub(1) {
        Some(threshold) => Expression::size_greater_than(threshold),
        None => Expression::all(),
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

fn tokenize_query_input(input: &str) -> Result<Vec<QueryToken>> {
    let mut tokens = Vec::new();
    let mut cursor = 0usize;

    while let Some(ch) = input[cursor..].chars().next() {
        if ch.is_whitespace() {
            cursor += ch.len_utf8();
            continue;
        }

        let position = cursor;
        let single = match ch {
            '(' => Some(QueryTokenKind::LParen),
            ')' => Some(QueryTokenKind::RParen),
            '|' => Some(QueryTokenKind::Pipe),
            '&' => Some(QueryTokenKind::Amp),
            '!' => Some(QueryTokenKind::Bang),
            _ => None,
        };
        if let Some(kind) = single {
            tokens.push(QueryToken { kind, position });
            cursor += 1;
            continue;
        }

        if ch == '"' {
            let (phrase, next_cursor) = consume_quoted_phrase(input, cursor)?;
            tokens.push(QueryToken {
                kind: QueryTokenKind::Phrase(phrase),
                position,
            });
            cursor = next_cursor;
            continue;
        }

        let (word, next_cursor) = consume_word(input, cursor)?;
        let kind = if word.eq_ignore_ascii_case("and") {
            QueryTokenKind::And
        } else if word.eq_ignore_ascii_case("or") {
            QueryTokenKind::Or
        } else if word.eq_ignore_ascii_case("not") {
            QueryTokenKind::Not
        } else {
            QueryTokenKind::Word(word)
        };
        tokens.push(QueryToken { kind, position });
        cursor = next_cursor;
    }

    Ok(tokens)
}

/// Reads a bare word. After a `key:` prefix, `!` no longer ends the word
/// (so `name:[!a]*` works) and a quoted argument is read as a phrase.
fn consume_word(input: &str, start: usize) -> Result<(String, usize)> {
    let mut word = String::new();
    let mut cursor = start;
    let mut seen_colon = false;

    while let Some(next) = input[cursor..].chars().next() {
        if next.is_whitespace() || matches!(next, '(' | ')' | '|' | '&') {
            break;
        }
        if !seen_colon && next == '!' {
            break;
        }
        if next == '"' && word.ends_with(':') {
            let (phrase, next_cursor) = consume_quoted_phrase(input, cursor)?;
            word.push_str(&phrase);
            return Ok((word, next_cursor));
        }
        if next == ':' {
            seen_colon = true;
        }
        word.push(next);
        cursor += next.len_utf8();
    }

    Ok((word, cursor))
}

fn consume_quoted_phrase(input: &str, start: usize) -> Result<(String, usize)> {
    let mut cursor = start + 1;
    let mut phrase = String::new();
    let mut escaped = false;

    while let Some(ch) = input[cursor..].chars().next() {
        cursor += ch.len_utf8();

        if escaped {
            phrase.push(ch);
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            return Ok((phrase, cursor));
        }

        phrase.push(ch);
    }

    Err(FileQueryError::QueryParse(format!(
        "missing closing quote near byte {start}"
    )))
}
