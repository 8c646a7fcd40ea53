//! Splitting free-text queries into top-level clauses
//!
//! Tantivy's parser has no single-term wildcard, so `intro*` and
//! `title:intro*` are picked out here and turned into prefix queries by
//! the index. Every other clause still goes through `QueryParser`.

use tantivy::query::Occur;

/// One whitespace-separated clause with its `+`/`-` marker removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause<'a> {
    pub occur: Occur,
    pub kind: ClauseKind<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseKind<'a> {
    /// `term*` or `field:term*`; the prefix is lowercased later
    Wildcard {
        field: Option<&'a str>,
        prefix: &'a str,
    },
    /// Anything else, handed to the query parser as is
    Parsed(&'a str),
}

/// True when any clause of the query ends in a single-term wildcard
pub fn has_wildcard(query: &str) -> bool {
    split_clauses(query)
        .iter()
        .any(|c| matches!(c.kind, ClauseKind::Wildcard { .. }))
}

/// Split on whitespace outside double quotes
pub fn split_clauses(query: &str) -> Vec<Clause<'_>> {
    let mut raw = Vec::new();
    let mut start = None;
    let mut in_quotes = false;

    for (i, c) in query.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
            start.get_or_insert(i);
        } else if c.is_whitespace() && !in_quotes {
            if let Some(s) = start.take() {
                raw.push(&query[s..i]);
            }
        } else {
            start.get_or_insert(i);
        }
    }
    if let Some(s) = start {
        raw.push(&query[s..]);
    }

    raw.into_iter().map(parse_clause).collect()
}

fn parse_clause(clause: &str) -> Clause<'_> {
    let (occur, body) = if let Some(rest) = clause.strip_prefix('+') {
        (Occur::Must, rest)
    } else if let Some(rest) = clause.strip_prefix('-') {
        (Occur::MustNot, rest)
    } else {
        (Occur::Should, clause)
    };

    let kind = wildcard(body).unwrap_or(ClauseKind::Parsed(body));
    Clause { occur, kind }
}

fn wildcard(body: &str) -> Option<ClauseKind<'_>> {
    let stem = body.strip_suffix('*')?;
    let (field, prefix) = match stem.split_once(':') {
        Some((field, prefix)) => (Some(field), prefix),
        None => (None, stem),
    };
    if prefix.is_empty() || !prefix.chars().all(char::is_alphanumeric) {
        return None;
    }
    Some(ClauseKind::Wildcard { field, prefix })
}
