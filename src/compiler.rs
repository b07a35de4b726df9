//! Compiler for annotated SQL source text.
//!
//! Parses named query blocks like:
//! ```text
//! -- name: remove_blog!
//! -- Remove a blog from the database.
//! delete from blogs where blogid = :blogid;
//!
//! -- name: current_user?
//! select * from users where userid = :userid
//! ```
//! into [`Query`] descriptors keyed by name. The SQL itself is opaque; only
//! the header line, doc-comment lines, and the `:name` / `?` placeholders are
//! recognized.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, space0},
    combinator::{all_consuming, map, rest},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{SqlbookError, SqlbookResult};
use crate::query::{CompiledSet, Operation, Parameter, Query};

/// Compile annotated SQL source text into a set of named query descriptors.
///
/// Fails with [`SqlbookError::InvalidQueryName`] if any header declares a
/// name that is not a plain identifier; no partial set is returned. When two
/// segments declare the same name, the later one replaces the earlier.
pub fn compile(source: &str) -> SqlbookResult<CompiledSet> {
    let mut set = CompiledSet::default();
    for segment in split_segments(source) {
        let query = parse_segment(&segment)?;
        set.queries.insert(query.name.clone(), query);
    }
    Ok(set)
}

/// Group the source lines into per-query segments.
///
/// A header-marker line opens a new segment whose first line is the marker's
/// remainder (name plus optional tag). Lines before the first marker form a
/// preamble segment so that stray content still fails name validation.
/// Segments that are entirely whitespace are dropped.
fn split_segments(source: &str) -> Vec<Vec<&str>> {
    let mut segments: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in source.lines() {
        if let Ok((_, name_part)) = header_marker(line) {
            if !is_blank(&current) {
                segments.push(current);
            }
            current = vec![name_part];
        } else {
            current.push(line);
        }
    }
    if !is_blank(&current) {
        segments.push(current);
    }

    segments
}

fn is_blank(lines: &[&str]) -> bool {
    lines.iter().all(|line| line.trim().is_empty())
}

/// Build one descriptor from a segment's lines.
fn parse_segment(lines: &[&str]) -> SqlbookResult<Query> {
    let header = lines[0].trim();
    let (name, operation) = split_operation_tag(header);
    if !is_valid_name(name) {
        return Err(SqlbookError::InvalidQueryName(name.to_string()));
    }

    let (query_string, docs) = split_docs_and_sql(&lines[1..]);
    let params = extract_params(&query_string);

    Ok(Query {
        name: name.to_string(),
        operation,
        docs,
        query_string,
        params,
    })
}

/// Strip the operation tag from a header, longest suffix first.
///
/// `<!` and `*!` must be checked before the bare `!` they end with.
fn split_operation_tag(header: &str) -> (&str, Operation) {
    if let Some(name) = header.strip_suffix("<!") {
        (name, Operation::InsertReturning)
    } else if let Some(name) = header.strip_suffix("*!") {
        (name, Operation::InsertUpdateDeleteMany)
    } else if let Some(name) = header.strip_suffix('!') {
        (name, Operation::InsertUpdateDelete)
    } else if let Some(name) = header.strip_suffix('#') {
        (name, Operation::Script)
    } else if let Some(name) = header.strip_suffix('?') {
        (name, Operation::SelectOneRow)
    } else {
        (header, Operation::Select)
    }
}

/// Classify a segment's body lines into SQL text and doc text.
///
/// Doc recognition is anchored to the start of the line: a SQL line with a
/// trailing inline `--` comment stays SQL.
fn split_docs_and_sql(lines: &[&str]) -> (String, String) {
    let mut docs = String::new();
    let mut sql = String::new();

    for line in lines {
        if let Ok((_, text)) = doc_comment(line) {
            docs.push_str(text);
            docs.push('\n');
        } else {
            sql.push_str(line);
            sql.push('\n');
        }
    }

    (sql.trim().to_string(), docs)
}

/// Scan a query body for placeholders, left to right.
fn extract_params(query_string: &str) -> Vec<Parameter> {
    let mut params = Vec::new();
    let mut input = query_string;

    while !input.is_empty() {
        if let Ok((next, param)) = placeholder(input) {
            params.push(param);
            input = next;
        } else {
            let mut chars = input.chars();
            chars.next();
            input = chars.as_str();
        }
    }

    params
}

// =============================================================================
// Recognition rules
// =============================================================================

/// Match a name-definition header line; the output is the name-plus-tag text.
fn header_marker(line: &str) -> IResult<&str, &str> {
    preceded(
        tuple((
            space0,
            tag("--"),
            space0,
            tag("name"),
            space0,
            char(':'),
            space0,
        )),
        rest,
    )(line)
}

/// Match a doc-comment line; the output is the text after the marker.
fn doc_comment(line: &str) -> IResult<&str, &str> {
    preceded(tuple((space0, tag("--"), space0)), rest)(line)
}

/// Match one placeholder at the start of the input: `?` or `:name`.
fn placeholder(input: &str) -> IResult<&str, Parameter> {
    alt((
        map(char('?'), |_| Parameter::Positional),
        map(
            preceded(
                char(':'),
                take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
            ),
            |name: &str| Parameter::Named {
                name: name.to_string(),
            },
        ),
    ))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

fn is_valid_name(name: &str) -> bool {
    all_consuming(identifier)(name).is_ok()
}
