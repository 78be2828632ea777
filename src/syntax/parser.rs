//! Directive line parser.
//!
//! Tokenization is done by the pest grammar in `grammar.pest`; grouping tokens
//! into [`Directive`]s happens here so that errors can name the exact token
//! that broke the `--verb path[mod] value` shape.

use std::ops::Range;

use log::trace;
use once_cell::sync::Lazy;
use pest::{error::InputLocation, iterators::Pair, Parser};
use pest_derive::Parser;
use regex::Regex;

use crate::directive::{Directive, ListOp, Verb};
use crate::errors::{named_source, RegrunError, SourceArc};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct DirectiveGrammar;

static OPTION_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("valid regex"));

const VERB_HELP: &str = "expected one of --set, --sets, --enable, --disable";

/// The harness-relevant content of a fixture's first line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamLine {
    /// `SKIP` was present: exclude from default runs.
    pub skip: bool,
    pub directives: Vec<Directive>,
}

/// A word from the directive line after quote removal.
#[derive(Debug, Clone)]
struct Token {
    text: String,
    span: Range<usize>,
    quoted: bool,
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses the header of a fixture. Only the first line is examined; a file
/// without a directive line yields an empty, non-skipped [`ParamLine`].
pub fn parse_header(source_name: &str, text: &str) -> Result<ParamLine, RegrunError> {
    let first_line = text.lines().next().unwrap_or_default();
    let src = named_source(source_name, text);
    Ok(parse_param_line(first_line, &src)?.unwrap_or_default())
}

/// Parses a single line. Returns `Ok(None)` when the line is not a directive line.
///
/// `src` is used for diagnostics; the line is expected to start at offset 0 of it.
pub fn parse_param_line(line: &str, src: &SourceArc) -> Result<Option<ParamLine>, RegrunError> {
    if let Ok(mut pairs) = DirectiveGrammar::parse(Rule::param_line, line) {
        let Some(param_line) = pairs.next() else {
            return Ok(None);
        };
        let mut skip = false;
        let mut tokens = Vec::new();
        for pair in param_line.into_inner() {
            match pair.as_rule() {
                Rule::marker => {
                    skip = pair.into_inner().any(|p| p.as_rule() == Rule::skip_kw);
                }
                Rule::tokens => tokens = collect_tokens(pair),
                _ => {}
            }
        }
        let directives = group_tokens(tokens, src)?;
        trace!("parsed {} directive(s), skip = {}", directives.len(), skip);
        return Ok(Some(ParamLine { skip, directives }));
    }

    if DirectiveGrammar::parse(Rule::skip_line, line).is_ok() {
        trace!("bare SKIP marker");
        return Ok(Some(ParamLine {
            skip: true,
            directives: Vec::new(),
        }));
    }

    // The line announces directives but its tokens do not lex.
    if DirectiveGrammar::parse(Rule::marker, line).is_ok() {
        return Err(lex_error(line, src));
    }

    Ok(None)
}

/// Parses the text that follows `PARAM:`, e.g. the output of
/// [`render_directives`](crate::directive::render_directives).
pub fn parse_directives(text: &str) -> Result<Vec<Directive>, RegrunError> {
    let src = named_source("<directives>", text);
    let mut pairs = DirectiveGrammar::parse(Rule::directive_list, text)
        .map_err(|e| lex_error_at(text, &src, e.location))?;
    let mut tokens = Vec::new();
    if let Some(list) = pairs.next() {
        for pair in list.into_inner() {
            if pair.as_rule() == Rule::tokens {
                tokens = collect_tokens(pair);
            }
        }
    }
    group_tokens(tokens, &src)
}

// ============================================================================
// TOKENS
// ============================================================================

fn collect_tokens(pair: Pair<Rule>) -> Vec<Token> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::token)
        .map(build_token)
        .collect()
}

fn build_token(pair: Pair<Rule>) -> Token {
    let span = pair.as_span().start()..pair.as_span().end();
    let mut text = String::new();
    let mut quoted = false;
    for segment in pair.into_inner() {
        let raw = segment.as_str();
        match segment.as_rule() {
            Rule::dq_segment => {
                quoted = true;
                unescape_into(&raw[1..raw.len() - 1], &mut text);
            }
            Rule::sq_segment => {
                quoted = true;
                text.push_str(&raw[1..raw.len() - 1]);
            }
            _ => text.push_str(raw),
        }
    }
    Token { text, span, quoted }
}

fn unescape_into(body: &str, out: &mut String) {
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
            continue;
        }
        out.push(c);
    }
}

fn lex_error(line: &str, src: &SourceArc) -> RegrunError {
    match DirectiveGrammar::parse(Rule::param_line, line) {
        Err(e) => lex_error_at(line, src, e.location),
        Ok(_) => RegrunError::malformed("invalid directive line", src, 0..line.len()),
    }
}

fn lex_error_at(line: &str, src: &SourceArc, location: InputLocation) -> RegrunError {
    let start = match location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    };
    let start = start.min(line.len().saturating_sub(1));
    RegrunError::malformed("unterminated quote in directive line", src, start..line.len())
        .with_help("close the quote or escape it with a backslash inside double quotes")
}

// ============================================================================
// GROUPING
// ============================================================================

fn group_tokens(tokens: Vec<Token>, src: &SourceArc) -> Result<Vec<Directive>, RegrunError> {
    let mut directives = Vec::new();
    let mut tokens = tokens.into_iter();

    while let Some(head) = tokens.next() {
        let verb = match (head.quoted, Verb::from_flag(&head.text)) {
            (false, Some(verb)) => verb,
            _ if head.text.starts_with("--") => {
                return Err(RegrunError::malformed(
                    format!("unknown directive verb '{}'", head.text),
                    src,
                    head.span,
                )
                .with_help(VERB_HELP));
            }
            _ => {
                return Err(RegrunError::malformed(
                    format!("expected a directive verb, found '{}'", head.text),
                    src,
                    head.span,
                )
                .with_help(VERB_HELP));
            }
        };

        let Some(target) = tokens.next() else {
            return Err(RegrunError::malformed(
                format!("missing option path after '{}'", verb.flag()),
                src,
                head.span,
            ));
        };
        let (path, list_op) = split_target(&target, src)?;

        if list_op.is_some() && !verb.accepts_list_op() {
            return Err(RegrunError::malformed(
                format!("'{}' does not accept a list modifier", verb.flag()),
                src,
                target.span,
            )
            .with_help("list modifiers [+] and [-] are only valid with --set"));
        }

        let value = if verb.takes_value() {
            match tokens.next() {
                Some(value) if value.quoted || Verb::from_flag(&value.text).is_none() => {
                    Some(value.text)
                }
                _ => {
                    return Err(RegrunError::malformed(
                        format!("missing value for '{} {}'", verb.flag(), target.text),
                        src,
                        target.span,
                    ))
                }
            }
        } else {
            None
        };

        directives.push(Directive {
            verb,
            path,
            list_op,
            value,
        });
    }

    Ok(directives)
}

fn split_target(token: &Token, src: &SourceArc) -> Result<(String, Option<ListOp>), RegrunError> {
    let text = token.text.as_str();
    let (path, list_op) = if let Some(path) = text.strip_suffix("[+]") {
        (path, Some(ListOp::Append))
    } else if let Some(path) = text.strip_suffix("[-]") {
        (path, Some(ListOp::Remove))
    } else {
        (text, None)
    };

    if !OPTION_PATH.is_match(path) {
        return Err(RegrunError::malformed(
            format!("invalid option path '{}'", text),
            src,
            token.span.clone(),
        )
        .with_help("option paths are dot-separated names, optionally followed by [+] or [-]"));
    }
    Ok((path.to_string(), list_op))
}
