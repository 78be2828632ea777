//! Structured harness directives.
//!
//! A directive is one `--verb path[mod] value` group from a fixture's `PARAM` line.
//! Directives keep their source order; nothing here merges or deduplicates them.

use std::fmt;

use serde::Serialize;

/// The flag that introduced a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// `--set`: value is interpreted by the analyzer (JSON or string).
    Set,
    /// `--sets`: value is always a string.
    Sets,
    /// `--enable`: boolean shorthand, takes no value.
    Enable,
    /// `--disable`: boolean shorthand, takes no value.
    Disable,
}

impl Verb {
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "--set" => Some(Verb::Set),
            "--sets" => Some(Verb::Sets),
            "--enable" => Some(Verb::Enable),
            "--disable" => Some(Verb::Disable),
            _ => None,
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            Verb::Set => "--set",
            Verb::Sets => "--sets",
            Verb::Enable => "--enable",
            Verb::Disable => "--disable",
        }
    }

    pub fn takes_value(&self) -> bool {
        matches!(self, Verb::Set | Verb::Sets)
    }

    /// Only `--set` operates on list-valued options.
    pub fn accepts_list_op(&self) -> bool {
        matches!(self, Verb::Set)
    }
}

/// List modifier suffix on an option path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOp {
    /// `path[+]`
    Append,
    /// `path[-]`
    Remove,
}

impl ListOp {
    pub fn suffix(&self) -> &'static str {
        match self {
            ListOp::Append => "[+]",
            ListOp::Remove => "[-]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub verb: Verb,
    /// Dotted option path without the list modifier.
    pub path: String,
    pub list_op: Option<ListOp>,
    /// `None` exactly when the verb takes no value.
    pub value: Option<String>,
}

impl Directive {
    pub fn set(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            verb: Verb::Set,
            path: path.into(),
            list_op: None,
            value: Some(value.into()),
        }
    }

    pub fn sets(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            verb: Verb::Sets,
            path: path.into(),
            list_op: None,
            value: Some(value.into()),
        }
    }

    pub fn append(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            list_op: Some(ListOp::Append),
            ..Self::set(path, value)
        }
    }

    pub fn remove(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            list_op: Some(ListOp::Remove),
            ..Self::set(path, value)
        }
    }

    pub fn toggle(path: impl Into<String>, enabled: bool) -> Self {
        Self {
            verb: if enabled { Verb::Enable } else { Verb::Disable },
            path: path.into(),
            list_op: None,
            value: None,
        }
    }

    /// The path as written on the line, including any list modifier.
    pub fn target(&self) -> String {
        match self.list_op {
            Some(op) => format!("{}{}", self.path, op.suffix()),
            None => self.path.clone(),
        }
    }

    /// Renders the directive as analyzer command-line arguments.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.verb.flag().to_string(), self.target()];
        if let Some(value) = &self.value {
            args.push(value.clone());
        }
        args
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb.flag(), self.target())?;
        if let Some(value) = &self.value {
            write!(f, " {}", quote_token(value))?;
        }
        Ok(())
    }
}

/// Serializes directives back into the text after `PARAM:`.
pub fn render_directives(directives: &[Directive]) -> String {
    directives
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quotes a token so the directive tokenizer reads it back unchanged.
pub fn quote_token(token: &str) -> String {
    let needs_quotes = token.is_empty()
        || token.starts_with("--")
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
    if !needs_quotes {
        return token.to_string();
    }
    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for c in token.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_list_modifier() {
        assert_eq!(
            Directive::append("ana.activated", "apron").to_string(),
            "--set ana.activated[+] apron"
        );
        assert_eq!(
            Directive::toggle("ana.int.interval", true).to_string(),
            "--enable ana.int.interval"
        );
    }

    #[test]
    fn quote_token_only_when_needed() {
        assert_eq!(quote_token("mutex-meet-tid"), "mutex-meet-tid");
        assert_eq!(quote_token(""), "\"\"");
        assert_eq!(quote_token("['a', 'b']"), "\"['a', 'b']\"");
        assert_eq!(quote_token("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn to_args_keeps_value_verbatim() {
        let directive = Directive::sets("exp.apron.privatization", "mutex meet");
        assert_eq!(
            directive.to_args(),
            vec!["--sets", "exp.apron.privatization", "mutex meet"]
        );
    }
}
