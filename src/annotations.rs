//! Expected-verdict annotations in fixture bodies.
//!
//! Fixtures mark lines with trailing comments such as `// UNKNOWN!` or
//! `// NORACE`. An `assert(...)` without a marker is expected to succeed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(UNKNOWN!|UNKNOWN|NODEADLOCK|DEADLOCK|NORACE|RACE|NOTERM|TERM|NOWARN|SUCCESS|FAIL)(?:[\s:(!]|$)",
    )
    .expect("valid regex")
});

static ASSERTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(assert|__goblint_check)\s*\(").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    Success,
    Fail,
    /// `UNKNOWN`: the analyzer may or may not prove the assertion.
    Unknown,
    /// `UNKNOWN!`: the analyzer must not prove the assertion.
    MustBeUnknown,
    NoWarn,
    Race,
    NoRace,
    Deadlock,
    NoDeadlock,
    Term,
    NoTerm,
}

impl Expectation {
    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "SUCCESS" => Expectation::Success,
            "FAIL" => Expectation::Fail,
            "UNKNOWN" => Expectation::Unknown,
            "UNKNOWN!" => Expectation::MustBeUnknown,
            "NOWARN" => Expectation::NoWarn,
            "RACE" => Expectation::Race,
            "NORACE" => Expectation::NoRace,
            "DEADLOCK" => Expectation::Deadlock,
            "NODEADLOCK" => Expectation::NoDeadlock,
            "TERM" => Expectation::Term,
            "NOTERM" => Expectation::NoTerm,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// 1-based line number in the fixture file.
    pub line: usize,
    pub expectation: Expectation,
}

/// Scans `body` for annotations. `first_line` is the file line number of the
/// first line of `body`.
pub fn scan_annotations(body: &str, first_line: usize) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    for (offset, text) in body.lines().enumerate() {
        let line = first_line + offset;
        let (code, comment) = match text.find("//") {
            Some(at) => (&text[..at], Some(&text[at + 2..])),
            None => (text, None),
        };

        let marked = comment
            .and_then(|c| MARKER.captures(c))
            .and_then(|caps| Expectation::from_keyword(&caps[1]));

        match marked {
            Some(expectation) => annotations.push(Annotation { line, expectation }),
            None if ASSERTION.is_match(code) => annotations.push(Annotation {
                line,
                expectation: Expectation::Success,
            }),
            None => {}
        }
    }
    annotations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_assert_is_success() {
        let body = "int main() {\n  assert(x <= 100);\n}\n";
        assert_eq!(
            scan_annotations(body, 1),
            vec![Annotation {
                line: 2,
                expectation: Expectation::Success
            }]
        );
    }

    #[test]
    fn must_be_unknown_is_not_plain_unknown() {
        let body = "assert(x); // UNKNOWN!\nassert(y); // UNKNOWN\n";
        let kinds: Vec<_> = scan_annotations(body, 10)
            .into_iter()
            .map(|a| (a.line, a.expectation))
            .collect();
        assert_eq!(
            kinds,
            vec![(10, Expectation::MustBeUnknown), (11, Expectation::Unknown)]
        );
    }

    #[test]
    fn race_markers_on_plain_statements() {
        let body = "g = 1; // RACE\ng = 2; //NORACE\n// Fig 5a from Mine 2014\n";
        let kinds: Vec<_> = scan_annotations(body, 1)
            .into_iter()
            .map(|a| a.expectation)
            .collect();
        assert_eq!(kinds, vec![Expectation::Race, Expectation::NoRace]);
    }

    #[test]
    fn keyword_must_lead_the_comment() {
        assert!(scan_annotations("x++; // this will FAIL later\n", 1).is_empty());
        assert!(scan_annotations("x++; // RACEY\n", 1).is_empty());
    }
}
