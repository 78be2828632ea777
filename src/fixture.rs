//! Regression fixtures: a C source file plus the directives in its first line.

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::annotations::{scan_annotations, Annotation};
use crate::directive::Directive;
use crate::errors::{named_source, RegrunError};
use crate::syntax::parse_param_line;

static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)-(.+)$").expect("valid regex"));

/// Identity derived from the `<NN>-<category>/<id>-<name>.c` naming convention.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FixtureId {
    pub category_number: u32,
    pub category_name: String,
    pub id: u32,
    pub name: String,
}

impl FixtureId {
    /// Returns `None` when either the file or its parent directory does not
    /// follow the convention.
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let category = path.parent()?.file_name()?.to_str()?;
        let (id, name) = split_numbered(stem)?;
        let (category_number, category_name) = split_numbered(category)?;
        Some(Self {
            category_number,
            category_name,
            id,
            name,
        })
    }

    /// Short selector form, e.g. `36/89`.
    pub fn short(&self) -> String {
        format!("{}/{}", self.category_number, self.id)
    }
}

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{}/{:02}-{}",
            self.category_number, self.category_name, self.id, self.name
        )
    }
}

fn split_numbered(text: &str) -> Option<(u32, String)> {
    let caps = NUMBERED.captures(text)?;
    let number = caps[1].parse().ok()?;
    Some((number, caps[2].to_string()))
}

/// A loaded fixture. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct TestCase {
    pub source_path: PathBuf,
    pub id: Option<FixtureId>,
    /// Excluded from default runs.
    pub skip: bool,
    pub directives: Vec<Directive>,
    /// Program text after the directive line (the whole file if there is none).
    pub body: String,
    /// 1-based line number at which `body` starts.
    pub body_line: usize,
}

impl TestCase {
    /// Reads and parses a fixture. Bytes that are not UTF-8 (Latin-1 comments,
    /// say) are replaced rather than rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegrunError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| RegrunError::io(path, e))?;
        Self::from_source(path, &String::from_utf8_lossy(&bytes))
    }

    /// Builds a test case from in-memory text; `path` is used for identity
    /// and diagnostics only.
    pub fn from_source(path: impl AsRef<Path>, text: &str) -> Result<Self, RegrunError> {
        let path = path.as_ref();
        let first_line = text.lines().next().unwrap_or_default();
        let src = named_source(path.display().to_string(), text);
        let header = parse_param_line(first_line, &src)?;

        let (body, body_line) = match header {
            Some(_) => {
                let rest = text.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
                (rest.to_string(), 2)
            }
            None => (text.to_string(), 1),
        };
        let header = header.unwrap_or_default();

        debug!(
            "loaded {}: {} directive(s){}",
            path.display(),
            header.directives.len(),
            if header.skip { ", SKIP" } else { "" }
        );

        Ok(Self {
            source_path: path.to_path_buf(),
            id: FixtureId::from_path(path),
            skip: header.skip,
            directives: header.directives,
            body,
            body_line,
        })
    }

    /// Analyzer arguments for this fixture's directives, in order.
    pub fn analyzer_args(&self) -> Vec<String> {
        self.directives.iter().flat_map(Directive::to_args).collect()
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        scan_annotations(&self.body, self.body_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_id_from_convention() {
        let id = FixtureId::from_path(Path::new("tests/regression/36-apron/89-mine14-mod.c"))
            .unwrap();
        assert_eq!(id.category_number, 36);
        assert_eq!(id.category_name, "apron");
        assert_eq!(id.id, 89);
        assert_eq!(id.name, "mine14-mod");
        assert_eq!(id.short(), "36/89");
        assert_eq!(id.to_string(), "36-apron/89-mine14-mod");
    }

    #[test]
    fn unconventional_names_have_no_id() {
        assert!(FixtureId::from_path(Path::new("misc/race.c")).is_none());
        assert!(FixtureId::from_path(Path::new("36-apron/race.c")).is_none());
    }

    #[test]
    fn body_excludes_directive_line() {
        let case =
            TestCase::from_source("a.c", "// PARAM: --set a 1\nint main() { assert(1); }\n")
                .unwrap();
        assert_eq!(case.body, "int main() { assert(1); }\n");
        assert_eq!(case.body_line, 2);
        assert_eq!(case.annotations()[0].line, 2);
    }

    #[test]
    fn file_without_header_keeps_whole_body() {
        let text = "int main() { return 0; }\n";
        let case = TestCase::from_source("a.c", text).unwrap();
        assert!(case.directives.is_empty());
        assert!(!case.skip);
        assert_eq!(case.body, text);
        assert_eq!(case.body_line, 1);
    }
}
