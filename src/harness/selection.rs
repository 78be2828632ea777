use std::path::Path;

use crate::fixture::TestCase;

/// What the harness does with a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Run,
    /// Marked `SKIP` and not requested explicitly.
    Skipped,
    /// Did not match any path filter.
    Filtered,
}

/// Which fixtures a run covers.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Substrings matched against the fixture path relative to the root.
    pub filters: Vec<String>,
    pub run_skipped: bool,
}

impl Selection {
    pub fn new(filters: Vec<String>, run_skipped: bool) -> Self {
        Self {
            filters,
            run_skipped,
        }
    }

    pub fn decide(&self, case: &TestCase, root: &Path) -> Decision {
        let relative = relative_name(&case.source_path, root);
        let explicit = self.names_explicitly(case, &relative);
        let matched = explicit || self.filters.iter().any(|f| relative.contains(f.as_str()));
        if !self.filters.is_empty() && !matched {
            return Decision::Filtered;
        }
        if case.skip && !self.run_skipped && !explicit {
            return Decision::Skipped;
        }
        Decision::Run
    }

    /// Path-only filter check, for fixtures that could not be loaded.
    pub fn matches_path(&self, path: &Path, root: &Path) -> bool {
        let relative = relative_name(path, root);
        self.filters.is_empty() || self.filters.iter().any(|f| relative.contains(f.as_str()))
    }

    /// A filter names a fixture explicitly when it equals its relative path
    /// without extension, its file stem, or its `<category>/<id>` short form.
    fn names_explicitly(&self, case: &TestCase, relative: &str) -> bool {
        let without_ext = relative.strip_suffix(".c").unwrap_or(relative);
        let stem = case
            .source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let short = case.id.as_ref().map(|id| id.short());

        self.filters.iter().any(|f| {
            f == relative || f == without_ext || *f == stem || short.as_deref() == Some(f.as_str())
        })
    }
}

/// Fixture path relative to `root`, `/`-separated.
pub fn relative_name(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(path: &str, skip: bool) -> TestCase {
        let header = if skip { "// SKIP PARAM: --set a 1\n" } else { "// PARAM: --set a 1\n" };
        TestCase::from_source(path, &format!("{header}int main() {{ return 0; }}\n")).unwrap()
    }

    #[test]
    fn skipped_unless_requested() {
        let root = Path::new("regression");
        let fixture = case("regression/36-apron/89-mine14-mod.c", true);

        assert_eq!(Selection::default().decide(&fixture, root), Decision::Skipped);
        assert_eq!(
            Selection::new(vec![], true).decide(&fixture, root),
            Decision::Run
        );
        assert_eq!(
            Selection::new(vec!["36-apron".into()], false).decide(&fixture, root),
            Decision::Skipped
        );
        for explicit in ["36-apron/89-mine14-mod", "89-mine14-mod", "36/89"] {
            assert_eq!(
                Selection::new(vec![explicit.into()], false).decide(&fixture, root),
                Decision::Run,
                "{explicit}"
            );
        }
    }

    #[test]
    fn filters_exclude_non_matching() {
        let root = Path::new("regression");
        let fixture = case("regression/13-privatized/01-priv_nr.c", false);
        assert_eq!(Selection::default().decide(&fixture, root), Decision::Run);
        assert_eq!(
            Selection::new(vec!["apron".into()], false).decide(&fixture, root),
            Decision::Filtered
        );
    }
}
