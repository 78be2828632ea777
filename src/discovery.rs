use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::errors::RegrunError;
use crate::fixture::TestCase;

/// A fixture file that was found but could not be read or whose directive
/// line did not parse.
#[derive(Debug)]
pub struct InvalidFixture {
    pub path: PathBuf,
    pub error: RegrunError,
}

/// Everything found under a fixture root.
#[derive(Debug, Default)]
pub struct Discovered {
    pub cases: Vec<TestCase>,
    pub invalid: Vec<InvalidFixture>,
}

impl Discovered {
    /// Groups the valid fixtures by category directory name, in sorted order.
    pub fn by_category(&self) -> BTreeMap<String, Vec<&TestCase>> {
        let mut groups: BTreeMap<String, Vec<&TestCase>> = BTreeMap::new();
        for case in &self.cases {
            let category = case
                .source_path
                .parent()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            groups.entry(category).or_default().push(case);
        }
        groups
    }
}

/// Discovers regression fixtures under a root directory.
#[derive(Debug)]
pub struct FixtureDiscoverer;

impl FixtureDiscoverer {
    fn is_fixture_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "c")
    }

    /// Recursively scans a directory for `.c` fixtures.
    ///
    /// The returned list of files is sorted to ensure deterministic execution order.
    pub fn discover_fixture_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, RegrunError> {
        let root = root.as_ref();
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| RegrunError::Walk {
                root: root.to_path_buf(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !Self::is_fixture_file(path) {
                continue;
            }
            files.push(path.to_path_buf());
        }
        files.sort();
        debug!("found {} fixture file(s) under {}", files.len(), root.display());
        Ok(files)
    }

    /// Discovers and loads every fixture. A fixture that cannot be read or whose
    /// directive line is malformed is recorded as invalid without affecting the
    /// others; only a failed directory walk aborts.
    pub fn load_all<P: AsRef<Path>>(root: P) -> Result<Discovered, RegrunError> {
        let mut discovered = Discovered::default();
        for path in Self::discover_fixture_files(root)? {
            match TestCase::load(&path) {
                Ok(case) => discovered.cases.push(case),
                Err(error) => {
                    debug!("invalid fixture {}: {}", path.display(), error);
                    discovered.invalid.push(InvalidFixture { path, error });
                }
            }
        }
        Ok(discovered)
    }
}
