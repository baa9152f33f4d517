use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const FIXTURES_FORMAT_V1: &str = "xast-fixtures-v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FixtureStatus {
    Active,
    Xfail,
}

/// One golden fixture directory: `index.xml` plus the expected `index.json`.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub name: String,
    pub status: FixtureStatus,
    pub reason: Option<String>,
    pub dir: PathBuf,
}

impl Fixture {
    pub fn input(&self) -> Vec<u8> {
        let path = self.dir.join("index.xml");
        fs::read(&path).unwrap_or_else(|err| panic!("failed to read fixture input {path:?}: {err}"))
    }

    pub fn expected(&self) -> serde_json::Value {
        let path = self.dir.join("index.json");
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("failed to read fixture output {path:?}: {err}"));
        serde_json::from_str(&content)
            .unwrap_or_else(|err| panic!("failed to parse fixture output {path:?}: {err}"))
    }
}

#[derive(Clone, Debug, Deserialize)]
struct FixtureManifest {
    format: String,
    fixtures: Vec<FixtureEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct FixtureEntry {
    name: String,
    status: FixtureEntryStatus,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum FixtureEntryStatus {
    Active,
    Xfail,
}

/// Load and validate `fixtures.toml` under `root`.
pub fn load_fixtures(root: &Path) -> Vec<Fixture> {
    let manifest_path = root.join("fixtures.toml");
    let manifest: FixtureManifest = {
        let content = fs::read_to_string(&manifest_path).unwrap_or_else(|err| {
            panic!("failed to read fixture manifest {manifest_path:?}: {err}")
        });
        toml::from_str(&content).unwrap_or_else(|err| {
            panic!("failed to parse fixture manifest {manifest_path:?}: {err}")
        })
    };
    assert_eq!(
        manifest.format, FIXTURES_FORMAT_V1,
        "unsupported fixture manifest format in {manifest_path:?}"
    );

    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(manifest.fixtures.len());
    for entry in manifest.fixtures {
        assert!(
            seen.insert(entry.name.clone()),
            "duplicate fixture '{}' in {manifest_path:?}",
            entry.name
        );
        let dir = root.join(&entry.name);
        assert!(dir.is_dir(), "fixture directory {dir:?} is missing");
        let status = match entry.status {
            FixtureEntryStatus::Active => FixtureStatus::Active,
            FixtureEntryStatus::Xfail => FixtureStatus::Xfail,
        };
        if status == FixtureStatus::Xfail {
            assert!(
                entry.reason.as_deref().is_some_and(|reason| !reason.trim().is_empty()),
                "xfail fixture '{}' needs a reason",
                entry.name
            );
        }
        out.push(Fixture {
            name: entry.name,
            status,
            reason: entry.reason,
            dir,
        });
    }
    out
}

/// Pretty-printed JSON, one line per entry, for line diffs.
pub fn json_lines(value: &serde_json::Value) -> Vec<String> {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|err| panic!("failed to render JSON: {err}"))
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;

    let missing = "<missing>";
    let line = |lines: &[String], index: usize| -> String {
        lines.get(index).map_or(missing, String::as_str).to_string()
    };
    let max = expected.len().max(actual.len());
    let mismatch = (0..max).find(|&index| line(expected, index) != line(actual, index));

    let mut out = String::new();
    match mismatch {
        Some(first) => {
            let start = first.saturating_sub(2);
            let end = (first + 3).min(max);
            let _ = writeln!(
                &mut out,
                "first mismatch at line {} (showing {}..={}):",
                first + 1,
                start + 1,
                end
            );
            for index in start..end {
                let marker = if index == first { ">" } else { " " };
                let _ = writeln!(
                    &mut out,
                    "{marker} {:>4}  expected: {}",
                    index + 1,
                    line(expected, index)
                );
                let _ = writeln!(
                    &mut out,
                    "{marker} {:>4}    actual: {}",
                    index + 1,
                    line(actual, index)
                );
            }
        }
        None if expected.len() != actual.len() => {
            let _ = writeln!(&mut out, "prefix matched but lengths differ");
        }
        None => {}
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}
