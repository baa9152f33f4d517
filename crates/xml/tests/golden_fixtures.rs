use std::path::PathBuf;
use xml::invariants::check_tree;
use xml::transform;
use xml_test_support::{Fixture, FixtureStatus, diff_lines, json_lines, load_fixtures};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn run_fixture(fixture: &Fixture) -> Result<(), String> {
    let root = transform(&fixture.input()).map_err(|err| format!("transform failed: {err}"))?;
    check_tree(&root).map_err(|violation| violation.to_string())?;
    let actual = serde_json::to_value(&root).map_err(|err| format!("serialize failed: {err}"))?;
    let expected = fixture.expected();
    if actual == expected {
        return Ok(());
    }
    Err(diff_lines(&json_lines(&expected), &json_lines(&actual)))
}

#[test]
fn golden_fixtures_match_expected_trees() {
    let fixtures = load_fixtures(&fixtures_root());
    assert!(!fixtures.is_empty(), "fixture manifest lists no fixtures");

    let mut failures = Vec::new();
    for fixture in &fixtures {
        match (fixture.status, run_fixture(fixture)) {
            (FixtureStatus::Active, Ok(())) | (FixtureStatus::Xfail, Err(_)) => {}
            (FixtureStatus::Active, Err(diff)) => {
                failures.push(format!("{}:\n{diff}", fixture.name));
            }
            (FixtureStatus::Xfail, Ok(())) => failures.push(format!(
                "{}: marked xfail ({}) but passed; mark it active",
                fixture.name,
                fixture.reason.as_deref().unwrap_or_default()
            )),
        }
    }

    assert!(
        failures.is_empty(),
        "{} golden fixture(s) failed:\n{}",
        failures.len(),
        failures.join("\n")
    );
}
