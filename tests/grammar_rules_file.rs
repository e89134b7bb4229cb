// tests/grammar_rules_file.rs
use deutsch_daily::feedback::rules::ENV_RULES_PATH;
use deutsch_daily::feedback::GrammarRules;
use std::{env, fs};

const BUILTIN_RULES: usize = 9;

#[serial_test::serial]
#[test]
fn rules_file_replaces_builtin_table() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("rules.json");
    fs::write(
        &p,
        r#"{"rules":[{"pattern":"\\bich\\s+bin\\s+gelauft\\b","original":"ich bin gelauft","corrected":"ich bin gelaufen","explanation":"Starkes Verb: gelaufen."}]}"#,
    )
    .unwrap();
    env::set_var(ENV_RULES_PATH, p.display().to_string());

    let rules = GrammarRules::load_default();
    env::remove_var(ENV_RULES_PATH);

    assert_eq!(rules.len(), 1);
    let c = rules.extract_corrections("Gestern ICH BIN GELAUFT.");
    assert_eq!(c[0].corrected, "ich bin gelaufen");
    // built-in rules are gone
    assert!(rules.extract_corrections("ich habe gegangen").is_empty());
}

#[serial_test::serial]
#[test]
fn broken_rules_file_falls_back_to_builtin() {
    let dir = tempfile::tempdir().unwrap();

    let bad_json = dir.path().join("bad.json");
    fs::write(&bad_json, "{ \"rules\": [ oops").unwrap();
    env::set_var(ENV_RULES_PATH, bad_json.display().to_string());
    assert_eq!(GrammarRules::load_default().len(), BUILTIN_RULES);

    // valid JSON, but a pattern that does not compile
    let bad_regex = dir.path().join("bad_regex.json");
    fs::write(
        &bad_regex,
        r#"{"rules":[{"pattern":"(unclosed","original":"a","corrected":"b","explanation":"c"}]}"#,
    )
    .unwrap();
    env::set_var(ENV_RULES_PATH, bad_regex.display().to_string());
    assert_eq!(GrammarRules::load_default().len(), BUILTIN_RULES);

    env::remove_var(ENV_RULES_PATH);
}

#[serial_test::serial]
#[test]
fn missing_rules_file_falls_back_to_builtin() {
    let dir = tempfile::tempdir().unwrap();
    env::set_var(
        ENV_RULES_PATH,
        dir.path().join("nope.json").display().to_string(),
    );
    let rules = GrammarRules::load_default();
    env::remove_var(ENV_RULES_PATH);

    assert_eq!(rules.len(), BUILTIN_RULES);
    assert_eq!(
        rules.extract_corrections("ich habe gegangen")[0].corrected,
        "ich bin gegangen"
    );
}
