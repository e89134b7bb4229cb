// tests/site_config.rs
use deutsch_daily::config::site::{DEFAULT_SHEET_ID, DEFAULT_SHEET_NAME};
use deutsch_daily::config::{SiteConfig, TutorConfig};
use std::{env, fs};

const SITE_ENV: &[&str] = &[
    "SITE_CONFIG_PATH",
    "GOOGLE_SHEET_ID",
    "VITE_GOOGLE_SHEET_ID",
    "GOOGLE_API_KEY",
    "VITE_GOOGLE_API_KEY",
    "SHEET_NAME",
    "PODCAST_API_URL",
];

fn clear_site_env() {
    for k in SITE_ENV {
        env::remove_var(k);
    }
}

#[serial_test::serial]
#[test]
fn explicit_path_in_either_format() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("site.toml");
    fs::write(&p_toml, "sheetId = \"t-1\"\nsheetName = \"Artikel\"\n").unwrap();

    let p_json = dir.path().join("site.json");
    fs::write(&p_json, r#"{"sheetId":"j-1","apiKey":"k"}"#).unwrap();

    clear_site_env();

    let t = SiteConfig::load_from(&p_toml).unwrap();
    assert_eq!(t.sheet_id, "t-1");
    assert_eq!(t.sheet_name, "Artikel");
    assert_eq!(t.api_key, None);

    let j = SiteConfig::load_from(&p_json).unwrap();
    assert_eq!(j.sheet_id, "j-1");
    assert_eq!(j.api_key.as_deref(), Some("k"));
    assert_eq!(j.sheet_name, DEFAULT_SHEET_NAME);
}

#[serial_test::serial]
#[test]
fn default_uses_env_path_then_fallbacks_then_overrides() {
    // Isolate CWD so the repo's own config/ is not read.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_site_env();

    // 1) nothing on disk -> defaults
    let d = SiteConfig::load_default().unwrap();
    assert_eq!(d, SiteConfig::default());
    assert_eq!(d.sheet_id, DEFAULT_SHEET_ID);

    // 2) ./config/site.json
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("site.json"), r#"{"sheetId":"from-json"}"#).unwrap();
    assert_eq!(SiteConfig::load_default().unwrap().sheet_id, "from-json");

    // 3) ./config/site.toml wins over json
    fs::write(cfg_dir.join("site.toml"), r#"sheetId = "from-toml""#).unwrap();
    assert_eq!(SiteConfig::load_default().unwrap().sheet_id, "from-toml");

    // 4) SITE_CONFIG_PATH wins over both
    let p_env = tmp.path().join("elsewhere.json");
    fs::write(&p_env, r#"{"sheetId":"from-env-path","sheetName":"Blatt"}"#).unwrap();
    env::set_var("SITE_CONFIG_PATH", p_env.display().to_string());
    let e = SiteConfig::load_default().unwrap();
    assert_eq!(e.sheet_id, "from-env-path");
    assert_eq!(e.sheet_name, "Blatt");

    // 5) env vars override file values; GOOGLE_* before VITE_*
    env::set_var("VITE_GOOGLE_SHEET_ID", "vite-id");
    assert_eq!(SiteConfig::load_default().unwrap().sheet_id, "vite-id");
    env::set_var("GOOGLE_SHEET_ID", "google-id");
    env::set_var("VITE_GOOGLE_API_KEY", "vite-key");
    env::set_var("PODCAST_API_URL", "http://127.0.0.1:9/podcast");
    let o = SiteConfig::load_default().unwrap();
    assert_eq!(o.sheet_id, "google-id");
    assert_eq!(o.api_key.as_deref(), Some("vite-key"));
    assert_eq!(o.podcast_api_url, "http://127.0.0.1:9/podcast");

    // 6) a dangling SITE_CONFIG_PATH is an error
    env::set_var("SITE_CONFIG_PATH", tmp.path().join("missing.toml").display().to_string());
    assert!(SiteConfig::load_default().is_err());

    clear_site_env();
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn tutor_config_file_and_env_key() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var("GEMINI_API_KEY");
    env::remove_var("GEMINI_MODEL");

    // no file, no key -> local only
    let d = TutorConfig::load_default().unwrap();
    assert!(!d.is_active());

    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("tutor.json"),
        r#"{"provider":"Gemini","api_key":"ENV","model":"gemini-1.5-flash"}"#,
    )
    .unwrap();
    env::set_var("GEMINI_API_KEY", "secret");
    let c = TutorConfig::load_default().unwrap();
    assert!(c.is_active());
    assert_eq!(c.provider, "gemini");
    assert_eq!(c.api_key, "secret");
    assert_eq!(c.model, "gemini-1.5-flash");

    env::remove_var("GEMINI_API_KEY");
    env::set_current_dir(&old).unwrap();
}
