use std::path::Path;

use ini::{EscapePolicy, Ini, ParseOption};
use tracing::debug;

use crate::{error::SeamlessError, model::Patch};

/// Values are kept exactly as written, no quote or escape handling
fn parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    }
}

/// Load an INI document from disk
///
/// # Errors
/// * `SeamlessError::LoadSettings` if the file can't be read
/// * `SeamlessError::Parse` if it isn't valid INI
pub fn load(path: impl AsRef<Path>) -> Result<Ini, SeamlessError> {
    let path = path.as_ref();
    Ini::load_from_file_opt(path, parse_option()).map_err(|e| match e {
        ini::Error::Io(source) => SeamlessError::LoadSettings {
            path: path.to_path_buf(),
            source,
        },
        ini::Error::Parse(e) => SeamlessError::Parse(e),
    })
}

/// Write the whole document to `path`, replacing whatever was there
pub fn save(doc: &Ini, path: impl AsRef<Path>) -> Result<(), SeamlessError> {
    let path = path.as_ref();
    doc.write_to_file_policy(path, EscapePolicy::Nothing)
        .map_err(|source| SeamlessError::SaveSettings {
            path: path.to_path_buf(),
            source,
        })
}

/// Values are written unescaped, so anything that would end the line early is refused
///
/// # Errors
/// * `SeamlessError::InvalidValue` if `value` contains a control character
pub fn check_value(key: &str, value: &str) -> Result<(), SeamlessError> {
    if value.chars().any(|c| c.is_control() && c != '\t') {
        return Err(SeamlessError::InvalidValue { key: key.into() });
    }
    Ok(())
}

/// Set `key` in `section`, creating either if they're missing
///
/// Every other section and key is left as it was.
pub fn set_value(doc: &mut Ini, section: &str, key: &str, value: &str) -> Patch {
    let patch = match doc.get_from(Some(section), key) {
        None => Patch::Created,
        Some(old) if old == value => Patch::Unchanged,
        Some(_) => Patch::Updated,
    };
    doc.with_section(Some(section)).set(key, value);

    patch
}

/// Load the document at `path`, set `[section] key = value`, and write it back
pub fn patch_config(
    path: impl AsRef<Path>,
    section: &str,
    key: &str,
    value: &str,
) -> Result<Patch, SeamlessError> {
    let path = path.as_ref();
    check_value(key, value)?;
    let mut doc = load(path)?;
    let patch = set_value(&mut doc, section, key, value);
    debug!("{:?} [{}] {} in {}", patch, section, key, path.display());
    save(&doc, path)?;

    Ok(patch)
}

#[cfg(test)]
mod test {
    use std::fs;

    use ini::Ini;

    use crate::{error::SeamlessError, model::Patch};

    use super::{load, parse_option, patch_config, set_value};

    fn parse(raw: &str) -> Result<Ini, ini::ParseError> {
        Ini::load_from_str_opt(raw, parse_option())
    }

    const SETTINGS: &str = "\
[GAMEPLAY]
allow_invaders = 1
death_debuffs = 1

[SCALING]
enemy_health_scaling = 35

[PASSWORD]
cooppassword = old

[LANGUAGE]
mod_language_override =
";

    fn props(doc: &Ini, section: &str) -> Vec<(String, String)> {
        doc.section(Some(section))
            .map(|p| {
                p.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn sections(doc: &Ini) -> Vec<String> {
        doc.sections().flatten().map(String::from).collect()
    }

    #[test]
    fn adds_missing_section() {
        let mut doc = parse("[OTHER]\nfoo=bar\n").expect("parse");

        let patch = set_value(&mut doc, "PASSWORD", "cooppassword", "hunter2");

        assert_eq!(patch, Patch::Created);
        assert_eq!(sections(&doc), vec!["OTHER", "PASSWORD"]);
        assert_eq!(doc.get_from(Some("PASSWORD"), "cooppassword"), Some("hunter2"));
        assert_eq!(props(&doc, "OTHER"), vec![("foo".into(), "bar".into())]);
    }

    #[test]
    fn adds_missing_key() {
        let mut doc = parse("[PASSWORD]\nother=1\n").expect("parse");

        let patch = set_value(&mut doc, "PASSWORD", "cooppassword", "hunter2");

        assert_eq!(patch, Patch::Created);
        assert_eq!(
            props(&doc, "PASSWORD"),
            vec![
                ("other".into(), "1".into()),
                ("cooppassword".into(), "hunter2".into())
            ]
        );
    }

    #[test]
    fn overwrites_existing_key() {
        let mut doc = parse(SETTINGS).expect("parse");
        let before = sections(&doc)
            .into_iter()
            .filter(|s| s != "PASSWORD")
            .map(|s| (props(&doc, &s), s))
            .collect::<Vec<_>>();

        let patch = set_value(&mut doc, "PASSWORD", "cooppassword", "new");

        assert_eq!(patch, Patch::Updated);
        assert_eq!(props(&doc, "PASSWORD"), vec![("cooppassword".into(), "new".into())]);
        for (p, s) in before {
            assert_eq!(props(&doc, &s), p, "section {s} changed");
        }
        assert_eq!(
            sections(&doc),
            vec!["GAMEPLAY", "SCALING", "PASSWORD", "LANGUAGE"]
        );
    }

    #[test]
    fn same_value_is_unchanged() {
        let mut doc = parse("[PASSWORD]\ncooppassword=hunter2\n").expect("parse");

        assert_eq!(
            set_value(&mut doc, "PASSWORD", "cooppassword", "hunter2"),
            Patch::Unchanged
        );
    }

    #[test]
    fn patch_is_idempotent() {
        let dir = tempfile::tempdir().expect("temp dir");
        let once = dir.path().join("once.ini");
        let twice = dir.path().join("twice.ini");
        fs::write(&once, SETTINGS).expect("write");
        fs::write(&twice, SETTINGS).expect("write");

        patch_config(&once, "PASSWORD", "cooppassword", "hunter2").expect("patch");
        patch_config(&twice, "PASSWORD", "cooppassword", "hunter2").expect("patch");
        let second = patch_config(&twice, "PASSWORD", "cooppassword", "hunter2").expect("patch");

        assert_eq!(second, Patch::Unchanged);
        assert_eq!(
            fs::read_to_string(&once).expect("read"),
            fs::read_to_string(&twice).expect("read")
        );
    }

    #[test]
    fn values_are_written_verbatim() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ersc_settings.ini");
        fs::write(&path, "[OTHER]\nfoo=bar\n").expect("write");

        patch_config(&path, "PASSWORD", "cooppassword", r#"a\b"c""#).expect("patch");

        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains(r#"cooppassword=a\b"c""#), "{raw}");
        let doc = load(&path).expect("reload");
        assert_eq!(
            doc.get_from(Some("PASSWORD"), "cooppassword"),
            Some(r#"a\b"c""#)
        );
    }

    #[test]
    fn exactly_one_password_section() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ersc_settings.ini");
        fs::write(&path, "[OTHER]\nfoo=bar\n").expect("write");

        patch_config(&path, "PASSWORD", "cooppassword", "hunter2").expect("patch");

        let doc = load(&path).expect("reload");
        assert_eq!(
            doc.sections().filter(|s| *s == Some("PASSWORD")).count(),
            1
        );
        assert_eq!(props(&doc, "OTHER"), vec![("foo".into(), "bar".into())]);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let res = patch_config(dir.path().join("nope.ini"), "PASSWORD", "cooppassword", "x");

        match res {
            Err(e @ SeamlessError::LoadSettings { .. }) => {
                let msg = e.to_string();
                assert!(msg.starts_with("Error loading INI file"), "{msg}");
                assert!(msg.contains("nope.ini"), "{msg}");
            }
            other => panic!("expected LoadSettings error, got {other:?}"),
        }
    }

    #[test]
    fn line_breaks_are_refused() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ersc_settings.ini");
        fs::write(&path, "[OTHER]\nfoo=bar\n").expect("write");

        for value in ["a\nb", "a\rb", "a\0b"] {
            let res = patch_config(&path, "PASSWORD", "cooppassword", value);
            assert!(
                matches!(&res, Err(SeamlessError::InvalidValue { key }) if key == "cooppassword"),
                "{value:?} gave {res:?}"
            );
        }

        assert_eq!(fs::read_to_string(&path).expect("read"), "[OTHER]\nfoo=bar\n");
        assert!(load(&path).is_ok());
    }

    #[test]
    fn save_failure_is_labelled() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("ersc_settings.ini");
        fs::write(&path, "[OTHER]\nfoo=bar\n").expect("write");
        let doc = load(&path).expect("load");

        let target = dir.path().join("settings_dir");
        fs::create_dir(&target).expect("create dir");

        match super::save(&doc, &target) {
            Err(e @ SeamlessError::SaveSettings { .. }) => {
                assert!(e.to_string().starts_with("Error saving INI file"), "{e}");
            }
            other => panic!("expected SaveSettings error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("broken.ini");
        fs::write(&path, "[PASSWORD\ncooppassword=x\n").expect("write");

        let res = patch_config(&path, "PASSWORD", "cooppassword", "y");

        assert!(matches!(res, Err(SeamlessError::Parse(_))));
        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "[PASSWORD\ncooppassword=x\n"
        );
    }
}
