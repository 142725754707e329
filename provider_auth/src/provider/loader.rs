use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::provider::{ProviderConfig, ProviderError};

const PROVIDERS_STEM: &str = "providers";
const LOCAL_INFIX: &str = "local";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Base,
    Environment,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Format {
    Json,
    Toml,
}

#[derive(Debug)]
struct ProviderFile {
    tier: Tier,
    format: Format,
    path: PathBuf,
}

/// Per-provider outcome of loading; a malformed entry only fails itself.
pub type LoadedProviders = BTreeMap<String, Result<ProviderConfig, ProviderError>>;

/// Load and merge every providers file found in `dir`.
///
/// Unreadable or unparsable files fail the whole load. An entry that does not
/// deserialize into a `ProviderConfig` is returned as its own error.
///
/// Recognized names are `providers.<ext>`, `providers.<env>.<ext>` and
/// `providers.local.<ext>` (a `-` separator is accepted too) with `json` or
/// `toml` extensions. Files apply in the order base, environment, local;
/// within a tier JSON comes before TOML. Later files win in a deep merge.
pub fn load_provider_configs(
    dir: &Path,
    environment: Option<&str>,
) -> Result<LoadedProviders, ProviderError> {
    if !dir.is_dir() {
        return Err(ProviderError::configuration(
            PROVIDERS_STEM,
            format!("{} is not a directory", dir.display()),
        ));
    }

    let mut files = Vec::new();
    let entries = fs::read_dir(dir).map_err(|e| ProviderError::Io(e.to_string()))?;
    for entry in entries {
        let entry = entry.map_err(|e| ProviderError::Io(e.to_string()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some((tier, format)) = classify(file_name, environment) {
            files.push(ProviderFile { tier, format, path });
        }
    }
    files.sort_by(|a, b| (a.tier, a.format).cmp(&(b.tier, b.format)));

    let mut merged = Value::Object(Map::new());
    for file in &files {
        tracing::debug!("Loading provider definitions from {}", file.path.display());
        let value = read_file(file)?;
        deep_merge(&mut merged, value);
    }

    let Value::Object(providers) = merged else {
        return Ok(BTreeMap::new());
    };

    Ok(providers
        .into_iter()
        .map(|(name, value)| {
            let config = serde_json::from_value::<ProviderConfig>(value)
                .map_err(|e| ProviderError::configuration(&name, e.to_string()));
            (name, config)
        })
        .collect())
}

fn classify(file_name: &str, environment: Option<&str>) -> Option<(Tier, Format)> {
    let (stem, format) = if let Some(stem) = file_name.strip_suffix(".json") {
        (stem, Format::Json)
    } else if let Some(stem) = file_name.strip_suffix(".toml") {
        (stem, Format::Toml)
    } else {
        return None;
    };

    let rest = stem.strip_prefix(PROVIDERS_STEM)?;
    if rest.is_empty() {
        return Some((Tier::Base, format));
    }

    let infix = rest.strip_prefix('.').or_else(|| rest.strip_prefix('-'))?;
    if infix == LOCAL_INFIX {
        Some((Tier::Local, format))
    } else if environment.is_some_and(|env| env == infix) {
        Some((Tier::Environment, format))
    } else {
        None
    }
}

fn read_file(file: &ProviderFile) -> Result<Value, ProviderError> {
    let display = file.path.display().to_string();
    let contents = fs::read_to_string(&file.path).map_err(|e| ProviderError::Io(e.to_string()))?;

    let value = match file.format {
        Format::Json => serde_json::from_str::<Value>(&contents).map_err(|e| ProviderError::Parse {
            file: display.clone(),
            message: e.to_string(),
        })?,
        Format::Toml => {
            let table = toml::from_str::<toml::Table>(&contents).map_err(|e| ProviderError::Parse {
                file: display.clone(),
                message: e.to_string(),
            })?;
            serde_json::to_value(table).map_err(|e| ProviderError::Parse {
                file: display.clone(),
                message: e.to_string(),
            })?
        }
    };

    if !value.is_object() {
        return Err(ProviderError::Parse {
            file: display,
            message: "top level must be an object keyed by provider name".to_string(),
        });
    }
    Ok(value)
}

fn deep_merge(target: &mut Value, overlay: Value) {
    match overlay {
        Value::Object(overlay) => {
            if let Value::Object(target) = target {
                for (key, value) in overlay {
                    match target.get_mut(&key) {
                        Some(existing) => deep_merge(existing, value),
                        None => {
                            target.insert(key, value);
                        }
                    }
                }
            } else {
                *target = Value::Object(overlay);
            }
        }
        other => *target = other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        let mut file = File::create(dir.path().join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("providers.json", None), Some((Tier::Base, Format::Json)));
        assert_eq!(classify("providers.toml", None), Some((Tier::Base, Format::Toml)));
        assert_eq!(
            classify("providers.local.json", None),
            Some((Tier::Local, Format::Json))
        );
        assert_eq!(
            classify("providers-production.toml", Some("production")),
            Some((Tier::Environment, Format::Toml))
        );
        assert_eq!(classify("providers.staging.json", Some("production")), None);
        assert_eq!(classify("providersx.json", None), None);
        assert_eq!(classify("providers.yaml", None), None);
        assert_eq!(classify("other.json", None), None);
    }

    #[test]
    fn test_merge_order_and_precedence() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir,
            "providers.json",
            r#"{"github": {"module": "gh", "clientID": "base", "scope": ["email"]}}"#,
        );
        write(
            &dir,
            "providers.toml",
            "[github]\nclientSecret = \"from-toml\"\n\n[ldap]\nmodule = \"ldap\"\n",
        );
        write(
            &dir,
            "providers.production.json",
            r#"{"github": {"clientID": "prod"}}"#,
        );
        write(
            &dir,
            "providers.local.json",
            r#"{"github": {"clientID": "local"}}"#,
        );
        write(
            &dir,
            "providers.staging.json",
            r#"{"github": {"clientID": "staging"}}"#,
        );

        let configs = load_provider_configs(dir.path(), Some("production")).unwrap();
        assert_eq!(configs.len(), 2);

        let github = configs["github"].as_ref().unwrap();
        assert_eq!(github.module.as_deref(), Some("gh"));
        assert_eq!(github.extra.get("clientID"), Some(&json!("local")));
        assert_eq!(github.extra.get("clientSecret"), Some(&json!("from-toml")));
        assert_eq!(github.extra.get("scope"), Some(&json!(["email"])));
        assert_eq!(
            configs["ldap"].as_ref().unwrap().module.as_deref(),
            Some("ldap")
        );
    }

    #[test]
    fn test_environment_overrides_skipped_without_env() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "providers.json", r#"{"github": {"clientID": "base"}}"#);
        write(&dir, "providers.production.json", r#"{"github": {"clientID": "prod"}}"#);

        let configs = load_provider_configs(dir.path(), None).unwrap();
        let github = configs["github"].as_ref().unwrap();
        assert_eq!(github.extra.get("clientID"), Some(&json!("base")));
    }

    #[test]
    fn test_missing_directory_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = load_provider_configs(&missing, None).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration { .. }));
    }

    #[test]
    fn test_invalid_json_reports_file() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "providers.json", "{not json");
        let err = load_provider_configs(dir.path(), None).unwrap_err();
        match err {
            ProviderError::Parse { file, .. } => assert!(file.ends_with("providers.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_entry_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir,
            "providers.json",
            r#"{"github": {"module": "gh"}, "broken": {"module": "gh", "link": "yes"}}"#,
        );

        let configs = load_provider_configs(dir.path(), None).unwrap();
        assert!(configs["github"].is_ok());
        match &configs["broken"] {
            Err(ProviderError::Configuration { provider, .. }) => assert_eq!(provider, "broken"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_directory_yields_no_providers() {
        let dir = tempfile::tempdir().unwrap();
        let configs = load_provider_configs(dir.path(), None).unwrap();
        assert!(configs.is_empty());
    }
}
