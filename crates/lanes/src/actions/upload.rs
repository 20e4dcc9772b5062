//! App store upload options

use lanes_core::{Action, ConfigItem, ConflictResolution, DataType, Result};

use super::existing_file;

/// Upload a binary and its metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadAction;

impl Action for UploadAction {
    fn name(&self) -> &str {
        "upload"
    }

    fn description(&self) -> &str {
        "Upload a build and its metadata to the app store"
    }

    fn available_options(&self) -> Result<Vec<ConfigItem>> {
        Ok(vec![
            ConfigItem::builder("api_key_path")
                .env_name("UPLOAD_API_KEY_PATH")
                .description("Path to your App Store Connect API key JSON file")
                .optional(true)
                .verify(|value| existing_file(value, &["json"]))
                .build()?,
            ConfigItem::builder("api_key")
                .env_name("UPLOAD_API_KEY")
                .description("Your App Store Connect API key information as a JSON object")
                .data_type(DataType::Map)
                .optional(true)
                .sensitive(true)
                .conflicting_options(["api_key_path"])
                .conflict_resolver(|current, other| {
                    tracing::warn!(
                        key = current.key(),
                        ignored = other.key(),
                        "both API key options given, using the inline key"
                    );
                    Ok(ConflictResolution::KeepCurrent)
                })
                .build()?,
            ConfigItem::builder("ipa")
                .short_option("-i")
                .env_name("UPLOAD_IPA")
                .description("Path to your ipa file")
                .optional(true)
                .conflicting_options(["pkg"])
                .conflict_resolver(|current, other| {
                    Err(format!(
                        "You can't use '{}' and '{}' options in one run",
                        current.key(),
                        other.key()
                    ))
                })
                .verify(|value| existing_file(value, &["ipa"]))
                .build()?,
            ConfigItem::builder("pkg")
                .short_option("-c")
                .env_name("UPLOAD_PKG")
                .description("Path to your pkg file")
                .optional(true)
                .conflicting_options(["ipa"])
                .verify(|value| existing_file(value, &["pkg"]))
                .build()?,
            ConfigItem::builder("skip_metadata")
                .env_name("UPLOAD_SKIP_METADATA")
                .description("Don't upload the metadata (e.g. title, description)")
                .data_type(DataType::Boolean)
                .default_value(false)
                .build()?,
            ConfigItem::builder("languages")
                .env_name("UPLOAD_LANGUAGES")
                .description("Metadata languages to upload, comma separated (e.g. 'en-US,de-DE')")
                .data_type(DataType::Array)
                .optional(true)
                .build()?,
            ConfigItem::builder("submission_information")
                .env_name("UPLOAD_SUBMISSION_INFORMATION")
                .description("Extra information for the submission (e.g. compliance specifications, IDFA settings)")
                .data_type(DataType::Map)
                .optional(true)
                .display_in_shell(false)
                .build()?,
            ConfigItem::builder("build_args")
                .env_name("UPLOAD_BUILD_ARGS")
                .description("Extra arguments passed to the upload tool")
                .data_type(DataType::ShellString)
                .optional(true)
                .build()?,
            ConfigItem::builder("itc_provider")
                .env_name("UPLOAD_ITC_PROVIDER")
                .description("The provider short name to be used with the upload tool")
                .deprecated("Use `api_key` instead")
                .build()?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lanes_core::{
        parse_action_options, ConfigError, Inputs, MapEnv, ResolutionContext, Value, ValueSource,
    };
    use tempfile::TempDir;

    fn context() -> ResolutionContext {
        ResolutionContext {
            env: Arc::new(MapEnv::new()),
            ..ResolutionContext::non_interactive()
        }
    }

    fn touch(dir: &TempDir, name: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, b"{}").unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_ipa_and_pkg_cannot_be_combined() {
        let temp = TempDir::new().unwrap();
        let inputs = Inputs::new()
            .with("ipa", touch(&temp, "App.ipa"))
            .with("pkg", touch(&temp, "App.pkg"));

        let err = parse_action_options(&UploadAction, inputs, context()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref key, .. } if key == "ipa"));
        assert!(err.to_string().contains("in one run"));
    }

    #[test]
    fn test_inline_api_key_wins_over_path() {
        let temp = TempDir::new().unwrap();
        let inputs = Inputs::new()
            .with("api_key_path", touch(&temp, "key.json"))
            .with("api_key", r#"{"key_id": "D383SF739", "issuer_id": "6053b7fe"}"#);

        let config = parse_action_options(&UploadAction, inputs, context()).unwrap();
        assert_eq!(config.get("api_key_path").unwrap(), None);
        let api_key = config.get("api_key").unwrap().and_then(Value::as_map).unwrap();
        assert_eq!(api_key.get("key_id"), Some(&Value::from("D383SF739")));
        assert_eq!(config.source("api_key"), Some(ValueSource::Explicit));
    }

    #[test]
    fn test_build_args_are_shell_escaped() {
        let inputs = Inputs::new().with("build_args", vec!["--verbose", "My App.ipa"]);
        let config = parse_action_options(&UploadAction, inputs, context()).unwrap();
        assert_eq!(
            config.string("build_args").unwrap(),
            Some("--verbose 'My App.ipa'")
        );
    }

    #[test]
    fn test_languages_from_comma_list() {
        let inputs = Inputs::new().with("languages", "en-US,de-DE");
        let config = parse_action_options(&UploadAction, inputs, context()).unwrap();
        assert_eq!(config.array("languages").unwrap().map(<[Value]>::len), Some(2));
    }

    #[test]
    fn test_deprecated_option_is_optional() {
        let items = UploadAction.available_options().unwrap();
        let provider = items.iter().find(|i| i.key() == "itc_provider").unwrap();
        assert!(provider.optional());
        assert!(provider
            .description()
            .unwrap()
            .starts_with("**DEPRECATED!** Use `api_key` instead"));
    }
}
