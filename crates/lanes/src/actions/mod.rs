//! Built-in actions

mod cert;
mod upload;

use std::path::Path;

use lanes_core::{ActionRegistry, Value};

pub use cert::CertAction;
pub use upload::UploadAction;

/// Registry with every built-in action
pub fn registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register(CertAction);
    registry.register(UploadAction);
    registry
}

/// Verify block for paths that must exist and carry one of `extensions`
fn existing_file(value: &Value, extensions: &[&str]) -> Result<(), String> {
    let Some(path) = value.as_str() else {
        return Ok(());
    };
    let path = Path::new(path);
    if !path.is_file() {
        return Err(format!("Could not find file at path '{}'", path.display()));
    }
    if !extensions.is_empty()
        && !path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e))
    {
        return Err(format!(
            "'{}' must be a {} file",
            path.display(),
            extensions.join(" or ")
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_registry_has_builtin_actions() {
        let registry = registry();
        assert_eq!(registry.names(), vec!["cert".to_string(), "upload".to_string()]);
        for action in registry.all() {
            assert!(action.available_options().is_ok(), "{}", action.name());
        }
    }

    #[test]
    fn test_existing_file() {
        let temp = TempDir::new().unwrap();
        let ipa = temp.path().join("App.ipa");
        std::fs::write(&ipa, b"").unwrap();
        let ipa = ipa.to_string_lossy().to_string();

        assert!(existing_file(&Value::from(ipa.as_str()), &["ipa"]).is_ok());
        assert!(existing_file(&Value::from(ipa.as_str()), &["pkg"]).is_err());
        assert!(existing_file(&Value::from("/nonexistent/App.ipa"), &["ipa"]).is_err());
    }
}
