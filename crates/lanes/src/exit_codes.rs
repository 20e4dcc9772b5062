//! Exit codes for the CLI

use lanes_core::ConfigError;

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Validation error
pub const VALIDATION_ERROR: i32 = 5;

/// User cancelled
pub const CANCELLED: i32 = 130;

/// Pick the exit code for a failed command
pub fn for_error(err: &anyhow::Error) -> i32 {
    let Some(config_err) = err.downcast_ref::<ConfigError>() else {
        return ERROR;
    };

    match config_err {
        e if e.is_cancelled() => CANCELLED,
        ConfigError::OptionsFile { .. }
        | ConfigError::Io { .. }
        | ConfigError::Yaml(_)
        | ConfigError::Toml(_)
        | ConfigError::Json(_) => CONFIG_ERROR,
        e if !e.is_user_error() => CONFIG_ERROR,
        _ => VALIDATION_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanes_core::PromptError;

    #[test]
    fn test_exit_code_by_error_class() {
        let code = |e: ConfigError| for_error(&anyhow::Error::from(e));

        assert_eq!(code(ConfigError::Prompt(PromptError::Cancelled)), CANCELLED);
        assert_eq!(code(ConfigError::validation("username", "bad")), VALIDATION_ERROR);
        assert_eq!(code(ConfigError::descriptor("Bad", "bad key")), CONFIG_ERROR);
        assert_eq!(
            code(ConfigError::OptionsFile {
                path: "Certfile.yml".into(),
                message: "bad".to_string(),
            }),
            CONFIG_ERROR
        );
        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }
}
