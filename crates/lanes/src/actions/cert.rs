//! Signing certificate options

use lanes_core::{Action, ConfigItem, DataType, Result, Value};

const PLATFORMS: [&str; 3] = ["ios", "macos", "tvos"];

/// Create or fetch a signing certificate
#[derive(Debug, Clone, Copy, Default)]
pub struct CertAction;

impl Action for CertAction {
    fn name(&self) -> &str {
        "cert"
    }

    fn description(&self) -> &str {
        "Create a new code signing certificate or reuse an existing one"
    }

    fn available_options(&self) -> Result<Vec<ConfigItem>> {
        Ok(vec![
            ConfigItem::builder("username")
                .short_option("-u")
                .env_name("CERT_USERNAME")
                .description("Your Apple ID username")
                .default_value_dynamic(|env| env.var("LANES_USER").map(Value::from))
                .build()?,
            ConfigItem::builder("team_id")
                .short_option("-b")
                .env_name("CERT_TEAM_ID")
                .description("The ID of your Developer Portal team if you're in multiple teams")
                .optional(true)
                .code_gen_sensitive(true)
                .verify(|value| match value.as_str() {
                    Some(id) if !id.chars().all(|c| c.is_ascii_alphanumeric()) => {
                        Err(format!("Team ID '{}' must only contain letters and digits", id))
                    }
                    _ => Ok(()),
                })
                .build()?,
            ConfigItem::builder("development")
                .short_option("-d")
                .env_name("CERT_DEVELOPMENT")
                .description("Create a development certificate instead of a distribution one")
                .data_type(DataType::Boolean)
                .default_value(false)
                .build()?,
            ConfigItem::builder("output_path")
                .short_option("-o")
                .env_name("CERT_OUTPUT_PATH")
                .description("The path to a directory in which all certificates and private keys should be stored")
                .default_value(".")
                .build()?,
            ConfigItem::builder("keychain_password")
                .short_option("-p")
                .env_name("CERT_KEYCHAIN_PASSWORD")
                .description("This might be required the first time you access certificates on a new mac")
                .optional(true)
                .sensitive(true)
                .build()?,
            ConfigItem::builder("platform")
                .env_name("CERT_PLATFORM")
                .description("Set the provisioning profile's platform (ios, macos, tvos)")
                .default_value("ios")
                .verify(|value| match value.as_str() {
                    Some(p) if !PLATFORMS.contains(&p) => Err(format!(
                        "Unsupported platform '{}', must be one of: {}",
                        p,
                        PLATFORMS.join(", ")
                    )),
                    _ => Ok(()),
                })
                .build()?,
            ConfigItem::builder("force")
                .env_name("CERT_FORCE")
                .description("Create a certificate even if an existing one exists")
                .data_type(DataType::Boolean)
                .default_value(false)
                .build()?,
        ])
    }
}
