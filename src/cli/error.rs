// Error handling utilities for consistent error messages and exit codes

use serde_json::Value;
use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate config key format (letters, numbers, underscores, hyphens, dots)
pub fn validate_config_key(key: &str) -> Result<(), String> {
    validate_non_empty(key, "Config key")?;
    
    if key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.') {
        Ok(())
    } else {
        Err(format!("Invalid config key: '{}'. Keys can only contain letters, numbers, underscores, hyphens, and dots.", key))
    }
}

/// Parse a command-line value as JSON, falling back to a plain string
/// (so `3` is a number, `["a","b"]` a list, and `north` a string)
pub fn parse_param_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_non_empty() {
        assert!(validate_non_empty("test", "field").is_ok());
        assert!(validate_non_empty("", "field").is_err());
        assert!(validate_non_empty("   ", "field").is_err());
    }

    #[test]
    fn test_validate_config_key() {
        assert!(validate_config_key("fruit_threshold").is_ok());
        assert!(validate_config_key("camera.id").is_ok());
        assert!(validate_config_key("").is_err());
        assert!(validate_config_key("bad key").is_err());
        assert!(validate_config_key("a=b").is_err());
    }

    #[test]
    fn test_parse_param_value() {
        assert_eq!(parse_param_value("3"), json!(3));
        assert_eq!(parse_param_value("-1"), json!(-1));
        assert_eq!(parse_param_value(r#"["a","b"]"#), json!(["a", "b"]));
        assert_eq!(parse_param_value("north"), json!("north"));
        assert_eq!(parse_param_value("\"quoted\""), json!("quoted"));
    }
}
