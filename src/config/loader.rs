//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::RobotConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use axis_control::load_config;
///
/// let config = load_config("robot.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RobotConfig> {
    let content = fs::read_to_string(path.as_ref()).map_err(|e| {
        let msg = heapless::String::try_from(e.to_string().as_str()).unwrap_or_default();
        Error::Config(ConfigError::IoError(msg))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// Per-axis validation runs while deserializing; a validation failure is
/// reported as a `ParseError` carrying the validation message.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<RobotConfig> {
    let config: RobotConfig = toml::from_str(content).map_err(|e| {
        let msg = truncated(e.message());
        Error::Config(ConfigError::ParseError(msg))
    })?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

fn truncated(message: &str) -> heapless::String<128> {
    let mut out = heapless::String::new();
    for c in message.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Capabilities;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[axes.intake]
name = "intake"
capabilities = "CONTROL_DIRECTION | FORWARD | REVERSE"
"#;

        let config = parse_config(toml).unwrap();
        let intake = config.axis("intake").unwrap();
        assert!(intake.has_all(Capabilities::FORWARD | Capabilities::REVERSE));
    }

    #[test]
    fn test_validation_error_surfaces_as_parse_error() {
        let toml = r#"
[axes.intake]
name = "intake"
capabilities = "FORWARD"
"#;

        assert!(matches!(
            parse_config(toml),
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_key_must_match_name() {
        let toml = r#"
[axes.intake]
name = "shooter"
"#;

        assert!(matches!(
            parse_config(toml),
            Err(Error::Config(ConfigError::AxisNotFound(_)))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_config("/nonexistent/robot.toml"),
            Err(Error::Config(ConfigError::IoError(_)))
        ));
    }
}
