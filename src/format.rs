//! Output formatting for composed variables.

use crate::error::{ComposeError, ComposeResult};
use serde::Serialize;
use serde_json::Value;

/// Output format for rendered variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!("Invalid format '{}'. Valid options: json, yaml", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// The two namespaces as shown to an operator.
///
/// Absent namespaces are omitted rather than rendered as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariablesView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<&'a Value>,
}

/// Render `{ custom, environment }` as 2-space indented JSON.
pub fn command_output(
    custom: Option<&Value>,
    environment: Option<&Value>,
) -> ComposeResult<String> {
    render(
        &VariablesView {
            custom,
            environment,
        },
        OutputFormat::Json,
    )
}

/// Render any serializable value in the given format.
pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> ComposeResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(ComposeError::internal),
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(ComposeError::internal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_output_two_space_indent() {
        let custom = json!({"custom": 1});
        let environment = json!({"envVar": "value"});

        let output = command_output(Some(&custom), Some(&environment)).unwrap();

        assert_eq!(
            output,
            "{\n  \"custom\": {\n    \"custom\": 1\n  },\n  \"environment\": {\n    \"envVar\": \"value\"\n  }\n}"
        );
    }

    #[test]
    fn test_command_output_omits_absent() {
        let environment = json!({"A": "1"});
        let output = command_output(None, Some(&environment)).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!({"environment": {"A": "1"}}));
    }

    #[test]
    fn test_command_output_keeps_null() {
        let output = command_output(Some(&Value::Null), None).unwrap();
        assert_eq!(output, "{\n  \"custom\": null\n}");
    }

    #[test]
    fn test_render_yaml() {
        let output = render(&json!({"a": [1, 2]}), OutputFormat::Yaml).unwrap();
        let parsed: Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(parsed, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("yml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert!("toml".parse::<OutputFormat>().is_err());
    }
}
