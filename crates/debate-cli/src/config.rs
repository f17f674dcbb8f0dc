use anyhow::{Context, Result};
use debate_coordination::debate::DebateConfig;
use std::path::Path;
use std::time::Duration;

/// Default OpenAI-compatible endpoint (DashScope compatible mode).
pub const DEFAULT_API_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["DEBATE_API_KEY", "DASHSCOPE_API_KEY"];

/// Where actor turns are sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiEndpoint {
    /// Base URL; `/chat/completions` is appended per request.
    pub url: String,
    pub api_key: Option<String>,
    /// HTTP-level timeout for one request.
    pub request_timeout: Duration,
}

impl Default for ApiEndpoint {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ApiEndpoint {
    /// Resolve from `DEBATE_API_URL`, `DEBATE_API_KEY` / `DASHSCOPE_API_KEY`
    /// and `DEBATE_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let url = lookup("DEBATE_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()));
        let request_timeout = lookup("DEBATE_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(600));
        Self {
            url: url.trim_end_matches('/').to_string(),
            api_key,
            request_timeout,
        }
    }
}

/// Load the debate configuration from an optional TOML file.
///
/// Without a file the built-in defaults apply. `rounds` overrides the file.
pub fn load_debate_config(path: Option<&Path>, rounds: Option<u32>) -> Result<DebateConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            DebateConfig::from_toml_str(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => DebateConfig::default(),
    };

    if let Some(rounds) = rounds {
        config.free_debate_rounds = rounds;
    }

    config.validate().context("Invalid debate configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use debate_coordination::debate::RoleId;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_endpoint_defaults() {
        let endpoint = ApiEndpoint::from_lookup(lookup(&[]));
        assert_eq!(endpoint.url, DEFAULT_API_URL);
        assert!(endpoint.api_key.is_none());
        assert_eq!(endpoint.request_timeout, Duration::from_secs(600));
    }

    #[test]
    fn test_endpoint_overrides() {
        let endpoint = ApiEndpoint::from_lookup(lookup(&[
            ("DEBATE_API_URL", "http://localhost:8080/v1/"),
            ("DASHSCOPE_API_KEY", "sk-dash"),
            ("DEBATE_REQUEST_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(endpoint.url, "http://localhost:8080/v1");
        assert_eq!(endpoint.api_key.as_deref(), Some("sk-dash"));
        assert_eq!(endpoint.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_debate_api_key_wins() {
        let endpoint = ApiEndpoint::from_lookup(lookup(&[
            ("DASHSCOPE_API_KEY", "sk-dash"),
            ("DEBATE_API_KEY", "sk-debate"),
        ]));
        assert_eq!(endpoint.api_key.as_deref(), Some("sk-debate"));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = load_debate_config(None, None).unwrap();
        assert_eq!(config, DebateConfig::default());
    }

    #[test]
    fn test_load_from_file_with_rounds_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
free_debate_rounds = 6

[bindings.moderator]
model = "local-moderator"

[bindings.coach]
model = "local-coach"

[bindings.judge]
model = "local-judge"
reasoning = true

[bindings.debater_for]
model = "local-debater"
endpoint = "http://gpu-box:8000/v1"

[bindings.debater_against]
model = "local-debater"
"#
        )
        .unwrap();

        let config = load_debate_config(Some(file.path()), Some(3)).unwrap();
        assert_eq!(config.free_debate_rounds, 3);
        let pro = config.bindings.get(RoleId::DebaterFor).unwrap();
        assert_eq!(pro.endpoint.as_deref(), Some("http://gpu-box:8000/v1"));
    }

    #[test]
    fn test_load_rejects_invalid_rounds() {
        let err = load_debate_config(None, Some(0)).unwrap_err();
        assert!(format!("{:#}", err).contains("free_debate_rounds"));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_debate_config(Some(&dir.path().join("absent.toml")), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
