//! Layer merging, environment substitution and validation.

use super::types::{Config, ConfigFile, GitLabConfig, GitLabFile, Overrides};
use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_MODEL,
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS, ENV_API_KEY, ENV_BASE_URL,
    ENV_GITLAB_API_URL, ENV_GITLAB_TOKEN, ENV_MODEL, PROJECT_CONFIG_FILENAME,
};
use crate::error::ConfigError;

impl Config {
    /// Merge file layers and the environment into a resolved config.
    ///
    /// Precedence: environment > project file > global file > defaults.
    /// `env` returns the value of a variable; empty values count as unset.
    pub fn from_layers(
        global: Option<ConfigFile>,
        project: Option<ConfigFile>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env = |name: &str| env(name).filter(|v| !v.is_empty());
        let file = merge(global.unwrap_or_default(), project.unwrap_or_default());
        let sub = |value: Option<String>| value.map(|v| resolve_str(&v, &env));

        let config = Config {
            base_url: env(ENV_BASE_URL)
                .or(sub(file.base_url))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: env(ENV_API_KEY)
                .or(sub(file.api_key))
                .filter(|k| !k.is_empty()),
            model: env(ENV_MODEL)
                .or(sub(file.model))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: file.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: file.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            max_tool_rounds: file.max_tool_rounds.unwrap_or(DEFAULT_MAX_TOOL_ROUNDS),
            timeout_secs: file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            system_prompt: sub(file.system_prompt)
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            gitlab: GitLabConfig {
                api_url: env(ENV_GITLAB_API_URL)
                    .or(sub(file.gitlab.api_url))
                    .unwrap_or_else(|| GitLabConfig::default().api_url),
                token: env(ENV_GITLAB_TOKEN)
                    .or(sub(file.gitlab.token))
                    .filter(|t| !t.is_empty()),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line values over the resolved config.
    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(url) = overrides.base_url {
            self.base_url = url;
        }
        if let Some(rounds) = overrides.max_tool_rounds {
            self.max_tool_rounds = rounds;
        }
        self.validate()
    }

    /// The endpoint credential. Missing is fatal, but only for commands that talk to the model.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential {
                var: ENV_API_KEY,
                file: PROJECT_CONFIG_FILENAME,
            })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid {
                field: "temperature",
                reason: format!("{} is outside 0.0..=2.0", self.temperature),
            });
        }
        if self.max_tool_rounds == 0 {
            return Err(ConfigError::Invalid {
                field: "max_tool_rounds",
                reason: "must be at least 1".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }
        Ok(())
    }
}

/// Project values win when present.
fn merge(global: ConfigFile, project: ConfigFile) -> ConfigFile {
    ConfigFile {
        base_url: project.base_url.or(global.base_url),
        api_key: project.api_key.or(global.api_key),
        model: project.model.or(global.model),
        temperature: project.temperature.or(global.temperature),
        max_tokens: project.max_tokens.or(global.max_tokens),
        max_tool_rounds: project.max_tool_rounds.or(global.max_tool_rounds),
        timeout_secs: project.timeout_secs.or(global.timeout_secs),
        system_prompt: project.system_prompt.or(global.system_prompt),
        gitlab: GitLabFile {
            api_url: project.gitlab.api_url.or(global.gitlab.api_url),
            token: project.gitlab.token.or(global.gitlab.token),
        },
    }
}

/// Replace {env:VAR} with the environment variable value.
fn resolve_str(s: &str, env: &impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("{env:") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&env(&rest[start + 5..start + end]).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_any_layer() {
        let config = Config::from_layers(None, None, env_of(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tool_rounds, DEFAULT_MAX_TOOL_ROUNDS);
        assert!(config.api_key.is_none());
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigError::MissingCredential { .. })
        ));
    }

    #[test]
    fn environment_beats_files() {
        let project = ConfigFile {
            model: Some("from-project".into()),
            api_key: Some("file-key".into()),
            ..Default::default()
        };
        let env = env_of(&[(ENV_MODEL, "from-env"), (ENV_API_KEY, "env-key")]);
        let config = Config::from_layers(None, Some(project), env).unwrap();
        assert_eq!(config.model, "from-env");
        assert_eq!(config.require_api_key().unwrap(), "env-key");
    }

    #[test]
    fn project_beats_global() {
        let global = ConfigFile {
            model: Some("global".into()),
            max_tokens: Some(100),
            ..Default::default()
        };
        let project = ConfigFile {
            model: Some("project".into()),
            ..Default::default()
        };
        let config = Config::from_layers(Some(global), Some(project), env_of(&[])).unwrap();
        assert_eq!(config.model, "project");
        assert_eq!(config.max_tokens, 100);
    }

    #[test]
    fn empty_env_values_count_as_unset() {
        let env = env_of(&[(ENV_API_KEY, ""), (ENV_BASE_URL, "")]);
        let config = Config::from_layers(None, None, env).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn env_placeholders_are_substituted() {
        let global = ConfigFile {
            api_key: Some("{env:MY_KEY}".into()),
            gitlab: GitLabFile {
                api_url: Some("https://{env:GL_HOST}/".into()),
                token: None,
            },
            ..Default::default()
        };
        let env = env_of(&[("MY_KEY", "sk-123"), ("GL_HOST", "git.example.com")]);
        let config = Config::from_layers(Some(global), None, env).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-123"));
        assert_eq!(config.gitlab.api_url, "https://git.example.com/");
    }

    #[test]
    fn unresolved_placeholder_leaves_key_unset() {
        let global = ConfigFile {
            api_key: Some("{env:NOT_SET_ANYWHERE}".into()),
            ..Default::default()
        };
        let config = Config::from_layers(Some(global), None, env_of(&[])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn overrides_win_and_are_validated() {
        let mut config = Config::from_layers(None, None, env_of(&[])).unwrap();
        config
            .apply_overrides(Overrides {
                model: Some("gpt-4o".into()),
                base_url: None,
                max_tool_rounds: Some(3),
            })
            .unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tool_rounds, 3);

        let err = config
            .apply_overrides(Overrides {
                max_tool_rounds: Some(0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_tool_rounds", .. }));
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let global = ConfigFile {
            temperature: Some(5.0),
            ..Default::default()
        };
        assert!(Config::from_layers(Some(global), None, env_of(&[])).is_err());
    }
}
