//! Run settings read from the environment.
//!
//! Call after `heddle_config::load_and_apply` so `.env` and XDG values are visible.

use std::collections::HashMap;

use thiserror::Error;

use crate::graph::DEFAULT_RECURSION_LIMIT;
use crate::tool_source::DEFAULT_ELASTICSEARCH_URL;
use crate::worker::DEFAULT_MAX_TOOL_ROUNDS;

pub const ENV_MODEL: &str = "HEDDLE_MODEL";
pub const ENV_TEMPERATURE: &str = "HEDDLE_TEMPERATURE";
pub const ENV_RECURSION_LIMIT: &str = "HEDDLE_RECURSION_LIMIT";
pub const ENV_MAX_TOOL_ROUNDS: &str = "HEDDLE_MAX_TOOL_ROUNDS";
pub const ENV_ELASTICSEARCH_URL: &str = "ELASTICSEARCH_URL";
pub const ENV_ELASTICSEARCH_USERNAME: &str = "ELASTICSEARCH_USERNAME";
pub const ENV_ELASTICSEARCH_PASSWORD: &str = "ELASTICSEARCH_PASSWORD";

pub const DEFAULT_MODEL: &str = "gpt-4o";

/// A variable was set but could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{name}={value:?} is not a valid {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Everything a team run needs besides the request.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub model: String,
    pub temperature: f32,
    pub recursion_limit: usize,
    pub max_tool_rounds: usize,
    pub elasticsearch_url: String,
    /// Username and password, only when both are set.
    pub elasticsearch_auth: Option<(String, String)>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            elasticsearch_url: DEFAULT_ELASTICSEARCH_URL.to_string(),
            elasticsearch_auth: None,
        }
    }
}

impl RunSettings {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Reads from an explicit map; unset or empty values fall back to defaults.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, SettingsError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let defaults = Self::default();

        let temperature = match get(ENV_TEMPERATURE) {
            Some(v) => v
                .parse::<f32>()
                .ok()
                .filter(|t| (0.0..=2.0).contains(t))
                .ok_or(SettingsError::Invalid {
                    name: ENV_TEMPERATURE,
                    value: v,
                    expected: "number between 0 and 2",
                })?,
            None => defaults.temperature,
        };
        let recursion_limit = parse_positive(ENV_RECURSION_LIMIT, get(ENV_RECURSION_LIMIT))?
            .unwrap_or(defaults.recursion_limit);
        let max_tool_rounds = parse_positive(ENV_MAX_TOOL_ROUNDS, get(ENV_MAX_TOOL_ROUNDS))?
            .unwrap_or(defaults.max_tool_rounds);

        let elasticsearch_auth = match (
            get(ENV_ELASTICSEARCH_USERNAME),
            get(ENV_ELASTICSEARCH_PASSWORD),
        ) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        };

        Ok(Self {
            model: get(ENV_MODEL).unwrap_or(defaults.model),
            temperature,
            recursion_limit,
            max_tool_rounds,
            elasticsearch_url: get(ENV_ELASTICSEARCH_URL).unwrap_or(defaults.elasticsearch_url),
            elasticsearch_auth,
        })
    }
}

fn parse_positive(name: &'static str, value: Option<String>) -> Result<Option<usize>, SettingsError> {
    match value {
        None => Ok(None),
        Some(v) => match v.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => Err(SettingsError::Invalid {
                name,
                value: v,
                expected: "positive integer",
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let s = RunSettings::from_vars(&HashMap::new()).unwrap();
        assert_eq!(s, RunSettings::default());
        assert_eq!(s.recursion_limit, 100);
        assert_eq!(s.model, "gpt-4o");
        assert_eq!(s.elasticsearch_url, "http://localhost:9200");
    }

    #[test]
    fn values_override_defaults() {
        let s = RunSettings::from_vars(&vars(&[
            (ENV_MODEL, "gpt-4o-mini"),
            (ENV_TEMPERATURE, "0.5"),
            (ENV_RECURSION_LIMIT, "25"),
            (ENV_MAX_TOOL_ROUNDS, "3"),
            (ENV_ELASTICSEARCH_URL, "http://es:9200"),
            (ENV_ELASTICSEARCH_USERNAME, "elastic"),
            (ENV_ELASTICSEARCH_PASSWORD, "changeme"),
        ]))
        .unwrap();
        assert_eq!(s.model, "gpt-4o-mini");
        assert_eq!(s.temperature, 0.5);
        assert_eq!(s.recursion_limit, 25);
        assert_eq!(s.max_tool_rounds, 3);
        assert_eq!(s.elasticsearch_url, "http://es:9200");
        assert_eq!(
            s.elasticsearch_auth,
            Some(("elastic".to_string(), "changeme".to_string()))
        );
    }

    /// **Scenario**: Auth needs both halves; a lone username is ignored.
    #[test]
    fn partial_auth_is_ignored() {
        let s = RunSettings::from_vars(&vars(&[(ENV_ELASTICSEARCH_USERNAME, "elastic")])).unwrap();
        assert_eq!(s.elasticsearch_auth, None);
    }

    #[test]
    fn bad_values_are_rejected() {
        for (name, value) in [
            (ENV_RECURSION_LIMIT, "0"),
            (ENV_RECURSION_LIMIT, "many"),
            (ENV_MAX_TOOL_ROUNDS, "-1"),
            (ENV_TEMPERATURE, "3"),
        ] {
            let err = RunSettings::from_vars(&vars(&[(name, value)])).unwrap_err();
            assert!(err.to_string().starts_with(name), "{}", err);
        }
    }
}
