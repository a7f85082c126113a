/*!
 * Layered Configuration Resolver
 *
 * Precedence: process property > environment variable > properties file > default.
 * Empty values at any layer fall through to the next one.
 */

use crate::core::ConfigError;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves configuration keys across the three layers
pub struct ConfigResolver {
    properties: HashMap<String, String>,
    env: EnvLookup,
    file: HashMap<String, String>,
}

impl ConfigResolver {
    /// Resolver backed by the real process environment
    pub fn new(properties: HashMap<String, String>, file: HashMap<String, String>) -> Self {
        Self {
            properties,
            env: Box::new(|key| std::env::var(key).ok()),
            file,
        }
    }

    /// Resolver with an injected environment (tests, embedding hosts)
    pub fn with_env<F>(
        properties: HashMap<String, String>,
        file: HashMap<String, String>,
        env: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            properties,
            env: Box::new(env),
            file,
        }
    }

    /// Raw string lookup through all layers
    pub fn lookup(&self, prop_key: &str, env_key: &str) -> Option<String> {
        if let Some(value) = self.properties.get(prop_key).filter(|v| !v.is_empty()) {
            return Some(value.clone());
        }
        if let Some(value) = (self.env)(env_key).filter(|v| !v.is_empty()) {
            return Some(value);
        }
        self.file
            .get(prop_key)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    pub fn string(&self, prop_key: &str, env_key: &str, default: &str) -> String {
        self.lookup(prop_key, env_key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Parse a value, naming the property key on failure
    pub fn parse<T>(&self, prop_key: &str, env_key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.lookup(prop_key, env_key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key: prop_key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Booleans accept true/false case-insensitively
    pub fn flag(&self, prop_key: &str, env_key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.lookup(prop_key, env_key) {
            None => Ok(default),
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    key: prop_key.to_string(),
                    value: raw,
                    reason: "expected true or false".to_string(),
                }),
            },
        }
    }

    /// Like `parse` but rejects zero
    pub fn positive<T>(&self, prop_key: &str, env_key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + PartialEq + Default,
        T::Err: Display,
    {
        let value = self.parse(prop_key, env_key, default)?;
        if value == T::default() {
            return Err(ConfigError::Zero {
                key: prop_key.to_string(),
            });
        }
        Ok(value)
    }
}

/// Extract `-Dkey=value` process properties from command-line arguments
pub fn properties_from_args<I, S>(args: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .filter_map(|arg| {
            let arg = arg.as_ref();
            let body = arg.strip_prefix("-D")?;
            let (key, value) = body.split_once('=')?;
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}
