use serde::Serialize;

use crate::errors::AppError;

pub const DEFAULT_MIN_SCORE: i16 = 0;
pub const DEFAULT_MAX_SCORE: i16 = 10;

/// A configured `(code, label)` pair. Only the code is ever stored on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub code: String,
    pub label: String,
}

impl Choice {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// Valid user types, valid element types and score bounds.
///
/// Resolved once at startup and shared read-only through `AppState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingValues {
    valid_user_types: Vec<Choice>,
    valid_element_types: Vec<Choice>,
    min_score: i16,
    max_score: i16,
}

impl Default for RatingValues {
    fn default() -> Self {
        Self {
            valid_user_types: vec![Choice::new("U", "USER_TYPE")],
            valid_element_types: vec![Choice::new("E", "ELEMENT_TYPE")],
            min_score: DEFAULT_MIN_SCORE,
            max_score: DEFAULT_MAX_SCORE,
        }
    }
}

impl RatingValues {
    pub fn new(
        valid_user_types: Vec<Choice>,
        valid_element_types: Vec<Choice>,
        min_score: i16,
        max_score: i16,
    ) -> Result<Self, AppError> {
        if valid_user_types.is_empty() || valid_element_types.is_empty() {
            return Err(AppError::EnvError(
                "At least one user type and one element type must be configured".into(),
            ));
        }

        // a reversed range would silently reject every score
        if min_score > max_score {
            return Err(AppError::EnvError(format!(
                "RATING_MIN_SCORE ({min_score}) is greater than RATING_MAX_SCORE ({max_score})"
            )));
        }

        Ok(Self {
            valid_user_types,
            valid_element_types,
            min_score,
            max_score,
        })
    }

    /// Builds the registry from a key lookup, falling back to the defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let valid_user_types = match lookup("RATING_VALID_USER_TYPES") {
            Some(raw) => parse_choices("RATING_VALID_USER_TYPES", &raw)?,
            None => defaults.valid_user_types,
        };
        let valid_element_types = match lookup("RATING_VALID_ELEMENT_TYPES") {
            Some(raw) => parse_choices("RATING_VALID_ELEMENT_TYPES", &raw)?,
            None => defaults.valid_element_types,
        };
        let min_score = match lookup("RATING_MIN_SCORE") {
            Some(raw) => parse_score("RATING_MIN_SCORE", &raw)?,
            None => defaults.min_score,
        };
        let max_score = match lookup("RATING_MAX_SCORE") {
            Some(raw) => parse_score("RATING_MAX_SCORE", &raw)?,
            None => defaults.max_score,
        };

        Self::new(valid_user_types, valid_element_types, min_score, max_score)
    }

    pub fn valid_user_types(&self) -> &[Choice] {
        &self.valid_user_types
    }

    pub fn valid_element_types(&self) -> &[Choice] {
        &self.valid_element_types
    }

    pub fn min_score(&self) -> i16 {
        self.min_score
    }

    pub fn max_score(&self) -> i16 {
        self.max_score
    }

    pub fn is_valid_user_type(&self, code: &str) -> bool {
        self.valid_user_types.iter().any(|c| c.code == code)
    }

    pub fn is_valid_element_type(&self, code: &str) -> bool {
        self.valid_element_types.iter().any(|c| c.code == code)
    }

    /// Any integer width is accepted; values outside `i16` are out of bounds.
    pub fn score_in_bounds(&self, score: i64) -> bool {
        (i64::from(self.min_score)..=i64::from(self.max_score)).contains(&score)
    }
}

/// Parses `code:label` pairs separated by commas. A bare `code` is its own label.
pub fn parse_choices(key: &str, raw: &str) -> Result<Vec<Choice>, AppError> {
    let mut choices = Vec::new();

    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (code, label) = match item.split_once(':') {
            Some((code, label)) => (code.trim(), label.trim()),
            None => (item, item),
        };

        if code.is_empty() || code.len() > 50 {
            return Err(AppError::EnvError(format!(
                "{key}: invalid type code '{code}'"
            )));
        }

        if choices.iter().any(|c: &Choice| c.code == code) {
            tracing::warn!("{key}: duplicate type code '{code}' ignored");
            continue;
        }

        choices.push(Choice::new(code, label));
    }

    if choices.is_empty() {
        return Err(AppError::EnvError(format!("{key} must not be empty")));
    }

    Ok(choices)
}

fn parse_score(key: &str, raw: &str) -> Result<i16, AppError> {
    raw.trim()
        .parse::<i16>()
        .map_err(|e| AppError::EnvError(format!("{key}: {e}")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub allowed_origins: Vec<String>,
    pub run_migrations: bool,
    pub rating_values: RatingValues,
}

impl Config {
    /// Reads the process environment. `.env` is loaded by the caller.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("STORE").as_deref().map(str::trim) {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(AppError::EnvError(format!(
                    "STORE must be 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        let database_url = lookup("DATABASE_URL");
        if store == StoreBackend::Postgres && database_url.is_none() {
            return Err(AppError::EnvError("DATABASE_URL must be set".into()));
        }

        let jwt_secret =
            lookup("JWT_SECRET").ok_or_else(|| AppError::EnvError("JWT_SECRET must be set".into()))?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| AppError::EnvError(format!("PORT: {e}")))?,
            None => 3001,
        };

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let run_migrations = match lookup("RUN_MIGRATIONS") {
            Some(raw) => !matches!(raw.trim().to_lowercase().as_str(), "0" | "false" | "no"),
            None => true,
        };

        let rating_values = RatingValues::from_lookup(&lookup)?;

        Ok(Self {
            port,
            store,
            database_url,
            jwt_secret,
            allowed_origins,
            run_migrations,
            rating_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_keys_fall_back_to_defaults() {
        let values = RatingValues::from_lookup(|_| None).unwrap();

        assert_eq!(values, RatingValues::default());
        assert_eq!(values.valid_user_types(), &[Choice::new("U", "USER_TYPE")]);
        assert_eq!(values.valid_element_types(), &[Choice::new("E", "ELEMENT_TYPE")]);
        assert_eq!(values.min_score(), 0);
        assert_eq!(values.max_score(), 10);
    }

    #[test]
    fn configured_choices_and_bounds_are_read() {
        let values = RatingValues::from_lookup(lookup_from(&[
            ("RATING_VALID_USER_TYPES", "T:TEACHER, S:STUDENT"),
            ("RATING_VALID_ELEMENT_TYPES", "Q"),
            ("RATING_MIN_SCORE", "1"),
            ("RATING_MAX_SCORE", "5"),
        ]))
        .unwrap();

        assert_eq!(
            values.valid_user_types(),
            &[Choice::new("T", "TEACHER"), Choice::new("S", "STUDENT")]
        );
        assert_eq!(values.valid_element_types(), &[Choice::new("Q", "Q")]);
        assert!(values.is_valid_user_type("S"));
        assert!(!values.is_valid_user_type("U"));
        assert!(values.score_in_bounds(1));
        assert!(values.score_in_bounds(5));
        assert!(!values.score_in_bounds(0));
        assert!(!values.score_in_bounds(40_000));
        assert!(!values.score_in_bounds(-40_000));
    }

    #[test]
    fn reversed_score_bounds_fail_at_load() {
        let result = RatingValues::from_lookup(lookup_from(&[
            ("RATING_MIN_SCORE", "8"),
            ("RATING_MAX_SCORE", "2"),
        ]));

        assert!(matches!(result, Err(AppError::EnvError(_))));
    }

    #[test]
    fn malformed_values_fail_at_load() {
        assert!(RatingValues::from_lookup(lookup_from(&[("RATING_MAX_SCORE", "ten")])).is_err());
        assert!(RatingValues::from_lookup(lookup_from(&[("RATING_VALID_USER_TYPES", " , ")])).is_err());
    }

    #[test]
    fn config_requires_database_url_and_secret() {
        assert!(Config::from_lookup(lookup_from(&[("JWT_SECRET", "s")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).is_err());

        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("ALLOWED_ORIGINS", "http://a.test, http://b.test"),
            ("RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.store, StoreBackend::Postgres);
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!config.run_migrations);
    }

    #[test]
    fn memory_store_needs_no_database_url() {
        let config =
            Config::from_lookup(lookup_from(&[("STORE", "memory"), ("JWT_SECRET", "s")])).unwrap();

        assert_eq!(config.store, StoreBackend::Memory);
        assert!(config.database_url.is_none());
        assert!(Config::from_lookup(lookup_from(&[("STORE", "mongo"), ("JWT_SECRET", "s")])).is_err());
    }
}
