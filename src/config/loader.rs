//! Configuration loading from disk and environment.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Dotenv file read from the working directory.
pub const DOTENV_FILE: &str = ".env";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, overlay the environment
/// (process first, then `.env`) and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_config_with(path, |_| {})
}

/// [`load_config`] with `adjust` applied after the environment overlay and
/// before validation. Command-line flags go through here.
pub fn load_config_with<F>(path: Option<&Path>, adjust: F) -> Result<AppConfig, ConfigError>
where
    F: FnOnce(&mut AppConfig),
{
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => AppConfig::default(),
    };

    let dotenv = read_dotenv(Path::new(DOTENV_FILE));
    apply_env_overrides(&mut config, layered_env(|key| std::env::var(key).ok(), &dotenv));
    adjust(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Variables declared in a dotenv file. A missing file yields none and
/// malformed lines are skipped. The process environment is left untouched.
pub fn read_dotenv(path: &Path) -> HashMap<String, String> {
    let Ok(entries) = dotenv::from_path_iter(path) else {
        return HashMap::new();
    };

    entries
        .filter_map(|entry| match entry {
            Ok(pair) => Some(pair),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping malformed dotenv line");
                None
            }
        })
        .collect()
}

/// Lookup where the process environment wins over dotenv values.
fn layered_env<'a, P>(
    process: P,
    dotenv: &'a HashMap<String, String>,
) -> impl Fn(&str) -> Option<String> + 'a
where
    P: Fn(&str) -> Option<String> + 'a,
{
    move |key| process(key).or_else(|| dotenv.get(key).cloned())
}

/// Parse a TOML document into a configuration. Missing sections use defaults.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay the variables a hosting platform usually injects.
///
/// `PORT` keeps the configured host and replaces the port.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        config.database.url = url;
    }

    if let Some(secret) = lookup("JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }

    if let Some(port) = lookup("PORT") {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port.trim());
    }

    if let Some(debug) = lookup("DEBUG") {
        config.debug = matches!(debug.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("hero-api-{}-{name}", std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            project_name = "Heroes"

            [database]
            url = "postgres://db:5432/heroes"

            [messages]
            database_unavailable = "Database is down"
            "#,
        )
        .unwrap();

        assert_eq!(config.project_name, "Heroes");
        assert_eq!(config.database.url, "postgres://db:5432/heroes");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.messages.database_unavailable, "Database is down");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let err = parse_config("listener = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "postgresql://railway:pw@proxy:6543/railway"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "3000"),
            ("DEBUG", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.url, "postgresql://railway:pw@proxy:6543/railway");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert!(!config.debug);
    }

    #[test]
    fn validation_errors_are_listed() {
        let err = ConfigError::Validation(vec![
            ValidationError::ZeroPoolSize,
            ValidationError::EmptyJwtSecret,
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: database.max_connections must be greater than zero, auth.jwt_secret must not be empty"
        );
    }

    #[test]
    fn dotenv_file_is_read_without_touching_the_process() {
        let path = scratch_file(
            "dotenv",
            "# local overrides\nJWT_SECRET=from-dotenv\nDATABASE_URL=\"postgres://local:5432/heroes\"\n",
        );

        let vars = read_dotenv(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(vars.get("JWT_SECRET").map(String::as_str), Some("from-dotenv"));
        assert_eq!(
            vars.get("DATABASE_URL").map(String::as_str),
            Some("postgres://local:5432/heroes")
        );
        assert_ne!(std::env::var("JWT_SECRET").ok().as_deref(), Some("from-dotenv"));
    }

    #[test]
    fn missing_dotenv_file_is_empty() {
        assert!(read_dotenv(Path::new("/nonexistent/hero-api/.env")).is_empty());
    }

    #[test]
    fn process_environment_wins_over_dotenv() {
        let dotenv: HashMap<String, String> = [
            ("JWT_SECRET".to_string(), "from-dotenv".to_string()),
            ("PORT".to_string(), "9000".to_string()),
        ]
        .into_iter()
        .collect();
        let process = |key: &str| (key == "JWT_SECRET").then(|| "from-process".to_string());

        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, layered_env(process, &dotenv));

        assert_eq!(config.auth.jwt_secret, "from-process");
        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
    }

    #[test]
    fn adjustments_apply_before_validation() {
        let path = scratch_file(
            "no-migration-program.toml",
            "[migrations]\nenabled = true\nprogram = \"\"\n",
        );

        let rejected = load_config(Some(&path));
        let accepted = load_config_with(Some(&path), |config| config.migrations.enabled = false);
        fs::remove_file(&path).unwrap();

        assert!(matches!(rejected, Err(ConfigError::Validation(_))));
        assert!(!accepted.unwrap().migrations.enabled);
    }
}
