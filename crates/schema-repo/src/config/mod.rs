//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::{RepoError, Result};
use std::path::Path;
use url::Url;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl DatabaseConfig {
    /// Build a `mysql://` connection string, percent-encoding credentials.
    pub fn connection_string(&self) -> Result<String> {
        let invalid = |what: &str| RepoError::Config(format!("Invalid database.{}", what));

        let mut url = Url::parse("mysql://localhost").map_err(|_| invalid("host"))?;
        url.set_host(Some(&self.host)).map_err(|_| invalid("host"))?;
        url.set_port(Some(self.port)).map_err(|_| invalid("port"))?;
        url.set_username(&self.user).map_err(|_| invalid("user"))?;
        url.set_password(Some(&self.password))
            .map_err(|_| invalid("password"))?;
        url.set_path(&self.database);
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mysql::parse_connection_string;

    const YAML: &str = r#"
database:
  host: db.local
  database: hr
  user: app
  password: "p@ss:w/rd"
"#;

    #[test]
    fn test_from_yaml_defaults() {
        let config = Config::from_yaml(YAML).unwrap();
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.logging.format, "text");
        assert_eq!(config.logging.verbosity, "info");
    }

    #[test]
    fn test_connection_string_percent_encodes() {
        let config = Config::from_yaml(YAML).unwrap();
        let conn = config.database.connection_string().unwrap();
        assert!(conn.starts_with("mysql://app:"));
        assert!(conn.ends_with("@db.local:3306/hr"));
        assert!(!conn.contains("p@ss"));

        let opts = parse_connection_string(&conn).unwrap();
        assert_eq!(opts.pass(), Some("p@ss:w/rd"));
        assert_eq!(opts.db_name(), Some("hr"));
    }

    #[test]
    fn test_password_never_serialized() {
        let config = Config::from_yaml(YAML).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("p@ss"));
        assert!(yaml.contains("db.local"));
    }

    #[test]
    fn test_missing_section_is_yaml_error() {
        assert!(matches!(
            Config::from_yaml("logging:\n  format: json\n"),
            Err(RepoError::Yaml(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let yaml = YAML.replace("user: app", "user: \"\"");
        assert!(matches!(Config::from_yaml(&yaml), Err(RepoError::Config(_))));
    }
}
