use arangodoc_core::Settings;
use serde::{Deserialize, Serialize};

/// Connection settings for `Client`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Server endpoint, e.g. `http://localhost:8529`
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_database")]
    pub database: String,

    /// Basic auth credentials; no auth header is sent when unset
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Document encoding defaults used for object mapping
    #[serde(default)]
    pub settings: Settings,
}

fn default_url() -> String {
    "http://localhost:8529".to_string()
}

fn default_database() -> String {
    "_system".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            database: default_database(),
            username: None,
            password: None,
            settings: Settings::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arangodoc_core::{DateTimeFormat, EnumFormat};

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.url, "http://localhost:8529");
        assert_eq!(config.database, "_system");
        assert!(config.username.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let path = std::env::temp_dir().join(format!("arangodoc-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{"database": "shop", "username": "root", "settings": {"enum_format": "string"}}"#,
        )
        .unwrap();

        let config = ClientConfig::load(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.url, "http://localhost:8529");
        assert_eq!(config.database, "shop");
        assert_eq!(config.username.as_deref(), Some("root"));
        assert_eq!(config.settings.enum_format, EnumFormat::String);
        assert_eq!(config.settings.date_time_format, DateTimeFormat::Native);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ClientConfig::load("/nonexistent/arangodoc.json").is_err());
    }
}
