use serde::Deserialize;

use crate::metadata;
use crate::objects;

/// Top-level configuration, deserialized from a YAML file and then adjusted
/// by [`Config::apply_env_overrides`].
#[derive(Clone, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub auth: AccessGateConfig,
    pub metadata: MetadataBackend,
    pub objects: ObjectsBackend,
}

#[derive(Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Exact origin strings allowed to make credentialed cross-origin
    /// requests. Requests without an Origin header are always allowed.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_port() -> u16 {
    3001
}

#[derive(Clone, Deserialize)]
pub struct AccessGateConfig {
    pub token: String,
    /// When false the gate lets every request through. Forced to false
    /// whenever APP_ENV is anything other than "production".
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Deserialize)]
#[serde(tag = "type")]
pub enum MetadataBackend {
    Sqlite(metadata::SqliteConfig),
}

#[derive(Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectsBackend {
    Local(objects::LocalConfig),
    S3(objects::S3Config),
}

impl Config {
    /// Environment variables recognized at startup: PORT, AUTH_TOKEN and
    /// APP_ENV. Each one overrides its file-based counterpart.
    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
        {
            self.http.port = port;
        }
        if let Ok(token) = std::env::var("AUTH_TOKEN") {
            self.auth.token = token;
        }
        if let Ok(env) = std::env::var("APP_ENV") {
            if env != "production" {
                self.auth.enabled = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_variants() {
        let yaml = r#"
http:
  port: 8080
  cors_origins: ["http://localhost:3000"]
auth:
  token: sekrit
metadata:
  type: Sqlite
  connection_string: "sqlite::memory:"
objects:
  type: Local
  directory: ./objects
  public_url: /files
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.http.port, 8080);
        assert!(config.auth.enabled);
        assert!(matches!(config.objects, ObjectsBackend::Local(_)));
    }

    #[test]
    fn port_defaults_when_absent() {
        let yaml = r#"
http: {}
auth:
  token: sekrit
metadata:
  type: Sqlite
  connection_string: "sqlite::memory:"
objects:
  type: Local
  directory: ./objects
  public_url: /files
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.http.port, 3001);
    }
}
