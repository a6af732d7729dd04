//! Configuration loader for DOBI.
//!
//! Reads `dobi.toml` and deserializes it into [`DobiConfig`]. Falls back to
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use dobi_types::config::DobiConfig;

pub const CONFIG_FILE_NAME: &str = "dobi.toml";

/// Environment variable naming the data directory that holds `dobi.toml`.
pub const DOBI_HOME_ENV: &str = "DOBI_HOME";

/// Where to look for the config file.
///
/// An explicit `--config` path wins, then `$DOBI_HOME/dobi.toml`, then
/// `./dobi.toml`.
pub fn resolve_config_path(explicit: Option<&Path>, dobi_home: Option<&Path>) -> PathBuf {
    match (explicit, dobi_home) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(home)) => home.join(CONFIG_FILE_NAME),
        (None, None) => PathBuf::from(CONFIG_FILE_NAME),
    }
}

/// Load configuration from `config_path`.
///
/// - If the file does not exist, returns [`DobiConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
pub async fn load_config(config_path: &Path) -> DobiConfig {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {} found, using defaults", config_path.display());
            return DobiConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return DobiConfig::default();
        }
    };

    match toml::from_str::<DobiConfig>(&content) {
        Ok(config) => {
            tracing::debug!(path = %config_path.display(), "loaded config");
            config
        }
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            DobiConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILE_NAME)).await;
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.documents.top_k, 4);
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(
            &path,
            r#"
[documents]
data_dir = "./kakao-docs"
top_k = 6

[history]
window_turns = 0

[server]
port = 8080
"#,
        )
        .await
        .unwrap();

        let config = load_config(&path).await;
        assert_eq!(config.documents.data_dir, PathBuf::from("./kakao-docs"));
        assert_eq!(config.documents.top_k, 6);
        assert_eq!(config.history.window_turns, 0);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.max_tokens, 200);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(&path).await;
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn resolve_config_path_precedence() {
        let explicit = Path::new("/etc/dobi/custom.toml");
        let home = Path::new("/srv/dobi");
        assert_eq!(resolve_config_path(Some(explicit), Some(home)), explicit);
        assert_eq!(
            resolve_config_path(None, Some(home)),
            PathBuf::from("/srv/dobi/dobi.toml")
        );
        assert_eq!(resolve_config_path(None, None), PathBuf::from("dobi.toml"));
    }
}
