use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

fn default_session_cookie() -> String {
    "sessionid".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Root of the mail backend, e.g. `http://127.0.0.1:8000/`
    pub base_url: String,
    /// Signed-in user; emails they sent get no archive control
    pub user_email: Option<String>,
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("rs_webmail"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

/// Where the TUI sends its log output.
pub fn log_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("rs_webmail.log");
    Ok(p)
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        // create a template config for users to edit
        let sample = Config {
            base_url: "http://127.0.0.1:8000/".to_string(),
            user_email: Some("you@example.com".to_string()),
            session_cookie: default_session_cookie(),
            timeout_secs: default_timeout_secs(),
        };
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(&path, tom)?;
        return Err(anyhow::anyhow!(
            "Created template config at {} — edit it and run again",
            path.display()
        ));
    }
    let s = fs::read_to_string(path)?;
    parse_config(&s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_get_defaults() {
        let cfg = parse_config(r#"base_url = "http://localhost:8000/""#).unwrap();
        assert_eq!(cfg.session_cookie, "sessionid");
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert!(cfg.user_email.is_none());
    }

    #[test]
    fn missing_base_url_is_an_error() {
        assert!(parse_config(r#"user_email = "a@b.com""#).is_err());
    }
}
