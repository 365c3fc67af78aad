use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};
use log::warn;

const SERVICE: &str = "rs_webmail";

/// Env fallback when no keyring entry exists (CI, headless boxes).
pub const SESSION_ENV: &str = "RS_WEBMAIL_SESSION";

/// Save the backend session value into the OS keyring for `username`
pub fn save_session(username: &str, session: &str) -> Result<()> {
    let entry = Entry::new(SERVICE, username);
    entry?
        .set_password(session)
        .map_err(|e| anyhow!(e.to_string()))?;
    Ok(())
}

/// Load the session value for `username` from the keyring
pub fn load_session(username: &str) -> Result<Option<String>> {
    let entry = Entry::new(SERVICE, username);
    match entry?.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(e) => Err(anyhow!(e.to_string())),
    }
}

/// Keyring first, then `RS_WEBMAIL_SESSION`. A broken keyring is not fatal.
pub fn resolve_session(username: &str) -> Option<String> {
    match load_session(username) {
        Ok(Some(v)) => Some(v),
        Ok(None) => std::env::var(SESSION_ENV).ok(),
        Err(e) => {
            warn!("keyring unavailable ({e}); trying {SESSION_ENV}");
            std::env::var(SESSION_ENV).ok()
        }
    }
}
