//! Cookie Persistence
//!
//! Keeps cookies set by the licensing service across process restarts.
//! One cookie per line: `<url>\t<set-cookie value>`.

use std::path::{Path, PathBuf};

use license_core::{LicenseError, Result};
use reqwest::Url;
use reqwest::cookie::Jar;

#[derive(Clone, Debug)]
pub struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored `(url, cookie)` entries; a missing file has none
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(content
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .map(|(url, cookie)| (url.to_string(), cookie.to_string()))
            .collect())
    }

    /// Seed a cookie jar with every stored cookie
    pub fn load_into(&self, jar: &Jar) -> Result<usize> {
        let entries = self.entries()?;
        for (url, cookie) in &entries {
            match url.parse::<Url>() {
                Ok(url) => jar.add_cookie_str(cookie, &url),
                Err(err) => tracing::warn!(url = %url, error = %err, "Skipping stored cookie"),
            }
        }
        Ok(entries.len())
    }

    /// Store cookies received from `url`, replacing any stored cookie with
    /// the same name for the same URL
    pub fn record(&self, url: &Url, cookies: &[String]) -> Result<()> {
        if cookies.is_empty() {
            return Ok(());
        }

        let url = url.to_string();
        let mut entries = self.entries()?;
        let before = entries.clone();
        for cookie in cookies {
            let name = cookie_name(cookie);
            match entries
                .iter_mut()
                .find(|(u, c)| *u == url && cookie_name(c) == name)
            {
                Some(existing) => existing.1.clone_from(cookie),
                None => entries.push((url.clone(), cookie.clone())),
            }
        }
        if entries == before {
            return Ok(());
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let content: String = entries
            .iter()
            .map(|(url, cookie)| format!("{url}\t{cookie}\n"))
            .collect();
        std::fs::write(&self.path, content)
            .map_err(|e| LicenseError::Storage(format!("cookie file {}: {e}", self.path.display())))
    }
}

/// Name part of a `Set-Cookie` value
fn cookie_name(cookie: &str) -> &str {
    let pair = cookie.split(';').next().unwrap_or_default();
    pair.split_once('=').map_or(pair, |(name, _)| name).trim()
}
