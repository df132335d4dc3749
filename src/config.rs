//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Connection and playback settings read every time a request is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Chinachu WUI address (scheme, host, port)
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    // Transcoding
    #[serde(default)]
    pub transcode: bool,
    #[serde(default = "default_resolution")]
    pub video_resolution: String,
    /// kbps
    #[serde(default = "default_video_bitrate")]
    pub video_bitrate: u32,
    /// kbps
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: u32,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: f64,
}

fn default_resolution() -> String { "1280x720".to_string() }
fn default_video_bitrate() -> u32 { 1024 }
fn default_audio_bitrate() -> u32 { 256 }
fn default_timeout() -> f64 { 10.0 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            username: String::new(),
            password: String::new(),
            transcode: false,
            video_resolution: default_resolution(),
            video_bitrate: default_video_bitrate(),
            audio_bitrate: default_audio_bitrate(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl ClientConfig {
    pub fn new(address: &str, username: &str, password: &str) -> Self {
        Self {
            address: address.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            ..Self::default()
        }
    }

    /// Address with a scheme, without trailing slashes
    pub fn normalized_address(&self) -> String {
        let address = self.address.trim();
        if address.is_empty() {
            return String::new();
        }

        let address = if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("http://{}", address)
        };
        // Only slashes after the authority are trimmed, "http://" stays as is
        let authority_start = address.find("://").map(|i| i + 3).unwrap_or(0);
        let end = authority_start + address[authority_start..].trim_end_matches('/').len();
        address[..end].to_string()
    }

    /// Falls back to the default when the stored value is not a usable duration
    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.request_timeout_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(default_timeout()))
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }

    pub fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("harekaze");
        path.push("config.json");
        path
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Ignoring unreadable config {}: {}", path.display(), e),
                }
            }
        }

        Self::default()
    }

    pub fn save(&self) -> io::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("nope.json"));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"address":"http://dvr.local:20772","transcode":true}"#).unwrap();

        let config = ClientConfig::load_from(&path);
        assert_eq!(config.address, "http://dvr.local:20772");
        assert!(config.transcode);
        assert_eq!(config.video_resolution, "1280x720");
        assert_eq!(config.audio_bitrate, 256);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ClientConfig::new("dvr.local:20772", "user", "pass");
        config.save_to(&path).unwrap();
        assert_eq!(ClientConfig::load_from(&path), config);
    }

    #[test]
    fn test_normalized_address() {
        assert_eq!(ClientConfig::new("dvr.local:20772/", "", "").normalized_address(), "http://dvr.local:20772");
        assert_eq!(ClientConfig::new("https://dvr.example", "", "").normalized_address(), "https://dvr.example");
        assert_eq!(ClientConfig::new("  ", "", "").normalized_address(), "");
    }

    #[test]
    fn test_bad_timeout_falls_back() {
        let mut config = ClientConfig::default();
        config.request_timeout_secs = -1.0;
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        config.request_timeout_secs = 2.5;
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
    }
}
