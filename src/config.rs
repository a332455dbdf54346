use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Remembered parameters from previous runs, so the operator can accept
/// the last playlist/donor/output instead of retyping them.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct RunConfig {
    pub playlist_url: Option<String>,
    pub donor_url: Option<String>,
    pub output_path: Option<String>,
}

impl RunConfig {
    fn config_path() -> Option<PathBuf> {
        let proj = ProjectDirs::from("com", "revive", "revive-iptv")?;
        Some(proj.config_dir().join("config.json"))
    }

    pub fn load() -> Result<Self, anyhow::Error> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                let content = fs::read_to_string(path)?;
                let config: RunConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }
        Ok(RunConfig::default())
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        if let Some(path) = Self::config_path() {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(path, content)?;
        }
        Ok(())
    }

    // Remember-and-save helpers are best effort: a read-only config dir
    // should never break a run.

    pub fn remember_playlist(&mut self, url: &str) {
        self.playlist_url = Some(url.to_string());
        let _ = self.save();
    }

    pub fn remember_donor(&mut self, url: &str) {
        self.donor_url = Some(url.to_string());
        let _ = self.save();
    }

    pub fn remember_output(&mut self, path: &str) {
        self.output_path = Some(path.to_string());
        let _ = self.save();
    }
}
