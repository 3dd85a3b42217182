use crate::config::ConfigBuilder;
use crate::error::{config_error, ChapcutError, IntoChapcutError, Result};
use crate::matchers::MatchMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file format that can be serialized to YAML/JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Default title filter
    pub filter_string: Option<String>,
    /// Default match mode (substring, exact, regex)
    pub match_mode: Option<String>,
    /// Path to the ffmpeg executable
    pub ffmpeg_path: Option<PathBuf>,
    /// Path to the ffprobe executable
    pub ffprobe_path: Option<PathBuf>,
    /// Enable progress indicators by default
    pub show_progress: Option<bool>,
    /// Named filter presets
    pub profiles: Option<HashMap<String, ProfileConfig>>,
}

/// Profile-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub filter_string: Option<String>,
    pub match_mode: Option<String>,
    pub description: Option<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let mut profiles = HashMap::new();

        profiles.insert(
            "ads".to_string(),
            ProfileConfig {
                filter_string: Some(r"\b(ad|ads|advert|advertisement|commercial)\b".to_string()),
                match_mode: Some(MatchMode::Regex.to_string()),
                description: Some("Advertisement breaks".to_string()),
            },
        );

        profiles.insert(
            "sponsors".to_string(),
            ProfileConfig {
                filter_string: Some("sponsor".to_string()),
                match_mode: Some(MatchMode::Substring.to_string()),
                description: Some("Sponsor reads and sponsored segments".to_string()),
            },
        );

        profiles.insert(
            "intros".to_string(),
            ProfileConfig {
                filter_string: Some("intro".to_string()),
                match_mode: Some(MatchMode::Exact.to_string()),
                description: Some("Chapters titled exactly 'Intro'".to_string()),
            },
        );

        Self {
            filter_string: None,
            match_mode: Some(MatchMode::Substring.to_string()),
            ffmpeg_path: None,
            ffprobe_path: None,
            show_progress: Some(true),
            profiles: Some(profiles),
        }
    }
}

impl ConfigFile {
    /// Load configuration from a YAML file
    pub async fn load_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .await
            .with_path(path.as_ref().to_path_buf())?;

        serde_yaml::from_str(&contents)
            .map_err(|e| config_error("config_file", format!("Failed to parse YAML config: {}", e)))
    }

    /// Load configuration from a JSON file
    pub async fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .await
            .with_path(path.as_ref().to_path_buf())?;

        serde_json::from_str(&contents)
            .map_err(|e| config_error("config_file", format!("Failed to parse JSON config: {}", e)))
    }

    /// Auto-detect and load configuration file based on extension
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::load_yaml(path).await,
            Some("json") => Self::load_json(path).await,
            Some(ext) => Err(ChapcutError::UnsupportedFormat {
                extension: ext.to_string(),
                supported: vec!["yaml".to_string(), "yml".to_string(), "json".to_string()],
            }),
            None => Err(config_error(
                "config_file",
                "Config file must have .yaml, .yml, or .json extension",
            )),
        }
    }

    /// Save configuration to YAML file
    pub async fn save_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml_content = serde_yaml::to_string(self).map_err(|e| {
            config_error("config_file", format!("Failed to serialize config to YAML: {}", e))
        })?;

        fs::write(path.as_ref(), yaml_content)
            .await
            .with_path(path.as_ref().to_path_buf())
    }

    /// Save configuration to JSON file
    pub async fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_content = serde_json::to_string_pretty(self).map_err(|e| {
            config_error("config_file", format!("Failed to serialize config to JSON: {}", e))
        })?;

        fs::write(path.as_ref(), json_content)
            .await
            .with_path(path.as_ref().to_path_buf())
    }

    /// Get default config file paths to search
    pub fn default_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from(".chapcut.yaml"),
            PathBuf::from(".chapcut.yml"),
            PathBuf::from(".chapcut.json"),
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("chapcut")
                .join("config.yaml"),
        ]
    }

    /// Try to load configuration from default locations
    pub async fn load_from_default_locations() -> Option<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::load(&path).await {
                    Ok(config) => {
                        log::info!("Loaded configuration from: {}", path.display());
                        return Some(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }
        None
    }

    /// Apply this config file to a ConfigBuilder
    pub fn apply_to_builder(&self, mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
        if let Some(ref filter) = self.filter_string {
            builder = builder.filter_string(filter.clone());
        }

        if let Some(ref mode_str) = self.match_mode {
            let mode: MatchMode = mode_str.parse()?;
            builder = builder.match_mode(mode);
        }

        if let Some(ref path) = self.ffmpeg_path {
            builder = builder.ffmpeg_path(path.clone());
        }

        if let Some(ref path) = self.ffprobe_path {
            builder = builder.ffprobe_path(path.clone());
        }

        Ok(builder)
    }

    /// Apply a specific profile to a ConfigBuilder
    pub fn apply_profile_to_builder(
        &self,
        profile_name: &str,
        builder: ConfigBuilder,
    ) -> Result<ConfigBuilder> {
        let profile = self.profile(profile_name)?;

        // Base settings first, the profile overrides them
        let mut builder = self.apply_to_builder(builder)?;

        if let Some(ref filter) = profile.filter_string {
            builder = builder.filter_string(filter.clone());
        }

        if let Some(ref mode_str) = profile.match_mode {
            let mode: MatchMode = mode_str.parse()?;
            builder = builder.match_mode(mode);
        }

        Ok(builder)
    }

    pub fn profile(&self, profile_name: &str) -> Result<&ProfileConfig> {
        let profiles = self
            .profiles
            .as_ref()
            .ok_or_else(|| config_error("profiles", "No profiles defined"))?;

        profiles
            .get(profile_name)
            .ok_or_else(|| config_error("profile", format!("Profile '{}' not found", profile_name)))
    }

    /// List available profiles, sorted by name
    pub fn list_profiles(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .profiles
            .as_ref()
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}
