use std::path::{Path, PathBuf};

use crate::error::{config_error, ChapcutError, Result};
use crate::matchers::{ChapterMatcher, MatchMode};

/// Extensions accepted as input
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3"];

/// Configuration for one chapter removal run
#[derive(Debug, Clone)]
pub struct Config {
    pub input_file: PathBuf,
    pub output_file: Option<PathBuf>,
    /// Titles matching this are removed; empty removes everything
    pub filter_string: String,
    pub match_mode: MatchMode,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    /// Plan and report only, write nothing
    pub dry_run: bool,
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_input_file(&self.input_file)?;

        // Surfaces bad regexes before any decoding starts
        self.matcher()?;

        if let Some(output) = &self.output_file {
            if output == &self.input_file {
                return Err(config_error(
                    "output_file",
                    "Output file must differ from the input file",
                ));
            }
        }

        Ok(())
    }

    /// Build the title matcher for this run
    pub fn matcher(&self) -> Result<Box<dyn ChapterMatcher>> {
        self.match_mode.build(&self.filter_string)
    }

    /// Generate output filename if not provided
    pub fn ensure_output_file(&mut self) -> Result<()> {
        if self.output_file.is_none() {
            let input_stem = self
                .input_file
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| config_error("input_file", "Invalid filename"))?;

            let input_ext = self
                .input_file
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("mp3");

            let mut output_path = self.input_file.clone();
            output_path.set_file_name(format!("{}_edited.{}", input_stem, input_ext));
            self.output_file = Some(output_path);
        }
        Ok(())
    }

    /// Output path; set once built
    pub fn output_path(&self) -> Result<&Path> {
        self.output_file
            .as_deref()
            .ok_or_else(|| config_error("output_file", "Output file is not set"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: PathBuf::new(),
            output_file: None,
            filter_string: String::new(),
            match_mode: MatchMode::Substring,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            dry_run: false,
        }
    }
}

/// Check that `path` is an existing file with a supported extension
pub fn validate_input_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(config_error(
            "input_file",
            format!("Input file does not exist: {}", path.display()),
        ));
    }

    if !path.is_file() {
        return Err(config_error(
            "input_file",
            format!("Input path is not a file: {}", path.display()),
        ));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ChapcutError::UnsupportedFormat {
            extension,
            supported: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        });
    }

    Ok(())
}

/// Builder pattern for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    filter_string: Option<String>,
    match_mode: Option<MatchMode>,
    ffmpeg_path: Option<PathBuf>,
    ffprobe_path: Option<PathBuf>,
    dry_run: bool,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_file(mut self, path: PathBuf) -> Self {
        self.input_file = Some(path);
        self
    }

    pub fn output_file(mut self, path: PathBuf) -> Self {
        self.output_file = Some(path);
        self
    }

    /// Empty is allowed and means every chapter matches
    pub fn filter_string(mut self, filter: impl Into<String>) -> Self {
        self.filter_string = Some(filter.into());
        self
    }

    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = Some(mode);
        self
    }

    pub fn ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.ffmpeg_path = Some(path);
        self
    }

    pub fn ffprobe_path(mut self, path: PathBuf) -> Self {
        self.ffprobe_path = Some(path);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn build(self) -> Result<Config> {
        let input_file = self
            .input_file
            .ok_or_else(|| config_error("input_file", "Input file is required"))?;
        let filter_string = self.filter_string.ok_or_else(|| {
            config_error(
                "filter_string",
                "Filter string is required (pass --filter_string or choose a --profile)",
            )
        })?;

        let defaults = Config::default();
        let mut config = Config {
            input_file,
            output_file: self.output_file,
            filter_string,
            match_mode: self.match_mode.unwrap_or_default(),
            ffmpeg_path: self.ffmpeg_path.unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: self.ffprobe_path.unwrap_or(defaults.ffprobe_path),
            dry_run: self.dry_run,
        };

        config.validate()?;
        config.ensure_output_file()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_config_builder() {
        let temp_dir = tempdir().unwrap();
        let input_path = temp_dir.path().join("episode.mp3");
        File::create(&input_path).unwrap();

        let config = Config::builder()
            .input_file(input_path.clone())
            .filter_string("Ad")
            .build()
            .unwrap();

        assert_eq!(config.filter_string, "Ad");
        assert_eq!(config.match_mode, MatchMode::Substring);
        assert_eq!(
            config.output_file,
            Some(temp_dir.path().join("episode_edited.mp3"))
        );
        assert!(config.matcher().unwrap().matches("AD BREAK"));
    }

    #[test]
    fn test_empty_filter_is_accepted() {
        let temp_dir = tempdir().unwrap();
        let input_path = temp_dir.path().join("episode.MP3");
        File::create(&input_path).unwrap();

        let config = Config::builder()
            .input_file(input_path)
            .filter_string("")
            .build()
            .unwrap();
        assert!(config.matcher().unwrap().matches("anything"));
    }

    #[test]
    fn test_filter_is_required() {
        let temp_dir = tempdir().unwrap();
        let input_path = temp_dir.path().join("episode.mp3");
        File::create(&input_path).unwrap();

        let err = Config::builder().input_file(input_path).build().unwrap_err();
        assert!(matches!(err, ChapcutError::Config { ref field, .. } if field == "filter_string"));
    }

    #[test]
    fn test_config_validation() {
        let config = Config {
            input_file: PathBuf::from("/nonexistent/file.mp3"),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_mp3_input() {
        let temp_dir = tempdir().unwrap();
        let input_path = temp_dir.path().join("episode.m4a");
        File::create(&input_path).unwrap();

        let err = validate_input_file(&input_path).unwrap_err();
        assert!(matches!(err, ChapcutError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_rejects_output_equal_to_input_and_bad_regex() {
        let temp_dir = tempdir().unwrap();
        let input_path = temp_dir.path().join("episode.mp3");
        File::create(&input_path).unwrap();

        let same = Config::builder()
            .input_file(input_path.clone())
            .output_file(input_path.clone())
            .filter_string("x")
            .build();
        assert!(same.is_err());

        let bad_regex = Config::builder()
            .input_file(input_path)
            .filter_string("[")
            .match_mode(MatchMode::Regex)
            .build();
        assert!(bad_regex.is_err());
    }
}
