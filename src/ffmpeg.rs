use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::audio::{AudioBuffer, AudioFormat};
use crate::error::{decode_error, encode_error, Result, Stage};

/// Turns compressed audio files into sample buffers and back
#[async_trait]
pub trait AudioCodec: Send + Sync {
    /// Name of the codec backend
    fn name(&self) -> &str;

    /// Decode the whole file into memory
    async fn decode(&self, path: &Path) -> Result<AudioBuffer>;

    /// Encode `audio` as MP3 into `path`, overwriting it
    async fn encode(&self, audio: &AudioBuffer, path: &Path) -> Result<()>;
}

/// Codec backed by the ffmpeg and ffprobe executables
#[derive(Debug, Clone)]
pub struct FfmpegCodec {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegCodec {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    sample_rate: Option<String>,
    channels: Option<u16>,
    bit_rate: Option<String>,
}

impl FfmpegCodec {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Format of the first audio stream
    async fn probe_format(&self, path: &Path) -> AnyResult<AudioFormat> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v", "error",
                "-select_streams", "a:0",
                "-show_entries", "stream=sample_rate,channels,bit_rate",
                "-of", "json",
            ])
            .arg(path)
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffprobe failed: {}", error.trim());
        }

        let json_output = String::from_utf8(output.stdout)
            .context("ffprobe output is not valid UTF-8")?;
        parse_probe_output(&json_output)
    }

    async fn decode_pcm(&self, path: &Path, format: &AudioFormat) -> AnyResult<Vec<u8>> {
        let output = Command::new(&self.ffmpeg)
            .args(decode_args(path, format))
            .stdin(Stdio::null())
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg failed to decode audio: {}", error.trim());
        }
        Ok(output.stdout)
    }

    async fn encode_pcm(&self, audio: &AudioBuffer, path: &Path) -> AnyResult<()> {
        let mut child = Command::new(&self.ffmpeg)
            .args(encode_args(audio.format(), path))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to execute ffmpeg")?;

        let mut stdin = child.stdin.take().context("ffmpeg stdin unavailable")?;
        let pcm = audio.to_le_bytes();
        let writer = tokio::spawn(async move {
            stdin.write_all(&pcm).await?;
            stdin.shutdown().await
        });

        let output = child
            .wait_with_output()
            .await
            .context("Failed to wait for ffmpeg")?;
        let written = writer.await.context("PCM writer task panicked")?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg failed to encode audio: {}", error.trim());
        }
        written.context("Failed to stream PCM to ffmpeg")?;
        Ok(())
    }
}

#[async_trait]
impl AudioCodec for FfmpegCodec {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn decode(&self, path: &Path) -> Result<AudioBuffer> {
        info!("Decoding audio from {:?}", path);

        let format = self
            .probe_format(path)
            .await
            .map_err(|e| decode_error(Stage::Audio, format!("{:#}", e)))?;
        let pcm = self
            .decode_pcm(path, &format)
            .await
            .map_err(|e| decode_error(Stage::Audio, format!("{:#}", e)))?;

        let buffer = AudioBuffer::from_le_bytes(format, &pcm);
        debug!(
            "Decoded {}ms at {}Hz/{}ch",
            buffer.duration_ms(),
            format.sample_rate,
            format.channels
        );
        Ok(buffer)
    }

    async fn encode(&self, audio: &AudioBuffer, path: &Path) -> Result<()> {
        info!("Encoding {}ms of audio to {:?}", audio.duration_ms(), path);
        self.encode_pcm(audio, path)
            .await
            .map_err(|e| encode_error(Stage::Audio, format!("{:#}", e)))
    }
}

fn parse_probe_output(json_output: &str) -> AnyResult<AudioFormat> {
    let probe: ProbeOutput =
        serde_json::from_str(json_output).context("Failed to parse ffprobe JSON output")?;
    let stream = probe
        .streams
        .into_iter()
        .next()
        .context("No audio stream found in the file")?;

    let sample_rate: u32 = stream
        .sample_rate
        .as_deref()
        .and_then(|s| s.parse().ok())
        .filter(|rate| *rate > 0)
        .context("Could not parse sample rate")?;
    let channels = stream
        .channels
        .filter(|c| *c > 0)
        .context("Could not parse channel count")?;

    let format = AudioFormat::new(sample_rate, channels);
    Ok(match stream.bit_rate.as_deref().and_then(|s| s.parse().ok()) {
        Some(bit_rate) => format.with_bit_rate(bit_rate),
        None => format,
    })
}

/// Arguments decoding `path` to raw s16le PCM on stdout
fn decode_args(path: &Path, format: &AudioFormat) -> Vec<String> {
    vec![
        "-v".to_string(), "error".to_string(),
        "-i".to_string(), path.to_string_lossy().into_owned(),
        "-map".to_string(), "0:a:0".to_string(),
        "-f".to_string(), "s16le".to_string(),
        "-acodec".to_string(), "pcm_s16le".to_string(),
        "-ar".to_string(), format.sample_rate.to_string(),
        "-ac".to_string(), format.channels.to_string(),
        "pipe:1".to_string(),
    ]
}

/// Arguments encoding s16le PCM from stdin to an untagged MP3 at `path`
fn encode_args(format: &AudioFormat, path: &Path) -> Vec<String> {
    let mut args = vec![
        "-v".to_string(), "error".to_string(),
        "-y".to_string(),
        "-f".to_string(), "s16le".to_string(),
        "-ar".to_string(), format.sample_rate.to_string(),
        "-ac".to_string(), format.channels.to_string(),
        "-i".to_string(), "pipe:0".to_string(),
        "-codec:a".to_string(), "libmp3lame".to_string(),
    ];

    if let Some(bit_rate) = format.bit_rate {
        args.push("-b:a".to_string());
        args.push(bit_rate.to_string());
    }

    // tags are written separately once the audio exists
    args.extend(
        ["-map_metadata", "-1", "-id3v2_version", "0", "-write_id3v1", "0", "-f", "mp3"]
            .iter()
            .map(|s| s.to_string()),
    );
    args.push(path.to_string_lossy().into_owned());
    args
}
