use crate::error::{ChapcutError, Result};

/// Stream format of decoded audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    /// Source bit rate in bits/s, reused when encoding
    pub bit_rate: Option<u64>,
}

impl AudioFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bit_rate: None,
        }
    }

    pub fn with_bit_rate(mut self, bit_rate: u64) -> Self {
        self.bit_rate = Some(bit_rate);
        self
    }

    /// Same sample layout, bit rate aside
    pub fn is_compatible(&self, other: &AudioFormat) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::new(44100, 2)
    }
}

/// Decoded audio held in memory as interleaved signed 16-bit samples,
/// addressed in milliseconds
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    format: AudioFormat,
    samples: Vec<i16>,
}

impl AudioBuffer {
    pub fn empty(format: AudioFormat) -> Self {
        Self {
            format,
            samples: Vec::new(),
        }
    }

    /// Wrap interleaved samples; a trailing partial frame is dropped
    pub fn from_samples(format: AudioFormat, mut samples: Vec<i16>) -> Self {
        let channels = usize::from(format.channels.max(1));
        samples.truncate(samples.len() - samples.len() % channels);
        Self { format, samples }
    }

    /// Wrap raw little-endian s16 PCM bytes as produced by ffmpeg
    pub fn from_le_bytes(format: AudioFormat, bytes: &[u8]) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::from_samples(format, samples)
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    fn channels(&self) -> usize {
        usize::from(self.format.channels.max(1))
    }

    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in ms, rounded to nearest
    pub fn duration_ms(&self) -> u64 {
        let rate = u64::from(self.format.sample_rate);
        if rate == 0 {
            return 0;
        }
        (self.frame_count() as u64 * 1000 + rate / 2) / rate
    }

    /// Frame index at `ms`, clamped to the end of the buffer
    pub fn frame_at(&self, ms: u32) -> usize {
        let frame = u64::from(ms) * u64::from(self.format.sample_rate) / 1000;
        (frame as usize).min(self.frame_count())
    }

    /// Copy of `[start_ms, end_ms)`; out-of-range bounds are clamped
    pub fn slice(&self, start_ms: u32, end_ms: u32) -> AudioBuffer {
        let start = self.frame_at(start_ms);
        let end = self.frame_at(end_ms).max(start);
        let channels = self.channels();
        AudioBuffer {
            format: self.format,
            samples: self.samples[start * channels..end * channels].to_vec(),
        }
    }

    /// Append `other` to the end of this buffer
    pub fn append(&mut self, other: &AudioBuffer) -> Result<()> {
        if !self.format.is_compatible(&other.format) {
            return Err(ChapcutError::Processing {
                message: format!(
                    "Cannot join {}Hz/{}ch audio onto {}Hz/{}ch audio",
                    other.format.sample_rate,
                    other.format.channels,
                    self.format.sample_rate,
                    self.format.channels
                ),
            });
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1 kHz mono: one frame per millisecond, sample value == its ms
    fn ramp(ms: usize) -> AudioBuffer {
        AudioBuffer::from_samples(AudioFormat::new(1000, 1), (0..ms as i16).collect())
    }

    #[test]
    fn test_duration_and_frames() {
        let stereo = AudioBuffer::from_samples(AudioFormat::new(8000, 2), vec![0; 8000 * 2 * 3]);
        assert_eq!(stereo.frame_count(), 24000);
        assert_eq!(stereo.duration_ms(), 3000);
        assert_eq!(AudioBuffer::empty(AudioFormat::default()).duration_ms(), 0);
    }

    #[test]
    fn test_duration_rounds_to_nearest() {
        // 441 frames at 44.1kHz is exactly 10ms, 463 frames is 10.498ms
        let exact = AudioBuffer::from_samples(AudioFormat::new(44100, 1), vec![0; 441]);
        let short = AudioBuffer::from_samples(AudioFormat::new(44100, 1), vec![0; 463]);
        assert_eq!(exact.duration_ms(), 10);
        assert_eq!(short.duration_ms(), 10);
    }

    #[test]
    fn test_slice_by_milliseconds() {
        let buffer = ramp(100);
        let part = buffer.slice(10, 20);
        assert_eq!(part.duration_ms(), 10);
        assert_eq!(part.samples().first(), Some(&10));
        assert_eq!(part.samples().last(), Some(&19));
    }

    #[test]
    fn test_slice_clamps_out_of_range() {
        let buffer = ramp(100);
        assert_eq!(buffer.slice(90, 500).duration_ms(), 10);
        assert!(buffer.slice(200, 300).is_empty());
        assert!(buffer.slice(50, 40).is_empty());
    }

    #[test]
    fn test_slice_keeps_frames_whole() {
        let buffer = AudioBuffer::from_samples(AudioFormat::new(1000, 2), (0..20).collect());
        let part = buffer.slice(2, 4);
        assert_eq!(part.samples(), &[4, 5, 6, 7]);
    }

    #[test]
    fn test_append_rejects_mismatched_format() {
        let mut mono = ramp(10);
        let stereo = AudioBuffer::from_samples(AudioFormat::new(1000, 2), vec![0; 4]);
        assert!(mono.append(&stereo).is_err());

        mono.append(&ramp(5)).unwrap();
        assert_eq!(mono.duration_ms(), 15);
    }

    #[test]
    fn test_le_bytes_round_trip_drops_partial_frame() {
        let format = AudioFormat::new(1000, 2);
        let buffer = AudioBuffer::from_le_bytes(format, &[1, 0, 2, 0, 3, 0]);
        assert_eq!(buffer.samples(), &[1, 2]);
        assert_eq!(buffer.to_le_bytes(), vec![1, 0, 2, 0]);
    }
}
