use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed processing rate of the whole pipeline, in Hz.
pub const SAMPLE_RATE: u32 = 16_000;

/// Samples per segment: 10 ms at `SAMPLE_RATE`.
pub const SEGMENT_SIZE: usize = (SAMPLE_RATE / 100) as usize;

/// Sample encoding negotiated with the engine once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 16-bit signed little-endian PCM.
    #[default]
    Pcm16,
    /// 32-bit IEEE float, nominal range [-1.0, 1.0].
    Float32,
}

impl SampleFormat {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::Pcm16 => 2,
            Self::Float32 => 4,
        }
    }

    pub fn bits_per_sample(&self) -> u16 {
        (self.bytes_per_sample() * 8) as u16
    }
}

/// The single media type the pipeline speaks: mono at `SAMPLE_RATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_format: SampleFormat,
}

impl AudioFormat {
    pub fn mono(sample_format: SampleFormat) -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            channels: 1,
            sample_format,
        }
    }

    pub fn block_align(&self) -> u16 {
        self.channels * self.sample_format.bytes_per_sample() as u16
    }

    pub fn avg_bytes_per_sec(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// Bytes in one 10 ms segment.
    pub fn segment_bytes(&self) -> usize {
        SEGMENT_SIZE * self.block_align() as usize
    }
}

/// A borrowed run of samples in whichever format the session runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleSlice<'a> {
    Pcm16(&'a [i16]),
    Float32(&'a [f32]),
}

impl SampleSlice<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Pcm16(s) => s.len(),
            Self::Float32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> SampleFormat {
        match self {
            Self::Pcm16(_) => SampleFormat::Pcm16,
            Self::Float32(_) => SampleFormat::Float32,
        }
    }
}

/// A sample type the pipeline can carry.
///
/// Gain saturates at `SATURATE_MIN`/`SATURATE_MAX` instead of wrapping. For
/// PCM16 the bounds are symmetric (±32767), so boosted signals clip evenly on
/// both rails.
pub trait Sample: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const FORMAT: SampleFormat;
    const SILENCE: Self;
    const SATURATE_MIN: Self;
    const SATURATE_MAX: Self;

    /// Multiply by `gain`, saturating at `SATURATE_MIN`/`SATURATE_MAX`.
    fn apply_gain(self, gain: f32) -> Self;

    /// Decode one sample from exactly `FORMAT.bytes_per_sample()` little-endian bytes.
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Value on the i16 scale ([-32768, 32767]) used by the noise suppressor.
    fn to_pcm_scale(self) -> f32;

    fn from_pcm_scale(value: f32) -> Self;

    fn as_slice(samples: &[Self]) -> SampleSlice<'_>;
}

impl Sample for i16 {
    const FORMAT: SampleFormat = SampleFormat::Pcm16;
    const SILENCE: Self = 0;
    const SATURATE_MIN: Self = -32767;
    const SATURATE_MAX: Self = 32767;

    fn apply_gain(self, gain: f32) -> Self {
        let scaled = (self as f32 * gain).trunc();
        scaled.clamp(Self::SATURATE_MIN as f32, Self::SATURATE_MAX as f32) as i16
    }

    fn from_le_slice(bytes: &[u8]) -> Self {
        i16::from_le_bytes([bytes[0], bytes[1]])
    }

    fn to_pcm_scale(self) -> f32 {
        self as f32
    }

    fn from_pcm_scale(value: f32) -> Self {
        value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
    }

    fn as_slice(samples: &[Self]) -> SampleSlice<'_> {
        SampleSlice::Pcm16(samples)
    }
}

impl Sample for f32 {
    const FORMAT: SampleFormat = SampleFormat::Float32;
    const SILENCE: Self = 0.0;
    const SATURATE_MIN: Self = -1.0;
    const SATURATE_MAX: Self = 1.0;

    fn apply_gain(self, gain: f32) -> Self {
        let scaled = self * gain;
        if scaled.is_nan() {
            return Self::SILENCE;
        }
        scaled.clamp(Self::SATURATE_MIN, Self::SATURATE_MAX)
    }

    fn from_le_slice(bytes: &[u8]) -> Self {
        f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn to_pcm_scale(self) -> f32 {
        self * 32768.0
    }

    fn from_pcm_scale(value: f32) -> Self {
        value / 32768.0
    }

    fn as_slice(samples: &[Self]) -> SampleSlice<'_> {
        SampleSlice::Float32(samples)
    }
}

/// Decode a little-endian byte run into `out`, replacing its contents.
/// A trailing partial sample is ignored.
pub fn decode_samples<S: Sample>(bytes: &[u8], out: &mut Vec<S>) {
    out.clear();
    out.extend(
        bytes
            .chunks_exact(S::FORMAT.bytes_per_sample())
            .map(S::from_le_slice),
    );
}

/// An audio segment owned by the host, as handed to an `AudioFilter`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub samples: Vec<f32>,
    pub timestamp: u64,
}
