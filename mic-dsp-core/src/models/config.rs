use serde::{Deserialize, Serialize};

use super::audio_models::SampleFormat;

pub const MIN_MIC_BOOST: i32 = 1;
pub const MAX_MIC_BOOST: i32 = 20;
pub const DEFAULT_PTT_DELAY_MS: i64 = 200;
pub const MAX_PTT_HOTKEYS: usize = 2;

/// Configuration for a capture session, read once at stream start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicDspConfiguration {
    /// Integer mic boost multiple (default: 1). Clamped to 1..=20.
    pub mic_boost: i32,

    /// Capture endpoint ID, or None for the system default.
    pub mic_device_id: Option<String>,

    /// Render endpoint ID whose echo is cancelled, or None for the system default.
    pub playback_device_id: Option<String>,

    /// Mute the microphone unless a push-to-talk key is held (default: false).
    pub push_to_talk: bool,

    /// How long the gate stays open after the last key is released (default: 200).
    /// Negative values are clamped to 0.
    pub push_to_talk_delay_ms: i64,

    /// Up to two host hotkey codes. Zero means unbound.
    pub push_to_talk_hotkeys: Vec<u32>,

    /// Run post-gain noise suppression on every segment (default: true).
    pub noise_suppression: bool,

    /// Maximum attenuation applied by the suppressor, in dB (default: -30).
    pub noise_suppress_db: i32,

    /// Engine output encoding (default: 16-bit PCM).
    pub sample_format: SampleFormat,
}

impl MicDspConfiguration {
    /// Apply the clamps hosts expect instead of rejecting out-of-range values.
    pub fn sanitized(mut self) -> Self {
        let boost = self.mic_boost.clamp(MIN_MIC_BOOST, MAX_MIC_BOOST);
        if boost != self.mic_boost {
            log::warn!("mic boost {} out of range, using {}", self.mic_boost, boost);
            self.mic_boost = boost;
        }
        if self.push_to_talk_delay_ms < 0 {
            log::warn!(
                "negative push-to-talk delay {} ms, using 0",
                self.push_to_talk_delay_ms
            );
            self.push_to_talk_delay_ms = 0;
        }
        self.mic_device_id = self.mic_device_id.filter(|id| !id.is_empty());
        self.playback_device_id = self.playback_device_id.filter(|id| !id.is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_MIC_BOOST..=MAX_MIC_BOOST).contains(&self.mic_boost) {
            return Err(format!("mic boost out of range: {}", self.mic_boost));
        }
        if self.push_to_talk_delay_ms < 0 {
            return Err(format!(
                "push-to-talk delay must not be negative: {}",
                self.push_to_talk_delay_ms
            ));
        }
        if self.push_to_talk_hotkeys.len() > MAX_PTT_HOTKEYS {
            return Err(format!(
                "at most {} push-to-talk hotkeys, got {}",
                MAX_PTT_HOTKEYS,
                self.push_to_talk_hotkeys.len()
            ));
        }
        if self.noise_suppress_db > 0 {
            return Err(format!(
                "noise suppression must attenuate, got +{} dB",
                self.noise_suppress_db
            ));
        }
        Ok(())
    }

    pub fn mic_boost_factor(&self) -> f32 {
        self.mic_boost as f32
    }

    /// Hotkey codes that should actually be registered.
    pub fn active_hotkeys(&self) -> impl Iterator<Item = u32> + '_ {
        self.push_to_talk_hotkeys
            .iter()
            .copied()
            .filter(move |&code| self.push_to_talk && code != 0)
    }
}

impl Default for MicDspConfiguration {
    fn default() -> Self {
        Self {
            mic_boost: MIN_MIC_BOOST,
            mic_device_id: None,
            playback_device_id: None,
            push_to_talk: false,
            push_to_talk_delay_ms: DEFAULT_PTT_DELAY_MS,
            push_to_talk_hotkeys: Vec::new(),
            noise_suppression: true,
            noise_suppress_db: -30,
            sample_format: SampleFormat::Pcm16,
        }
    }
}
