use std::marker::PhantomData;
use std::sync::Arc;

use crate::models::audio_models::Sample;
use crate::processing::push_to_talk::PushToTalkGate;

/// What the conditioner did to a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conditioning {
    /// Zero-filled: push-to-talk closed or effective gain of zero.
    Silenced,
    /// Every sample multiplied by the effective gain, saturating.
    Scaled,
    /// Effective gain of exactly 1.0; samples untouched.
    Passthrough,
}

/// Mic-boost gain and push-to-talk gating applied to every fresh chunk
/// before it reaches the `SegmentAssembler`.
///
/// Silenced chunks are zero-filled, never skipped, so the sample count
/// (and with it the frame timing) is preserved exactly.
#[derive(Debug)]
pub struct SignalConditioner<S: Sample> {
    mic_boost: f32,
    gate: Arc<PushToTalkGate>,
    _sample: PhantomData<S>,
}

impl<S: Sample> SignalConditioner<S> {
    pub fn new(mic_boost: f32, gate: Arc<PushToTalkGate>) -> Self {
        Self {
            mic_boost,
            gate,
            _sample: PhantomData,
        }
    }

    pub fn mic_boost(&self) -> f32 {
        self.mic_boost
    }

    pub fn gate(&self) -> &Arc<PushToTalkGate> {
        &self.gate
    }

    /// Condition `chunk` in place for the given host volume and stream time.
    pub fn condition(&self, chunk: &mut [S], mic_volume: f32, now_ms: u64) -> Conditioning {
        let gain = mic_volume * self.mic_boost;
        if self.gate.is_muted(now_ms) || gain == 0.0 {
            chunk.fill(S::SILENCE);
            return Conditioning::Silenced;
        }
        if gain == 1.0 {
            return Conditioning::Passthrough;
        }
        for sample in chunk.iter_mut() {
            *sample = sample.apply_gain(gain);
        }
        Conditioning::Scaled
    }
}
