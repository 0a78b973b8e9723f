//! RNNoise-backed post-gain noise suppression.
//!
//! The pipeline runs at 16 kHz while RNNoise models 48 kHz audio in
//! 480-sample frames, so each 160-sample segment is interpolated ×3 inside
//! the suppressor, denoised, and decimated back. None of this leaks out:
//! callers see one segment in, one segment of the same length out.

use nnnoiseless::DenoiseState;

use crate::models::audio_models::SEGMENT_SIZE;
use crate::traits::noise_suppressor::{NoiseSuppressor, SuppressorFactory};

/// Rate ratio between RNNoise's model rate and the pipeline rate.
const RATE_RATIO: usize = 3;

/// RNNoise frame size (10 ms at 48 kHz).
pub const RNNOISE_FRAME_SIZE: usize = 480;

/// RNNoise suppressor with an attenuation floor.
///
/// The denoised signal is blended back with the input so that pure noise is
/// attenuated by at most `max_attenuation_db`.
pub struct RnnoiseSuppressor {
    denoiser: Box<DenoiseState<'static>>,
    floor: f32,
    last_input: f32,
    upsampled: [f32; RNNOISE_FRAME_SIZE],
    denoised: [f32; RNNOISE_FRAME_SIZE],
}

impl RnnoiseSuppressor {
    pub fn new(max_attenuation_db: i32) -> Self {
        Self {
            denoiser: DenoiseState::new(),
            floor: db_to_gain(max_attenuation_db),
            last_input: 0.0,
            upsampled: [0.0; RNNOISE_FRAME_SIZE],
            denoised: [0.0; RNNOISE_FRAME_SIZE],
        }
    }

    /// Linear gain of the attenuation floor.
    pub fn floor(&self) -> f32 {
        self.floor
    }

    /// Factory producing a fresh suppressor for every session.
    pub fn factory() -> SuppressorFactory {
        std::sync::Arc::new(|db: i32| {
            Some(Box::new(RnnoiseSuppressor::new(db)) as Box<dyn NoiseSuppressor>)
        })
    }
}

impl NoiseSuppressor for RnnoiseSuppressor {
    fn process_segment(&mut self, segment: &mut [f32]) {
        // Anything but a full 10 ms segment cannot be mapped onto one frame.
        if segment.len() != SEGMENT_SIZE {
            log::debug!("skipping noise suppression for {}-sample segment", segment.len());
            return;
        }

        self.last_input = upsample(segment, self.last_input, &mut self.upsampled);
        self.denoiser
            .process_frame(&mut self.denoised, &self.upsampled);

        for (i, sample) in segment.iter_mut().enumerate() {
            let wet = self.denoised[i * RATE_RATIO + RATE_RATIO - 1];
            let dry = *sample;
            *sample = wet + self.floor * (dry - wet);
        }
    }
}

fn db_to_gain(db: i32) -> f32 {
    10f32.powf(db.min(0) as f32 / 20.0)
}

/// Linear interpolation ×3, continuing from the previous segment's last
/// sample. Every third output lands exactly on an input sample.
/// Returns the new last input.
fn upsample(input: &[f32], previous: f32, out: &mut [f32]) -> f32 {
    let mut prev = previous;
    for (i, &x) in input.iter().enumerate() {
        for k in 0..RATE_RATIO {
            let t = (k + 1) as f32 / RATE_RATIO as f32;
            out[i * RATE_RATIO + k] = prev + (x - prev) * t;
        }
        prev = x;
    }
    prev
}
