use crate::models::audio_models::{decode_samples, AudioFormat, Sample, SEGMENT_SIZE};
use crate::processing::conditioner::Conditioning;
use crate::session::capture::{CaptureSession, SOURCE_NAME};
use crate::traits::host::{AudioSource, SegmentBuffer};
use crate::traits::noise_suppressor::NoiseSuppressor;

impl<S: Sample> AudioSource for CaptureSession<S> {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn format(&self) -> AudioFormat {
        AudioFormat::mono(S::FORMAT)
    }

    /// Pull engine output until a full segment is buffered.
    ///
    /// When the engine reports it has nothing more right now, the following
    /// pull returns `None` without calling it at all. Pulling the engine
    /// immediately after it drained produces glitches.
    fn next_buffer(&mut self) -> Option<SegmentBuffer<'_>> {
        if !self.is_active() {
            return None;
        }
        self.diagnostics.pulls += 1;

        if self.skip_next_pull {
            self.skip_next_pull = false;
            self.diagnostics.skipped_pulls += 1;
            return None;
        }

        while !self.assembler.has_full_segment() {
            self.chunk.clear();
            let output = match self.engine.produce_chunk(&mut self.chunk) {
                Ok(output) => output,
                Err(e) => {
                    self.diagnostics.engine_failures += 1;
                    log::debug!(
                        "echo canceller produced no output ({} failures so far): {}",
                        self.diagnostics.engine_failures,
                        e
                    );
                    return None;
                }
            };

            self.ingest_chunk();

            if output.is_drained() {
                self.skip_next_pull = true;
                break;
            }
        }

        if !self.assembler.has_full_segment() {
            return None;
        }

        if !self.front_suppressed {
            if let (Some(suppressor), Some(segment)) =
                (self.suppressor.as_mut(), self.assembler.segment_mut())
            {
                suppress_segment(&mut **suppressor, segment, &mut self.suppress_scratch);
            }
            self.front_suppressed = true;
        }

        let timestamp = self.host.audio_time();
        self.diagnostics.segments_delivered += 1;
        let samples = self.assembler.take_segment()?;
        Some(SegmentBuffer {
            samples: S::as_slice(samples),
            frames: samples.len(),
            timestamp,
        })
    }

    fn release_buffer(&mut self) {
        if self.assembler.has_full_segment() {
            self.assembler.consume_front(SEGMENT_SIZE);
        }
        self.front_suppressed = false;
    }
}

impl<S: Sample> CaptureSession<S> {
    /// Decode the current chunk, condition it, and append it to the assembler.
    fn ingest_chunk(&mut self) {
        if self.chunk.is_empty() {
            return;
        }
        self.diagnostics.engine_chunks += 1;

        decode_samples(self.chunk.as_bytes(), &mut self.decoded);
        let applied = self.conditioner.condition(
            &mut self.decoded,
            self.host.mic_volume(),
            self.host.stream_time_ms(),
        );
        if applied == Conditioning::Silenced {
            self.diagnostics.silenced_chunks += 1;
        }

        self.assembler.append(&self.decoded);
        self.diagnostics.peak_buffered = self.diagnostics.peak_buffered.max(self.assembler.buffered());
    }
}

/// Run one segment through the suppressor on the i16 scale.
fn suppress_segment<S: Sample>(
    suppressor: &mut dyn NoiseSuppressor,
    segment: &mut [S],
    scratch: &mut Vec<f32>,
) {
    scratch.clear();
    scratch.extend(segment.iter().map(|s| s.to_pcm_scale()));
    suppressor.process_segment(scratch);
    for (sample, &denoised) in segment.iter_mut().zip(scratch.iter()) {
        *sample = S::from_pcm_scale(denoised);
    }
}
