use std::sync::Arc;

use crate::models::audio_models::{AudioFormat, Sample, SEGMENT_SIZE};
use crate::models::chunk::ChunkBuffer;
use crate::models::config::MicDspConfiguration;
use crate::models::device::DevicePair;
use crate::models::error::MicDspError;
use crate::models::state::EngineState;
use crate::processing::conditioner::SignalConditioner;
use crate::processing::push_to_talk::PushToTalkGate;
use crate::processing::segment_assembler::SegmentAssembler;
use crate::traits::echo_engine::EchoCancellationEngine;
use crate::traits::endpoint_enumerator::ResolveDevices;
use crate::traits::host::HostServices;
use crate::traits::noise_suppressor::{NoiseSuppressor, SuppressorFactory};

/// Name under which the session registers as a host audio source.
pub const SOURCE_NAME: &str = "Voice Capture DMO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Stopped,
}

/// Counters for debugging a running session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullDiagnostics {
    pub pulls: u64,
    pub skipped_pulls: u64,
    pub engine_chunks: u64,
    pub engine_failures: u64,
    pub silenced_chunks: u64,
    pub segments_delivered: u64,
    pub peak_buffered: usize,
}

/// The single owned instance of the conditioning pipeline.
///
/// Created on stream start, stopped (engine destroyed) on stream stop or
/// drop. Owned by the host integration layer, never shared between pulls.
///
/// Data flow per pull:
/// ```text
/// [Engine] → [ChunkBuffer] → decode → [SignalConditioner] → [SegmentAssembler]
///                                                                   ↓
///                         host ← segment ← [NoiseSuppressor] ← front segment
/// ```
pub struct CaptureSession<S: Sample> {
    pub(super) state: SessionState,
    pub(super) devices: DevicePair,
    pub(super) engine: Box<dyn EchoCancellationEngine>,
    pub(super) host: Arc<dyn HostServices>,
    pub(super) conditioner: SignalConditioner<S>,
    pub(super) assembler: SegmentAssembler<S>,
    pub(super) suppressor: Option<Box<dyn NoiseSuppressor>>,
    pub(super) suppress_scratch: Vec<f32>,
    /// Whether the suppressor already ran over the current front segment.
    pub(super) front_suppressed: bool,
    pub(super) chunk: ChunkBuffer,
    pub(super) decoded: Vec<S>,
    /// Set when the engine drained; the next pull must not touch the engine.
    pub(super) skip_next_pull: bool,
    pub(super) diagnostics: PullDiagnostics,
}

impl<S: Sample> CaptureSession<S> {
    /// Resolve devices, build a fresh suppressor, and bring the engine up.
    ///
    /// Every error here is fatal to the session; the engine is destroyed
    /// before returning it.
    pub fn start(
        config: &MicDspConfiguration,
        resolver: &dyn ResolveDevices,
        mut engine: Box<dyn EchoCancellationEngine>,
        host: Arc<dyn HostServices>,
        suppressors: Option<&SuppressorFactory>,
    ) -> Result<Self, MicDspError> {
        let config = config.clone().sanitized();

        let prepared = Self::prepare(&config, resolver, engine.as_ref());
        let devices = match prepared {
            Ok(devices) => devices,
            Err(e) => {
                engine.destroy();
                return Err(e);
            }
        };

        let suppressor = if config.noise_suppression {
            let built = suppressors.and_then(|factory| factory(config.noise_suppress_db));
            if built.is_none() {
                log::warn!("failed to create noise suppressor, continuing without post-gain noise removal");
            }
            built
        } else {
            None
        };

        if let Err(e) = engine.initialize(devices) {
            log::error!("echo canceller initialization failed: {}", e);
            engine.destroy();
            return Err(e);
        }

        let gate = Arc::new(PushToTalkGate::new(
            config.push_to_talk,
            config.push_to_talk_delay_ms as u64,
        ));
        let format = AudioFormat::mono(S::FORMAT);

        log::info!(
            "capture session started: mic={} render={} boost={} ptt={} noise_suppression={}",
            devices.mic,
            devices.render,
            config.mic_boost,
            config.push_to_talk,
            suppressor.is_some()
        );

        Ok(Self {
            state: SessionState::Active,
            devices,
            engine,
            host,
            conditioner: SignalConditioner::new(config.mic_boost_factor(), gate),
            assembler: SegmentAssembler::new(SEGMENT_SIZE),
            suppressor,
            suppress_scratch: Vec::with_capacity(SEGMENT_SIZE),
            front_suppressed: false,
            chunk: ChunkBuffer::with_capacity(format.segment_bytes()),
            decoded: Vec::with_capacity(SEGMENT_SIZE),
            skip_next_pull: false,
            diagnostics: PullDiagnostics::default(),
        })
    }

    fn prepare(
        config: &MicDspConfiguration,
        resolver: &dyn ResolveDevices,
        engine: &dyn EchoCancellationEngine,
    ) -> Result<DevicePair, MicDspError> {
        config.validate().map_err(MicDspError::ConfigurationFailed)?;
        if engine.sample_format() != S::FORMAT {
            return Err(MicDspError::ConfigurationFailed(format!(
                "engine produces {:?} but session expects {:?}",
                engine.sample_format(),
                S::FORMAT
            )));
        }
        if engine.state() != EngineState::Uninitialized {
            return Err(MicDspError::InvalidState {
                from: engine.state(),
                operation: "initialize",
            });
        }
        resolver.resolve_pair(
            config.mic_device_id.as_deref(),
            config.playback_device_id.as_deref(),
        )
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn devices(&self) -> DevicePair {
        self.devices
    }

    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    /// Gate to wire up to the host's push-to-talk hotkeys.
    pub fn push_to_talk(&self) -> Arc<PushToTalkGate> {
        Arc::clone(self.conditioner.gate())
    }

    pub fn has_noise_suppression(&self) -> bool {
        self.suppressor.is_some()
    }

    /// Samples held for the next segment(s).
    pub fn buffered_samples(&self) -> usize {
        self.assembler.buffered()
    }

    pub fn diagnostics(&self) -> PullDiagnostics {
        self.diagnostics.clone()
    }

    /// Tear down the engine. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if self.state == SessionState::Stopped {
            return;
        }
        self.engine.destroy();
        self.assembler.clear();
        self.front_suppressed = false;
        self.skip_next_pull = false;
        self.state = SessionState::Stopped;
        log::info!(
            "capture session stopped after {} segments ({} engine failures)",
            self.diagnostics.segments_delivered,
            self.diagnostics.engine_failures
        );
    }
}

impl<S: Sample> Drop for CaptureSession<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
