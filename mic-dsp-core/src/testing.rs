//! Scripted collaborators shared by the unit tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{AudioSegment, SampleFormat};
use crate::models::chunk::{ChunkBuffer, ChunkOutput};
use crate::models::device::{AudioEndpoint, DevicePair, Direction};
use crate::models::error::{InitStage, MicDspError};
use crate::models::state::{EngineLifecycle, EngineState};
use crate::traits::echo_engine::EchoCancellationEngine;
use crate::traits::endpoint_enumerator::EndpointEnumerator;
use crate::traits::host::{
    AudioFilter, FilterId, HostIntegration, HostServices, HotkeyCallback, HotkeyId,
    SharedAudioSource, SourceId,
};

/// One scripted reply of `ScriptedEngine::produce_chunk`.
#[derive(Debug, Clone)]
pub enum Step {
    Chunk { bytes: Vec<u8>, incomplete: bool },
    NoData,
    Fail,
}

impl Step {
    pub fn pcm(samples: &[i16], incomplete: bool) -> Self {
        Self::Chunk {
            bytes: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
            incomplete,
        }
    }

    pub fn float(samples: &[f32], incomplete: bool) -> Self {
        Self::Chunk {
            bytes: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
            incomplete,
        }
    }

    pub fn constant(value: i16, count: usize, incomplete: bool) -> Self {
        Self::pcm(&vec![value; count], incomplete)
    }
}

/// Counters observable after the engine has been boxed and moved away.
#[derive(Debug, Default)]
pub struct EngineProbe {
    pub produce_calls: AtomicUsize,
    pub releases: AtomicUsize,
    pub initialized_with: Mutex<Option<DevicePair>>,
}

impl EngineProbe {
    pub fn produce_calls(&self) -> usize {
        self.produce_calls.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// An echo canceller that replays a script.
pub struct ScriptedEngine {
    format: SampleFormat,
    lifecycle: EngineLifecycle,
    steps: Arc<Mutex<VecDeque<Step>>>,
    fail_init_at: Option<InitStage>,
    allocated: bool,
    probe: Arc<EngineProbe>,
}

impl ScriptedEngine {
    pub fn new(format: SampleFormat) -> Self {
        Self {
            format,
            lifecycle: EngineLifecycle::new(),
            steps: Arc::new(Mutex::new(VecDeque::new())),
            fail_init_at: None,
            allocated: false,
            probe: Arc::new(EngineProbe::default()),
        }
    }

    pub fn with_steps(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.lock().extend(steps);
        self
    }

    pub fn failing_at(mut self, stage: InitStage) -> Self {
        self.fail_init_at = Some(stage);
        self
    }

    pub fn probe(&self) -> Arc<EngineProbe> {
        Arc::clone(&self.probe)
    }

    /// Handle for appending steps after the engine has been handed off.
    pub fn script(&self) -> Arc<Mutex<VecDeque<Step>>> {
        Arc::clone(&self.steps)
    }
}

impl EchoCancellationEngine for ScriptedEngine {
    fn sample_format(&self) -> SampleFormat {
        self.format
    }

    fn state(&self) -> EngineState {
        self.lifecycle.state()
    }

    fn initialize(&mut self, devices: DevicePair) -> Result<(), MicDspError> {
        self.lifecycle.begin_initialize()?;
        self.allocated = true;
        if let Some(stage) = self.fail_init_at {
            self.destroy();
            return Err(MicDspError::engine_init(stage, "scripted failure"));
        }
        self.lifecycle.advance(EngineState::Configured)?;
        self.lifecycle.advance(EngineState::Streaming)?;
        *self.probe.initialized_with.lock() = Some(devices);
        Ok(())
    }

    fn produce_chunk(&mut self, buffer: &mut ChunkBuffer) -> Result<ChunkOutput, MicDspError> {
        self.probe.produce_calls.fetch_add(1, Ordering::SeqCst);
        if !self.lifecycle.state().is_streaming() {
            return Err(MicDspError::EngineRuntime("engine not streaming".into()));
        }
        let mut steps = self.steps.lock();
        match steps.pop_front() {
            Some(Step::Chunk { bytes, incomplete }) => {
                // Like the DMO: a full buffer leaves the rest pending.
                let written = buffer.fill_from(&bytes);
                if written < bytes.len() {
                    steps.push_front(Step::Chunk {
                        bytes: bytes[written..].to_vec(),
                        incomplete,
                    });
                    return Ok(ChunkOutput::Ready { incomplete: true });
                }
                Ok(ChunkOutput::Ready { incomplete })
            }
            Some(Step::Fail) => Err(MicDspError::EngineRuntime("scripted failure".into())),
            Some(Step::NoData) | None => {
                buffer.clear();
                Ok(ChunkOutput::NoDataNow)
            }
        }
    }

    fn destroy(&mut self) {
        if self.lifecycle.mark_destroyed() && self.allocated {
            self.allocated = false;
            self.probe.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Endpoint lists with a designated default per direction.
pub struct FakeEnumerator {
    capture: Vec<AudioEndpoint>,
    render: Vec<AudioEndpoint>,
    capture_default: String,
    render_default: String,
    fail: bool,
}

impl FakeEnumerator {
    pub fn new() -> Self {
        Self {
            capture: Vec::new(),
            render: Vec::new(),
            capture_default: String::new(),
            render_default: String::new(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_capture(mut self, ids: &[&str], default: &str) -> Self {
        self.capture = endpoints(ids, default, Direction::Capture);
        self.capture_default = default.into();
        self
    }

    pub fn with_render(mut self, ids: &[&str], default: &str) -> Self {
        self.render = endpoints(ids, default, Direction::Render);
        self.render_default = default.into();
        self
    }
}

fn endpoints(ids: &[&str], default: &str, direction: Direction) -> Vec<AudioEndpoint> {
    ids.iter()
        .map(|id| AudioEndpoint {
            id: id.to_string(),
            name: format!("Endpoint {}", id),
            direction,
            is_default: *id == default,
        })
        .collect()
}

impl EndpointEnumerator for FakeEnumerator {
    fn active_endpoints(&self, direction: Direction) -> Result<Vec<AudioEndpoint>, MicDspError> {
        if self.fail {
            return Err(MicDspError::DeviceResolution("audio subsystem unavailable".into()));
        }
        Ok(match direction {
            Direction::Capture => self.capture.clone(),
            Direction::Render => self.render.clone(),
        })
    }

    fn default_endpoint_id(&self, direction: Direction) -> Result<String, MicDspError> {
        if self.fail {
            return Err(MicDspError::DeviceResolution("audio subsystem unavailable".into()));
        }
        Ok(match direction {
            Direction::Capture => self.capture_default.clone(),
            Direction::Render => self.render_default.clone(),
        })
    }
}

/// Host with manually driven clocks and recorded registrations.
pub struct FakeHost {
    mic_volume: Mutex<f32>,
    stream_time_ms: AtomicU64,
    audio_time: AtomicU64,
    mic_enabled: bool,
    next_id: AtomicU64,
    pub filters: Mutex<Vec<(FilterId, Box<dyn AudioFilter>)>>,
    pub sources: Mutex<Vec<(SourceId, String, SharedAudioSource)>>,
    pub hotkeys: Mutex<Vec<(HotkeyId, u32, HotkeyCallback)>>,
    foreign_sources: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            mic_volume: Mutex::new(1.0),
            stream_time_ms: AtomicU64::new(0),
            audio_time: AtomicU64::new(0),
            mic_enabled: true,
            next_id: AtomicU64::new(1),
            filters: Mutex::new(Vec::new()),
            sources: Mutex::new(Vec::new()),
            hotkeys: Mutex::new(Vec::new()),
            foreign_sources: Mutex::new(Vec::new()),
        }
    }

    pub fn without_mic() -> Self {
        Self {
            mic_enabled: false,
            ..Self::new()
        }
    }

    pub fn set_mic_volume(&self, volume: f32) {
        *self.mic_volume.lock() = volume;
    }

    pub fn set_stream_time_ms(&self, ms: u64) {
        self.stream_time_ms.store(ms, Ordering::SeqCst);
    }

    pub fn set_audio_time(&self, t: u64) {
        self.audio_time.store(t, Ordering::SeqCst);
    }

    /// Pretend some other plugin registered a source named `name`.
    pub fn add_foreign_source(&self, name: &str) {
        self.foreign_sources.lock().push(name.to_string());
    }

    /// Fire every callback registered for `code`.
    pub fn fire_hotkey(&self, code: u32, key_down: bool) {
        let callbacks: Vec<HotkeyCallback> = self
            .hotkeys
            .lock()
            .iter()
            .filter(|(_, c, _)| *c == code)
            .map(|(_, _, cb)| Arc::clone(cb))
            .collect();
        for cb in callbacks {
            cb(key_down);
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl HostServices for FakeHost {
    fn mic_volume(&self) -> f32 {
        *self.mic_volume.lock()
    }

    fn stream_time_ms(&self) -> u64 {
        self.stream_time_ms.load(Ordering::SeqCst)
    }

    fn audio_time(&self) -> u64 {
        self.audio_time.load(Ordering::SeqCst)
    }
}

impl HostIntegration for FakeHost {
    fn mic_capture_enabled(&self) -> bool {
        self.mic_enabled
    }

    fn has_audio_source(&self, name: &str) -> bool {
        self.foreign_sources.lock().iter().any(|n| n == name)
            || self.sources.lock().iter().any(|(_, n, _)| n == name)
    }

    fn add_mic_filter(&self, filter: Box<dyn AudioFilter>) -> FilterId {
        let id = FilterId(self.next_id());
        self.filters.lock().push((id, filter));
        id
    }

    fn remove_mic_filter(&self, id: FilterId) {
        self.filters.lock().retain(|(f, _)| *f != id);
    }

    fn add_audio_source(&self, source: SharedAudioSource) -> SourceId {
        let id = SourceId(self.next_id());
        let name = source.lock().name().to_string();
        self.sources.lock().push((id, name, source));
        id
    }

    fn remove_audio_source(&self, id: SourceId) {
        self.sources.lock().retain(|(s, _, _)| *s != id);
    }

    fn register_hotkey(&self, code: u32, callback: HotkeyCallback) -> Option<HotkeyId> {
        let id = HotkeyId(self.next_id());
        self.hotkeys.lock().push((id, code, callback));
        Some(id)
    }

    fn unregister_hotkey(&self, id: HotkeyId) {
        self.hotkeys.lock().retain(|(h, _, _)| *h != id);
    }
}

/// A host mic segment for filter tests.
pub fn mic_segment(len: usize) -> AudioSegment {
    AudioSegment {
        samples: vec![0.25; len],
        timestamp: 42,
    }
}
