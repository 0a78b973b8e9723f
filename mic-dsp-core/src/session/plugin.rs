use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{AudioSegment, SampleFormat};
use crate::models::config::MicDspConfiguration;
use crate::models::error::MicDspError;
use crate::processing::push_to_talk::PushToTalkGate;
use crate::session::capture::{CaptureSession, PullDiagnostics, SOURCE_NAME};
use crate::traits::echo_engine::EngineFactory;
use crate::traits::endpoint_enumerator::ResolveDevices;
use crate::traits::host::{
    AudioFilter, FilterId, HostIntegration, HostServices, HotkeyCallback, HotkeyId,
    SharedAudioSource, SourceId,
};
use crate::traits::noise_suppressor::SuppressorFactory;

pub const PLUGIN_NAME: &str = "OBS microphone DSP plugin";
pub const PLUGIN_DESCRIPTION: &str =
    "Installs a DSP that automatically improves the quality of the microphone audio.";

/// Attached to the host's own mic source while a session runs so that only
/// the echo-cancelled stream reaches the output.
#[derive(Debug, Default)]
pub struct MicDiscardFilter;

impl AudioFilter for MicDiscardFilter {
    fn process(&mut self, _segment: AudioSegment) -> Option<AudioSegment> {
        None
    }
}

/// A running session in whichever sample format was configured.
#[derive(Clone)]
pub enum ActiveSession {
    Pcm16(Arc<Mutex<CaptureSession<i16>>>),
    Float32(Arc<Mutex<CaptureSession<f32>>>),
}

impl ActiveSession {
    pub fn sample_format(&self) -> SampleFormat {
        match self {
            Self::Pcm16(_) => SampleFormat::Pcm16,
            Self::Float32(_) => SampleFormat::Float32,
        }
    }

    /// Handle registered with the host as an audio source.
    pub fn shared(&self) -> SharedAudioSource {
        match self {
            Self::Pcm16(s) => Arc::clone(s) as SharedAudioSource,
            Self::Float32(s) => Arc::clone(s) as SharedAudioSource,
        }
    }

    pub fn gate(&self) -> Arc<PushToTalkGate> {
        match self {
            Self::Pcm16(s) => s.lock().push_to_talk(),
            Self::Float32(s) => s.lock().push_to_talk(),
        }
    }

    pub fn diagnostics(&self) -> PullDiagnostics {
        match self {
            Self::Pcm16(s) => s.lock().diagnostics(),
            Self::Float32(s) => s.lock().diagnostics(),
        }
    }

    pub fn stop(&self) {
        match self {
            Self::Pcm16(s) => s.lock().stop(),
            Self::Float32(s) => s.lock().stop(),
        }
    }
}

struct ActiveStream {
    session: ActiveSession,
    filter: FilterId,
    source: SourceId,
    hotkeys: Vec<HotkeyId>,
}

/// Host-facing lifecycle: builds a `CaptureSession` on stream start and
/// tears it down on stream stop.
///
/// At most one session exists at a time. Starting while a session is
/// active stops the old one first.
pub struct MicDspPlugin<H: HostIntegration + 'static> {
    host: Arc<H>,
    resolver: Box<dyn ResolveDevices>,
    engines: EngineFactory,
    suppressors: Option<SuppressorFactory>,
    active: Option<ActiveStream>,
}

impl<H: HostIntegration + 'static> MicDspPlugin<H> {
    pub fn new(
        host: Arc<H>,
        resolver: Box<dyn ResolveDevices>,
        engines: EngineFactory,
        suppressors: Option<SuppressorFactory>,
    ) -> Self {
        Self {
            host,
            resolver,
            engines,
            suppressors,
            active: None,
        }
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn description(&self) -> &'static str {
        PLUGIN_DESCRIPTION
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn session(&self) -> Option<&ActiveSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Start a session for `config`. Returns whether the stream now has an
    /// echo-cancelled mic source.
    pub fn on_start_stream(&mut self, config: &MicDspConfiguration) -> bool {
        self.on_stop_stream();

        if self.host.has_audio_source(SOURCE_NAME) {
            log::warn!("audio source '{}' already registered, not starting", SOURCE_NAME);
            return false;
        }
        if !self.host.mic_capture_enabled() {
            log::info!("microphone capture is disabled, not starting");
            return false;
        }

        let session = match self.start_session(config) {
            Ok(session) => session,
            Err(e) => {
                log::error!("{}, mic processing is NOT active", e);
                return false;
            }
        };

        let filter = self.host.add_mic_filter(Box::new(MicDiscardFilter));
        let source = self.host.add_audio_source(session.shared());
        let hotkeys = if config.push_to_talk {
            self.register_hotkeys(config, session.gate())
        } else {
            Vec::new()
        };

        log::info!(
            "supplying processed microphone audio ({:?}, {} push-to-talk hotkeys)",
            session.sample_format(),
            hotkeys.len()
        );
        self.active = Some(ActiveStream {
            session,
            filter,
            source,
            hotkeys,
        });
        true
    }

    /// Unregister everything and destroy the engine. Safe to call repeatedly.
    pub fn on_stop_stream(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        for id in active.hotkeys {
            self.host.unregister_hotkey(id);
        }
        self.host.remove_audio_source(active.source);
        self.host.remove_mic_filter(active.filter);
        active.session.stop();
        log::info!("stopped supplying processed microphone audio");
    }

    /// Mic volume is read from the host on every chunk.
    pub fn on_mic_volume_changed(&mut self, _level: f32, _muted: bool, _final_value: bool) {}

    fn start_session(
        &self,
        config: &MicDspConfiguration,
    ) -> Result<ActiveSession, MicDspError> {
        let host: Arc<dyn HostServices> = Arc::clone(&self.host) as Arc<dyn HostServices>;
        let engine = (self.engines)(config.sample_format);
        let suppressors = self.suppressors.as_ref();
        let resolver = self.resolver.as_ref();

        Ok(match config.sample_format {
            SampleFormat::Pcm16 => ActiveSession::Pcm16(Arc::new(Mutex::new(
                CaptureSession::start(config, resolver, engine, host, suppressors)?,
            ))),
            SampleFormat::Float32 => ActiveSession::Float32(Arc::new(Mutex::new(
                CaptureSession::start(config, resolver, engine, host, suppressors)?,
            ))),
        })
    }

    fn register_hotkeys(
        &self,
        config: &MicDspConfiguration,
        gate: Arc<PushToTalkGate>,
    ) -> Vec<HotkeyId> {
        let mut ids = Vec::new();
        for code in config.active_hotkeys() {
            let gate = Arc::clone(&gate);
            let host = Arc::clone(&self.host);
            let callback: HotkeyCallback =
                Arc::new(move |key_down| gate.on_hotkey(key_down, host.stream_time_ms()));
            match self.host.register_hotkey(code, callback) {
                Some(id) => ids.push(id),
                None => log::warn!("failed to register push-to-talk hotkey {}", code),
            }
        }
        ids
    }
}

impl<H: HostIntegration + 'static> Drop for MicDspPlugin<H> {
    fn drop(&mut self) {
        self.on_stop_stream();
    }
}
