//! # mic-dsp-core
//!
//! Platform-agnostic microphone conditioning core.
//!
//! Pulls echo-cancelled audio from an `EchoCancellationEngine`, applies mic
//! boost and push-to-talk gating, assembles fixed 10 ms segments, runs
//! noise suppression, and serves the result to a host through a pull-based
//! `AudioSource`. Platform backends (Windows Voice Capture DMO) implement
//! `EchoCancellationEngine` and `EndpointEnumerator`.
//!
//! ## Architecture
//!
//! ```text
//! mic-dsp-core (this crate)
//! ├── traits/       ← EchoCancellationEngine, EndpointEnumerator, NoiseSuppressor, host capabilities
//! ├── models/       ← MicDspError, EngineState, MicDspConfiguration, ChunkBuffer, DevicePair, etc.
//! ├── processing/   ← SignalConditioner, PushToTalkGate, SegmentAssembler, RnnoiseSuppressor
//! ├── devices/      ← DeviceResolver (configured ID → positional index)
//! └── session/      ← CaptureSession, pull adapter, MicDspPlugin (host lifecycle)
//! ```

pub mod devices;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use devices::resolver::DeviceResolver;
pub use models::audio_models::{AudioFormat, AudioSegment, Sample, SampleFormat, SampleSlice, SEGMENT_SIZE};
pub use models::chunk::{ChunkBuffer, ChunkOutput};
pub use models::config::MicDspConfiguration;
pub use models::device::{AudioEndpoint, DeviceIndex, DevicePair, Direction};
pub use models::error::{InitStage, MicDspError};
pub use models::state::{EngineLifecycle, EngineState};
pub use processing::conditioner::SignalConditioner;
pub use processing::noise_suppression::RnnoiseSuppressor;
pub use processing::push_to_talk::PushToTalkGate;
pub use processing::segment_assembler::SegmentAssembler;
pub use session::capture::{CaptureSession, PullDiagnostics, SOURCE_NAME};
pub use session::plugin::{MicDspPlugin, PLUGIN_DESCRIPTION, PLUGIN_NAME};
pub use traits::echo_engine::{EchoCancellationEngine, EngineFactory};
pub use traits::endpoint_enumerator::{EndpointEnumerator, ResolveDevices};
pub use traits::host::{AudioFilter, AudioSource, HostIntegration, HostServices, SegmentBuffer};
pub use traits::noise_suppressor::{NoiseSuppressor, SuppressorFactory};
