//! # mic-dsp-windows
//!
//! Windows backends for mic-dsp.
//!
//! Provides:
//! - `VoiceCaptureDmo`: echo cancellation via the system Voice Capture DMO
//! - `DeviceEnumerator`: audio endpoint enumeration via MMDevice API
//! - `WindowsDeviceResolver`: configured endpoint IDs → DMO device indexes
//! - `MediaBuffer`: the `IMediaBuffer` the DMO writes into
//!
//! ## Platform Requirements
//! - Windows 7+ (Voice Capture DMO)
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use mic_dsp_core::{MicDspPlugin, RnnoiseSuppressor};
//! use mic_dsp_windows::{VoiceCaptureDmo, WindowsDeviceResolver};
//!
//! let mut plugin = MicDspPlugin::new(
//!     Arc::new(host),
//!     Box::new(WindowsDeviceResolver),
//!     Box::new(|format| Box::new(VoiceCaptureDmo::new(format))),
//!     Some(RnnoiseSuppressor::factory()),
//! );
//! plugin.on_start_stream(&config);
//! ```

#[cfg(target_os = "windows")]
pub mod com;
#[cfg(target_os = "windows")]
pub mod device_enumerator;
#[cfg(target_os = "windows")]
pub mod media_buffer;
#[cfg(target_os = "windows")]
pub mod voice_capture_dmo;

#[cfg(target_os = "windows")]
pub use device_enumerator::{DeviceEnumerator, WindowsDeviceResolver};
#[cfg(target_os = "windows")]
pub use media_buffer::MediaBuffer;
#[cfg(target_os = "windows")]
pub use voice_capture_dmo::VoiceCaptureDmo;
