//! Windows audio endpoint enumeration via the MMDevice API.
//!
//! Wraps `IMMDeviceEnumerator` to list active capture and render endpoints
//! with friendly names, in the positional order the Voice Capture DMO uses
//! for its device indexes.

use windows::core::PWSTR;
use windows::Win32::Devices::FunctionDiscovery::PKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::{
    eCapture, eConsole, eRender, EDataFlow, IMMDevice, IMMDeviceEnumerator, MMDeviceEnumerator,
    DEVICE_STATE_ACTIVE,
};
use windows::Win32::System::Com::{CoCreateInstance, CoTaskMemFree, CLSCTX_ALL, STGM_READ};

use mic_dsp_core::devices::resolver::DeviceResolver;
use mic_dsp_core::models::device::{AudioEndpoint, DevicePair, Direction};
use mic_dsp_core::models::error::MicDspError;
use mic_dsp_core::traits::endpoint_enumerator::{EndpointEnumerator, ResolveDevices};

use crate::com::ComApartment;

/// Audio endpoint enumerator using the Windows MMDevice API.
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl DeviceEnumerator {
    /// Create a new endpoint enumerator.
    ///
    /// Requires COM to be initialized on the calling thread.
    pub fn new() -> Result<Self, MicDspError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL).map_err(|e| {
                    MicDspError::DeviceResolution(format!("failed to create enumerator: {}", e))
                })?;
            Ok(Self { enumerator })
        }
    }

    fn default_id(&self, data_flow: EDataFlow) -> Result<String, MicDspError> {
        unsafe {
            let device = self
                .enumerator
                .GetDefaultAudioEndpoint(data_flow, eConsole)
                .map_err(|e| {
                    MicDspError::DeviceResolution(format!("no default endpoint: {}", e))
                })?;
            device_id(&device)
        }
    }

    fn list(&self, direction: Direction) -> Result<Vec<AudioEndpoint>, MicDspError> {
        let data_flow = data_flow(direction);
        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(data_flow, DEVICE_STATE_ACTIVE)
                .map_err(|e| {
                    MicDspError::DeviceResolution(format!("EnumAudioEndpoints failed: {}", e))
                })?;

            let count = collection
                .GetCount()
                .map_err(|e| MicDspError::DeviceResolution(format!("GetCount failed: {}", e)))?;

            let default_id = self.default_id(data_flow).ok();

            // Every position must be kept, even for devices we cannot
            // describe, or the indexes drift from what the DMO sees.
            let mut endpoints = Vec::with_capacity(count as usize);
            for i in 0..count {
                let device = collection.Item(i).map_err(|e| {
                    MicDspError::DeviceResolution(format!("endpoint {} unavailable: {}", i, e))
                })?;
                let id = device_id(&device)?;
                let name = friendly_name(&device).unwrap_or_else(|| format!("Device {}", i));
                let is_default = default_id.as_deref() == Some(id.as_str());

                endpoints.push(AudioEndpoint {
                    id,
                    name,
                    direction,
                    is_default,
                });
            }
            Ok(endpoints)
        }
    }
}

impl EndpointEnumerator for DeviceEnumerator {
    fn active_endpoints(&self, direction: Direction) -> Result<Vec<AudioEndpoint>, MicDspError> {
        self.list(direction)
    }

    fn default_endpoint_id(&self, direction: Direction) -> Result<String, MicDspError> {
        self.default_id(data_flow(direction))
    }
}

/// Resolves device pairs against a fresh MMDevice snapshot on every call.
///
/// Endpoints come and go between streams, so nothing is cached.
#[derive(Debug, Default)]
pub struct WindowsDeviceResolver;

impl ResolveDevices for WindowsDeviceResolver {
    fn resolve_pair(
        &self,
        mic_id: Option<&str>,
        playback_id: Option<&str>,
    ) -> Result<DevicePair, MicDspError> {
        let _com = ComApartment::enter()?;
        DeviceResolver::new(DeviceEnumerator::new()?).resolve_pair(mic_id, playback_id)
    }
}

fn data_flow(direction: Direction) -> EDataFlow {
    match direction {
        Direction::Capture => eCapture,
        Direction::Render => eRender,
    }
}

fn device_id(device: &IMMDevice) -> Result<String, MicDspError> {
    unsafe {
        let raw: PWSTR = device
            .GetId()
            .map_err(|e| MicDspError::DeviceResolution(format!("GetId failed: {}", e)))?;
        let id = raw.to_string();
        CoTaskMemFree(Some(raw.0 as *const _));
        id.map_err(|e| MicDspError::DeviceResolution(format!("endpoint ID is not UTF-16: {}", e)))
    }
}

/// Read the PKEY_Device_FriendlyName property from a device.
fn friendly_name(device: &IMMDevice) -> Option<String> {
    unsafe {
        let store = device.OpenPropertyStore(STGM_READ).ok()?;
        let value = store.GetValue(&PKEY_Device_FriendlyName).ok()?;
        let name = value.to_string();
        (!name.is_empty()).then_some(name)
    }
}
