//! Voice Capture DMO echo canceller.
//!
//! Wraps the system `CWMAudioAEC` DirectX Media Object in source mode: the
//! DMO captures the microphone itself, removes the echo of the selected
//! render endpoint, and hands back 16 kHz mono audio from `ProcessOutput`.

use std::mem::ManuallyDrop;

use windows::core::{Interface, GUID, PROPVARIANT};
use windows::Win32::Foundation::PROPERTYKEY;
use windows::Win32::Media::Audio::WAVEFORMATEX;
use windows::Win32::Media::DxMediaObjects::{
    IMediaBuffer, IMediaObject, MoFreeMediaType, MoInitMediaType, DMO_MEDIA_TYPE,
    DMO_OUTPUT_DATA_BUFFER, DMO_OUTPUT_DATA_BUFFERF_INCOMPLETE,
};
use windows::Win32::Media::MediaFoundation::{
    CLSID_CWMAudioAEC, MFPKEY_WMAAECMA_DEVICE_INDEXES, MFPKEY_WMAAECMA_FEATR_AGC,
    MFPKEY_WMAAECMA_FEATURE_MODE, MFPKEY_WMAAECMA_MIC_GAIN_BOUNDER, MFPKEY_WMAAECMA_SYSTEM_MODE,
    SINGLE_CHANNEL_AEC,
};
use windows::Win32::System::Com::{CoCreateInstance, CLSCTX_INPROC_SERVER};
use windows::Win32::UI::Shell::PropertiesSystem::IPropertyStore;

use mic_dsp_core::models::audio_models::{AudioFormat, SampleFormat};
use mic_dsp_core::models::chunk::{ChunkBuffer, ChunkOutput};
use mic_dsp_core::models::device::DevicePair;
use mic_dsp_core::models::error::{InitStage, MicDspError};
use mic_dsp_core::models::state::{EngineLifecycle, EngineState};
use mic_dsp_core::traits::echo_engine::EchoCancellationEngine;

use crate::com::ComApartment;
use crate::media_buffer::{self, MediaBuffer};

const MEDIATYPE_AUDIO: GUID = GUID::from_u128(0x73647561_0000_0010_8000_00aa00389b71);
const MEDIASUBTYPE_PCM: GUID = GUID::from_u128(0x00000001_0000_0010_8000_00aa00389b71);
const MEDIASUBTYPE_IEEE_FLOAT: GUID = GUID::from_u128(0x00000003_0000_0010_8000_00aa00389b71);
const FORMAT_WAVE_FORMAT_EX: GUID = GUID::from_u128(0x05589f81_c356_11ce_bf01_00aa0055595a);

const WAVE_FORMAT_PCM: u16 = 1;
const WAVE_FORMAT_IEEE_FLOAT: u16 = 3;

/// Everything that exists only between a successful `initialize` and `destroy`.
struct Streaming {
    dmo: IMediaObject,
    output: IMediaBuffer,
    resources_allocated: bool,
}

/// The Windows Voice Capture DMO as an `EchoCancellationEngine`.
///
/// One instance per session. `initialize` runs once; re-initializing
/// requires a new instance.
pub struct VoiceCaptureDmo {
    format: SampleFormat,
    lifecycle: EngineLifecycle,
    streaming: Option<Streaming>,
    _apartment: Option<ComApartment>,
}

// SAFETY: the DMO is created in the multithreaded apartment and is only used
// through `&mut self`, so no two threads ever call into it at once.
unsafe impl Send for VoiceCaptureDmo {}

impl VoiceCaptureDmo {
    pub fn new(format: SampleFormat) -> Self {
        Self {
            format,
            lifecycle: EngineLifecycle::new(),
            streaming: None,
            _apartment: None,
        }
    }

    fn configure(&mut self, devices: DevicePair) -> Result<(), MicDspError> {
        self._apartment = Some(ComApartment::enter()?);

        let dmo: IMediaObject = unsafe {
            CoCreateInstance(&CLSID_CWMAudioAEC, None, CLSCTX_INPROC_SERVER)
                .map_err(|e| MicDspError::engine_init(InitStage::CreateEngine, e))?
        };
        let format = AudioFormat::mono(self.format);
        let output = MediaBuffer::create(format.segment_bytes());
        // Stored before any further step so `destroy` releases it on failure.
        self.streaming = Some(Streaming {
            dmo: dmo.clone(),
            output,
            resources_allocated: false,
        });

        let store: IPropertyStore = dmo
            .cast()
            .map_err(|e| MicDspError::engine_init(InitStage::PropertyStore, e))?;

        // AEC only, no microphone array.
        set_property(
            &store,
            &MFPKEY_WMAAECMA_SYSTEM_MODE,
            PROPVARIANT::from(SINGLE_CHANNEL_AEC.0),
            InitStage::SystemMode,
        )?;
        set_property(
            &store,
            &MFPKEY_WMAAECMA_DEVICE_INDEXES,
            PROPVARIANT::from(devices.packed()),
            InitStage::DeviceIndexes,
        )?;
        // Feature mode unlocks the remaining properties.
        set_property(
            &store,
            &MFPKEY_WMAAECMA_FEATURE_MODE,
            PROPVARIANT::from(true),
            InitStage::FeatureMode,
        )?;
        set_property(
            &store,
            &MFPKEY_WMAAECMA_FEATR_AGC,
            PROPVARIANT::from(true),
            InitStage::AutomaticGainControl,
        )?;
        // Otherwise the DMO rewrites the OS mic volume.
        set_property(
            &store,
            &MFPKEY_WMAAECMA_MIC_GAIN_BOUNDER,
            PROPVARIANT::from(false),
            InitStage::MicGainBounder,
        )?;

        set_output_type(&dmo, &format)
            .map_err(|e| MicDspError::engine_init(InitStage::OutputFormat, e))?;
        self.lifecycle.advance(EngineState::Configured)?;

        unsafe { dmo.AllocateStreamingResources() }
            .map_err(|e| MicDspError::engine_init(InitStage::AllocateResources, e))?;
        if let Some(streaming) = self.streaming.as_mut() {
            streaming.resources_allocated = true;
        }
        self.lifecycle.advance(EngineState::Streaming)?;
        Ok(())
    }
}

impl EchoCancellationEngine for VoiceCaptureDmo {
    fn sample_format(&self) -> SampleFormat {
        self.format
    }

    fn state(&self) -> EngineState {
        self.lifecycle.state()
    }

    fn initialize(&mut self, devices: DevicePair) -> Result<(), MicDspError> {
        self.lifecycle.begin_initialize()?;
        log::debug!(
            "initializing Voice Capture DMO: mic={} render={} packed=0x{:08x}",
            devices.mic,
            devices.render,
            devices.packed()
        );
        if let Err(e) = self.configure(devices) {
            self.destroy();
            return Err(e);
        }
        Ok(())
    }

    fn produce_chunk(&mut self, buffer: &mut ChunkBuffer) -> Result<ChunkOutput, MicDspError> {
        let streaming = match (&self.streaming, self.lifecycle.state()) {
            (Some(streaming), EngineState::Streaming) => streaming,
            (_, state) => {
                return Err(MicDspError::InvalidState {
                    from: state,
                    operation: "produce a chunk from",
                })
            }
        };

        buffer.clear();
        unsafe { streaming.output.SetLength(0) }
            .map_err(|e| MicDspError::EngineRuntime(format!("resetting DMO output failed: {}", e)))?;
        let mut outputs = [DMO_OUTPUT_DATA_BUFFER {
            pBuffer: ManuallyDrop::new(Some(streaming.output.clone())),
            dwStatus: 0,
            rtTimestamp: 0,
            rtTimelength: 0,
        }];
        let mut status: u32 = 0;
        let result = unsafe { streaming.dmo.ProcessOutput(0, &mut outputs, &mut status) };
        let flags = outputs[0].dwStatus;
        unsafe { ManuallyDrop::drop(&mut outputs[0].pBuffer) };
        result.map_err(|e| MicDspError::EngineRuntime(format!("ProcessOutput failed: {}", e)))?;

        let written = media_buffer::drain_into(&streaming.output, buffer)
            .map_err(|e| MicDspError::EngineRuntime(format!("reading DMO output failed: {}", e)))?;

        let incomplete = flags & DMO_OUTPUT_DATA_BUFFERF_INCOMPLETE.0 as u32 != 0;
        if written == 0 && !incomplete {
            return Ok(ChunkOutput::NoDataNow);
        }
        Ok(ChunkOutput::Ready { incomplete })
    }

    fn destroy(&mut self) {
        if !self.lifecycle.mark_destroyed() {
            return;
        }
        if let Some(streaming) = self.streaming.take() {
            if streaming.resources_allocated {
                if let Err(e) = unsafe { streaming.dmo.FreeStreamingResources() } {
                    log::warn!("FreeStreamingResources failed: {}", e);
                }
            }
        }
        self._apartment = None;
        log::debug!("Voice Capture DMO released");
    }
}

impl Drop for VoiceCaptureDmo {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn set_property(
    store: &IPropertyStore,
    key: &PROPERTYKEY,
    value: PROPVARIANT,
    stage: InitStage,
) -> Result<(), MicDspError> {
    unsafe { store.SetValue(key, &value) }.map_err(|e| MicDspError::engine_init(stage, e))
}

/// Negotiate mono 16 kHz output in the configured encoding.
fn set_output_type(dmo: &IMediaObject, format: &AudioFormat) -> windows::core::Result<()> {
    let (subtype, tag) = match format.sample_format {
        SampleFormat::Pcm16 => (MEDIASUBTYPE_PCM, WAVE_FORMAT_PCM),
        SampleFormat::Float32 => (MEDIASUBTYPE_IEEE_FLOAT, WAVE_FORMAT_IEEE_FLOAT),
    };

    let mut mt = DMO_MEDIA_TYPE {
        majortype: MEDIATYPE_AUDIO,
        subtype,
        bFixedSizeSamples: true.into(),
        bTemporalCompression: false.into(),
        lSampleSize: 0,
        formattype: FORMAT_WAVE_FORMAT_EX,
        ..Default::default()
    };

    unsafe {
        MoInitMediaType(&mut mt, std::mem::size_of::<WAVEFORMATEX>() as u32)?;
        // MoInitMediaType allocates pbFormat with the requested size.
        let wav = mt.pbFormat as *mut WAVEFORMATEX;
        *wav = WAVEFORMATEX {
            wFormatTag: tag,
            nChannels: format.channels,
            nSamplesPerSec: format.sample_rate,
            nAvgBytesPerSec: format.avg_bytes_per_sec(),
            nBlockAlign: format.block_align(),
            wBitsPerSample: format.sample_format.bits_per_sample(),
            cbSize: 0,
        };
        let result = dmo.SetOutputType(0, Some(&mt), 0);
        let _ = MoFreeMediaType(&mut mt);
        result
    }
}
