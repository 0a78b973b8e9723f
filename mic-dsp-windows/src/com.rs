//! COM apartment membership for the calling thread.

use windows::Win32::Foundation::RPC_E_CHANGED_MODE;
use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_MULTITHREADED};

use mic_dsp_core::models::error::MicDspError;

/// Joins the multithreaded apartment for as long as it lives.
///
/// If the thread already lives in a single-threaded apartment the guard
/// does nothing; COM stays usable and must not be uninitialized by us.
pub struct ComApartment {
    owns_init: bool,
}

impl ComApartment {
    pub fn enter() -> Result<Self, MicDspError> {
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if hr == RPC_E_CHANGED_MODE {
            log::debug!("thread already in a single-threaded COM apartment");
            return Ok(Self { owns_init: false });
        }
        hr.ok()
            .map_err(|e| MicDspError::ConfigurationFailed(format!("CoInitializeEx failed: {}", e)))?;
        Ok(Self { owns_init: true })
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.owns_init {
            unsafe {
                CoUninitialize();
            }
        }
    }
}
