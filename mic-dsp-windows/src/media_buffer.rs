//! Minimal `IMediaBuffer` the DMO writes its output into.

use std::cell::{Cell, UnsafeCell};

use windows::core::{implement, Result};
use windows::Win32::Foundation::{E_INVALIDARG, E_POINTER};
use windows::Win32::Media::DxMediaObjects::{IMediaBuffer, IMediaBuffer_Impl};

use mic_dsp_core::models::chunk::ChunkBuffer;

/// Fixed-capacity byte buffer handed to `IMediaObject::ProcessOutput`.
///
/// Created once per engine and reused for every call. Only the owning
/// engine and the DMO (during `ProcessOutput`, on the same thread) touch it.
#[implement(IMediaBuffer)]
pub struct MediaBuffer {
    data: UnsafeCell<Box<[u8]>>,
    length: Cell<u32>,
}

impl MediaBuffer {
    pub fn create(capacity: usize) -> IMediaBuffer {
        Self {
            data: UnsafeCell::new(vec![0u8; capacity].into_boxed_slice()),
            length: Cell::new(0),
        }
        .into()
    }

    fn max_length(&self) -> u32 {
        // SAFETY: the boxed slice is never reallocated after construction.
        let len = unsafe { (*self.data.get()).len() };
        u32::try_from(len).unwrap_or(u32::MAX)
    }
}

impl IMediaBuffer_Impl for MediaBuffer_Impl {
    fn SetLength(&self, cblength: u32) -> Result<()> {
        if cblength > self.max_length() {
            return Err(E_INVALIDARG.into());
        }
        self.length.set(cblength);
        Ok(())
    }

    fn GetMaxLength(&self) -> Result<u32> {
        Ok(self.max_length())
    }

    fn GetBufferAndLength(&self, ppbuffer: *mut *mut u8, pcblength: *mut u32) -> Result<()> {
        if ppbuffer.is_null() && pcblength.is_null() {
            return Err(E_POINTER.into());
        }
        unsafe {
            if !ppbuffer.is_null() {
                *ppbuffer = (*self.data.get()).as_mut_ptr();
            }
            if !pcblength.is_null() {
                *pcblength = self.length.get();
            }
        }
        Ok(())
    }
}

/// Move whatever the DMO wrote into `chunk` and empty `buffer` for the next call.
pub fn drain_into(buffer: &IMediaBuffer, chunk: &mut ChunkBuffer) -> Result<usize> {
    let mut data: *mut u8 = std::ptr::null_mut();
    let mut length: u32 = 0;
    unsafe {
        buffer.GetBufferAndLength(&mut data, &mut length)?;
        let copied = if data.is_null() || length == 0 {
            chunk.clear();
            0
        } else {
            let written = std::slice::from_raw_parts(data, length as usize);
            chunk.fill_from(written)
        };
        buffer.SetLength(0)?;
        Ok(copied)
    }
}
