use crate::models::device::{AudioEndpoint, DevicePair, Direction};
use crate::models::error::MicDspError;

/// Platform endpoint listing consumed by `DeviceResolver`.
///
/// Implemented by:
/// - `DeviceEnumerator` (Windows MMDevice API)
pub trait EndpointEnumerator {
    /// Active endpoints for `direction`, in the platform's positional order.
    fn active_endpoints(&self, direction: Direction) -> Result<Vec<AudioEndpoint>, MicDspError>;

    /// Stable ID of the system default endpoint for `direction`.
    fn default_endpoint_id(&self, direction: Direction) -> Result<String, MicDspError>;
}

/// Maps configured device IDs to the index pair the engine needs.
pub trait ResolveDevices {
    fn resolve_pair(
        &self,
        mic_id: Option<&str>,
        playback_id: Option<&str>,
    ) -> Result<DevicePair, MicDspError>;
}
