use crate::models::device::{AudioEndpoint, DeviceIndex, DevicePair, Direction};
use crate::models::error::MicDspError;
use crate::traits::endpoint_enumerator::{EndpointEnumerator, ResolveDevices};

/// Maps configured endpoint IDs to positional indices among active endpoints.
///
/// Always returns a concrete index. When the configured ID is missing,
/// unknown, or inactive, the system default endpoint is looked up
/// explicitly and its position returned, because the echo canceller picks
/// the wrong devices when only one of its two slots says "default".
pub struct DeviceResolver<E: EndpointEnumerator> {
    enumerator: E,
}

impl<E: EndpointEnumerator> DeviceResolver<E> {
    pub fn new(enumerator: E) -> Self {
        Self { enumerator }
    }

    pub fn resolve(
        &self,
        configured_id: Option<&str>,
        direction: Direction,
    ) -> Result<DeviceIndex, MicDspError> {
        let endpoints = self.enumerator.active_endpoints(direction)?;
        if endpoints.is_empty() {
            return Err(MicDspError::DeviceResolution(format!(
                "no active {} endpoints",
                direction
            )));
        }

        if let Some(id) = configured_id {
            if let Some(pos) = position_of(&endpoints, id) {
                let index = to_index(pos, direction)?;
                log::info!("using {} device: {}", direction, endpoints[pos].name);
                return Ok(index);
            }
            log::warn!(
                "configured {} device '{}' is not active, falling back to default",
                direction,
                id
            );
        }

        let default_id = self.enumerator.default_endpoint_id(direction)?;
        let pos = position_of(&endpoints, &default_id).ok_or_else(|| {
            MicDspError::DeviceResolution(format!(
                "default {} endpoint '{}' is not among active endpoints",
                direction, default_id
            ))
        })?;
        let index = to_index(pos, direction)?;
        log::info!(
            "using {} device: {} (default)",
            direction,
            endpoints[pos].name
        );
        Ok(index)
    }
}

impl<E: EndpointEnumerator> ResolveDevices for DeviceResolver<E> {
    fn resolve_pair(
        &self,
        mic_id: Option<&str>,
        playback_id: Option<&str>,
    ) -> Result<DevicePair, MicDspError> {
        let mic = self.resolve(mic_id, Direction::Capture)?;
        let render = self.resolve(playback_id, Direction::Render)?;
        Ok(DevicePair { mic, render })
    }
}

fn position_of(endpoints: &[AudioEndpoint], id: &str) -> Option<usize> {
    endpoints.iter().position(|e| e.id == id)
}

fn to_index(pos: usize, direction: Direction) -> Result<DeviceIndex, MicDspError> {
    u16::try_from(pos).map(DeviceIndex).map_err(|_| {
        MicDspError::DeviceResolution(format!("{} endpoint index {} out of range", direction, pos))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEnumerator;

    fn resolver() -> DeviceResolver<FakeEnumerator> {
        DeviceResolver::new(
            FakeEnumerator::new()
                .with_capture(&["mic-a", "mic-b", "mic-c"], "mic-b")
                .with_render(&["spk-a", "spk-b"], "spk-a"),
        )
    }

    #[test]
    fn configured_active_endpoint_wins() {
        let r = resolver();
        assert_eq!(r.resolve(Some("mic-c"), Direction::Capture).unwrap(), DeviceIndex(2));
        assert_eq!(r.resolve(Some("spk-b"), Direction::Render).unwrap(), DeviceIndex(1));
    }

    #[test]
    fn missing_id_falls_back_to_default_position() {
        let r = resolver();
        assert_eq!(r.resolve(None, Direction::Capture).unwrap(), DeviceIndex(1));
        assert_eq!(r.resolve(None, Direction::Render).unwrap(), DeviceIndex(0));
    }

    #[test]
    fn unknown_id_falls_back_to_default_position() {
        let r = resolver();
        assert_eq!(
            r.resolve(Some("unplugged-mic"), Direction::Capture).unwrap(),
            DeviceIndex(1)
        );
    }

    #[test]
    fn no_active_endpoints_is_an_error() {
        let r = DeviceResolver::new(FakeEnumerator::new().with_render(&["spk"], "spk"));
        assert!(matches!(
            r.resolve(None, Direction::Capture),
            Err(MicDspError::DeviceResolution(_))
        ));
    }

    #[test]
    fn enumeration_failure_propagates() {
        let r = DeviceResolver::new(FakeEnumerator::failing());
        assert!(matches!(
            r.resolve(Some("mic-a"), Direction::Capture),
            Err(MicDspError::DeviceResolution(_))
        ));
    }

    #[test]
    fn inactive_default_is_an_error() {
        let r = DeviceResolver::new(FakeEnumerator::new().with_capture(&["mic-a"], "mic-gone"));
        assert!(r.resolve(None, Direction::Capture).is_err());
    }

    #[test]
    fn resolves_pair_with_both_slots_concrete() {
        let pair = resolver().resolve_pair(None, Some("spk-b")).unwrap();
        assert_eq!(
            pair,
            DevicePair {
                mic: DeviceIndex(1),
                render: DeviceIndex(1),
            }
        );
    }
}
