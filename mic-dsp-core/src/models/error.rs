use std::fmt;

use thiserror::Error;

use super::state::EngineState;

/// The configuration step the echo-cancellation engine was on when it failed.
///
/// Carried for diagnostics only; callers treat every stage the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    CreateEngine,
    PropertyStore,
    SystemMode,
    DeviceIndexes,
    FeatureMode,
    AutomaticGainControl,
    MicGainBounder,
    OutputFormat,
    AllocateResources,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateEngine => "create engine",
            Self::PropertyStore => "query property store",
            Self::SystemMode => "set system mode",
            Self::DeviceIndexes => "set device indexes",
            Self::FeatureMode => "enable feature mode",
            Self::AutomaticGainControl => "enable automatic gain control",
            Self::MicGainBounder => "disable mic gain bounder",
            Self::OutputFormat => "set output format",
            Self::AllocateResources => "allocate streaming resources",
        };
        f.write_str(name)
    }
}

/// Errors produced by the microphone conditioning pipeline.
///
/// None of these cross the pull boundary: `AudioSource::next_buffer`
/// reports failure as `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MicDspError {
    /// Endpoint enumeration failed, or no active endpoint exists for a direction.
    #[error("device resolution failed: {0}")]
    DeviceResolution(String),

    #[error("engine initialization failed at '{stage}': {detail}")]
    EngineInit { stage: InitStage, detail: String },

    /// A single `produce_chunk` call failed outright (not merely drained).
    #[error("engine runtime failure: {0}")]
    EngineRuntime(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("cannot {operation} an engine in state {from:?}")]
    InvalidState {
        from: EngineState,
        operation: &'static str,
    },
}

impl MicDspError {
    pub fn engine_init(stage: InitStage, detail: impl fmt::Display) -> Self {
        Self::EngineInit {
            stage,
            detail: detail.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_init_message_names_stage() {
        let err = MicDspError::engine_init(InitStage::DeviceIndexes, "hr = 0x80070057");
        assert_eq!(
            err.to_string(),
            "engine initialization failed at 'set device indexes': hr = 0x80070057"
        );
    }
}
