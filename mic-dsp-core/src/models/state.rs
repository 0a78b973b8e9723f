use super::error::MicDspError;

/// Echo-cancellation engine state machine.
///
/// State transitions (one-way; re-initialization needs a new instance):
/// ```text
/// uninitialized → configured → streaming
///        ↓             ↓           ↓
///        └──────────→ destroyed ←──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Configured,
    Streaming,
    Destroyed,
}

impl EngineState {
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }

    pub fn can_transition_to(&self, next: EngineState) -> bool {
        use EngineState::*;
        matches!(
            (self, next),
            (Uninitialized, Configured)
                | (Configured, Streaming)
                | (Uninitialized | Configured | Streaming, Destroyed)
        )
    }
}

/// Tracks an engine's state and rejects illegal transitions.
///
/// Every `EchoCancellationEngine` implementation embeds one so the
/// one-way rules live in a single place.
#[derive(Debug, Clone)]
pub struct EngineLifecycle {
    state: EngineState,
}

impl EngineLifecycle {
    pub fn new() -> Self {
        Self {
            state: EngineState::Uninitialized,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Checks that `initialize` may run. Only an untouched instance qualifies.
    pub fn begin_initialize(&self) -> Result<(), MicDspError> {
        match self.state {
            EngineState::Uninitialized => Ok(()),
            from => Err(MicDspError::InvalidState {
                from,
                operation: "initialize",
            }),
        }
    }

    pub fn advance(&mut self, next: EngineState) -> Result<(), MicDspError> {
        if !self.state.can_transition_to(next) {
            return Err(MicDspError::InvalidState {
                from: self.state,
                operation: match next {
                    EngineState::Configured => "configure",
                    EngineState::Streaming => "stream",
                    EngineState::Destroyed => "destroy",
                    EngineState::Uninitialized => "reset",
                },
            });
        }
        self.state = next;
        Ok(())
    }

    /// Moves to `Destroyed`. Returns `false` if it already was, so callers
    /// release their resources exactly once.
    pub fn mark_destroyed(&mut self) -> bool {
        if self.state.is_destroyed() {
            return false;
        }
        self.state = EngineState::Destroyed;
        true
    }
}

impl Default for EngineLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let mut lifecycle = EngineLifecycle::new();
        lifecycle.begin_initialize().unwrap();
        lifecycle.advance(EngineState::Configured).unwrap();
        lifecycle.advance(EngineState::Streaming).unwrap();
        assert!(lifecycle.state().is_streaming());
        assert!(lifecycle.mark_destroyed());
        assert!(lifecycle.state().is_destroyed());
    }

    #[test]
    fn configured_cannot_be_entered_twice() {
        let mut lifecycle = EngineLifecycle::new();
        lifecycle.advance(EngineState::Configured).unwrap();
        lifecycle.advance(EngineState::Streaming).unwrap();

        assert!(lifecycle.begin_initialize().is_err());
        assert_eq!(
            lifecycle.advance(EngineState::Configured),
            Err(MicDspError::InvalidState {
                from: EngineState::Streaming,
                operation: "configure",
            })
        );
    }

    #[test]
    fn destroyed_is_terminal() {
        let mut lifecycle = EngineLifecycle::new();
        assert!(lifecycle.mark_destroyed());
        assert!(!lifecycle.mark_destroyed());
        assert!(lifecycle.begin_initialize().is_err());
        assert!(lifecycle.advance(EngineState::Configured).is_err());
    }

    #[test]
    fn streaming_requires_configured() {
        assert!(!EngineState::Uninitialized.can_transition_to(EngineState::Streaming));
        assert!(!EngineState::Streaming.can_transition_to(EngineState::Configured));
        assert!(!EngineState::Destroyed.can_transition_to(EngineState::Destroyed));
    }
}
