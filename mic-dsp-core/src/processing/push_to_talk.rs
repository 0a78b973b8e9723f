use parking_lot::Mutex;

#[derive(Debug, Default)]
struct GateState {
    keys_down: u32,
    closes_at_ms: u64,
}

/// Push-to-talk gate shared between the hotkey callback and the audio thread.
///
/// Muted iff enabled, no key is held, and the stream clock has reached the
/// closing deadline. The deadline is only written on the transition from
/// one held key to none.
#[derive(Debug)]
pub struct PushToTalkGate {
    enabled: bool,
    release_delay_ms: u64,
    state: Mutex<GateState>,
}

impl PushToTalkGate {
    pub fn new(enabled: bool, release_delay_ms: u64) -> Self {
        Self {
            enabled,
            release_delay_ms,
            state: Mutex::new(GateState::default()),
        }
    }

    /// A gate that never mutes.
    pub fn disabled() -> Self {
        Self::new(false, 0)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn release_delay_ms(&self) -> u64 {
        self.release_delay_ms
    }

    pub fn keys_down(&self) -> u32 {
        self.state.lock().keys_down
    }

    pub fn key_down(&self) {
        let mut s = self.state.lock();
        s.keys_down = s.keys_down.saturating_add(1);
    }

    /// A key was released at stream time `now_ms`.
    pub fn key_up(&self, now_ms: u64) {
        let mut s = self.state.lock();
        match s.keys_down {
            0 => log::warn!("push-to-talk key released without a matching press"),
            1 => {
                s.keys_down = 0;
                s.closes_at_ms = now_ms.saturating_add(self.release_delay_ms);
            }
            _ => s.keys_down -= 1,
        }
    }

    /// Dispatch a host hotkey notification.
    pub fn on_hotkey(&self, key_down: bool, now_ms: u64) {
        if key_down {
            self.key_down();
        } else {
            self.key_up(now_ms);
        }
    }

    pub fn is_muted(&self, now_ms: u64) -> bool {
        if !self.enabled {
            return false;
        }
        let s = self.state.lock();
        s.keys_down == 0 && now_ms >= s.closes_at_ms
    }
}
