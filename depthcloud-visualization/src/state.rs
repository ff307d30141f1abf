//! Keyboard-driven viewer state

/// Control state of the viewer loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    Running,
    SaveRequested,
    /// Terminal
    Stopped,
}

/// The single state object shared by the loop and the key handlers.
///
/// Key handlers are the only writers; the loop reads it once per iteration
/// and reports export completion through [`InteractiveState::finish_save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractiveState {
    state: ViewerState,
}

impl InteractiveState {
    pub fn new() -> Self {
        Self {
            state: ViewerState::Running,
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    /// False once stopped
    pub fn is_running(&self) -> bool {
        self.state != ViewerState::Stopped
    }

    pub fn save_requested(&self) -> bool {
        self.state == ViewerState::SaveRequested
    }

    /// `Running -> SaveRequested`. Returns whether the state changed.
    pub fn request_save(&mut self) -> bool {
        if self.state == ViewerState::Running {
            self.state = ViewerState::SaveRequested;
            true
        } else {
            false
        }
    }

    /// Any non-terminal state `-> Stopped`. Returns whether the state changed.
    pub fn request_exit(&mut self) -> bool {
        if self.state == ViewerState::Stopped {
            false
        } else {
            self.state = ViewerState::Stopped;
            true
        }
    }

    /// `SaveRequested -> Running`, whether the export succeeded or not
    pub fn finish_save(&mut self) {
        if self.state == ViewerState::SaveRequested {
            self.state = ViewerState::Running;
        }
    }
}

impl Default for InteractiveState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_running() {
        let state = InteractiveState::new();
        assert_eq!(state.state(), ViewerState::Running);
        assert!(state.is_running());
    }

    #[test]
    fn test_save_then_finish_returns_to_running() {
        let mut state = InteractiveState::new();
        assert!(state.request_save());
        assert!(state.save_requested());
        state.finish_save();
        assert_eq!(state.state(), ViewerState::Running);
    }

    #[test]
    fn test_repeated_save_is_single_request() {
        let mut state = InteractiveState::new();
        assert!(state.request_save());
        assert!(!state.request_save());
        assert_eq!(state.state(), ViewerState::SaveRequested);
    }

    #[test]
    fn test_exit_from_every_non_terminal_state() {
        let mut running = InteractiveState::new();
        assert!(running.request_exit());
        assert_eq!(running.state(), ViewerState::Stopped);

        let mut saving = InteractiveState::new();
        saving.request_save();
        assert!(saving.request_exit());
        assert_eq!(saving.state(), ViewerState::Stopped);
    }

    #[test]
    fn test_stopped_is_terminal() {
        let mut state = InteractiveState::new();
        state.request_exit();
        assert!(!state.request_save());
        state.finish_save();
        assert!(!state.request_exit());
        assert_eq!(state.state(), ViewerState::Stopped);
        assert!(!state.is_running());
    }
}
