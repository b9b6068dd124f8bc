/// Readiness state of the texture load gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Loading { required: usize, completed: usize },
    Ready,
}

/// Barrier that flips to `Ready` exactly once, when every requested texture
/// has reported completion.
///
/// One gate is constructed per simulation run and handed to whatever
/// requests or completes loads. The required total must be registered with
/// [`AssetLoadGate::set_required`] before the first load is requested,
/// otherwise the completed count can catch up with a target that is still
/// rising.
pub struct AssetLoadGate {
    state: GateState,
    on_ready: Option<Box<dyn FnMut()>>,
    /// Load requests admitted so far.
    requested: usize,
    torn_down: bool,
}

impl AssetLoadGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Loading {
                required: 0,
                completed: 0,
            },
            on_ready: None,
            requested: 0,
            torn_down: false,
        }
    }

    /// Register the presentation callback invoked on the `Ready` transition.
    pub fn with_on_ready(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_ready = Some(Box::new(callback));
        self
    }

    /// Register the total number of textures that will be requested.
    pub fn set_required(&mut self, total: usize) {
        if let GateState::Loading { required, completed } = &mut self.state {
            debug_assert_eq!(
                *completed, 0,
                "texture total registered after loads started completing"
            );
            *required = total;
            log::debug!("asset gate expects {total} textures");
        }
    }

    /// Admit one outgoing load request.
    ///
    /// Returns `false` when the request is not covered by the registered
    /// total, e.g. because `set_required` has not been called yet.
    pub fn note_requested(&mut self) -> bool {
        let GateState::Loading { required, .. } = self.state else {
            return false;
        };
        if self.requested >= required {
            return false;
        }
        self.requested += 1;
        true
    }

    /// Number of load requests admitted so far.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Record one finished texture. Returns `true` if this call made the gate ready.
    pub fn notify_one_completed(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        let GateState::Loading { required, completed } = &mut self.state else {
            return false;
        };

        *completed += 1;
        if *required == 0 || *completed != *required {
            return false;
        }

        log::info!("all {} textures loaded", required);
        self.state = GateState::Ready;
        if let Some(mut callback) = self.on_ready.take() {
            callback();
        }
        true
    }

    /// Stop listening: later completions are ignored and the callback is dropped.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.on_ready = None;
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == GateState::Ready
    }

    /// Fraction of textures loaded, for a loading indicator.
    pub fn progress(&self) -> f64 {
        match self.state {
            GateState::Ready => 1.0,
            GateState::Loading { required: 0, .. } => 0.0,
            GateState::Loading { required, completed } => {
                (completed as f64 / required as f64).min(1.0)
            }
        }
    }
}

impl Default for AssetLoadGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AssetLoadGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoadGate")
            .field("state", &self.state)
            .field("requested", &self.requested)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_gate() -> (AssetLoadGate, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let gate = AssetLoadGate::new().with_on_ready(move || counter.set(counter.get() + 1));
        (gate, calls)
    }

    #[test]
    fn ready_after_required_completions() {
        let (mut gate, calls) = counting_gate();
        gate.set_required(3);

        assert!(!gate.notify_one_completed());
        assert!(!gate.notify_one_completed());
        assert!(!gate.is_ready());
        assert!(gate.notify_one_completed());

        assert!(gate.is_ready());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn spurious_completion_does_not_refire() {
        let (mut gate, calls) = counting_gate();
        gate.set_required(3);
        for _ in 0..4 {
            gate.notify_one_completed();
        }
        assert_eq!(gate.state(), GateState::Ready);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn never_ready_without_required_total() {
        let (mut gate, calls) = counting_gate();
        gate.notify_one_completed();
        assert_eq!(
            gate.state(),
            GateState::Loading {
                required: 0,
                completed: 1
            }
        );
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn requests_need_a_registered_total() {
        let mut gate = AssetLoadGate::new();
        assert!(!gate.note_requested());

        gate.set_required(2);
        assert!(gate.note_requested());
        assert!(gate.note_requested());
        assert!(!gate.note_requested());
        assert_eq!(gate.requested(), 2);
    }

    #[test]
    fn teardown_ignores_late_completions() {
        let (mut gate, calls) = counting_gate();
        gate.set_required(1);
        gate.teardown();
        assert!(!gate.notify_one_completed());
        assert!(!gate.is_ready());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn progress_tracks_completions() {
        let mut gate = AssetLoadGate::new();
        assert_eq!(gate.progress(), 0.0);
        gate.set_required(4);
        gate.notify_one_completed();
        assert_eq!(gate.progress(), 0.25);
        for _ in 0..3 {
            gate.notify_one_completed();
        }
        assert_eq!(gate.progress(), 1.0);
    }
}
