use observer::Notification;
use std::sync::Mutex;

struct AlignState {
    aligning: bool,
    queue: Vec<Notification>,
}

/// Per-subscriber alignment guard (§4.F): while a new subscriber's initial
/// synthetic `DEFINE`s are still being delivered, live events landing on the
/// same observer are held here instead of interleaving with alignment, then
/// replayed in arrival order once alignment completes. `aligning` and
/// `queue` share one lock so a notification can never land in the gap
/// between "alignment ended" and "queue drained" (the two would race under
/// separate atomics).
pub struct AlignGuard {
    state: Mutex<AlignState>,
}

impl AlignGuard {
    pub fn new() -> AlignGuard {
        AlignGuard {
            state: Mutex::new(AlignState {
                aligning: false,
                queue: Vec::new(),
            }),
        }
    }

    pub fn begin_align(&self) {
        self.state.lock().expect("align guard lock poisoned").aligning = true;
    }

    /// Queues `notification` if alignment is in progress and returns `None`;
    /// otherwise passes it straight through to the caller for delivery.
    pub fn hold_or_pass(&self, notification: Notification) -> Option<Notification> {
        let mut state = self.state.lock().expect("align guard lock poisoned");
        if state.aligning {
            state.queue.push(notification);
            None
        } else {
            Some(notification)
        }
    }

    /// Ends alignment and drains whatever arrived meanwhile, in order.
    pub fn end_align(&self) -> Vec<Notification> {
        let mut state = self.state.lock().expect("align guard lock poisoned");
        state.aligning = false;
        std::mem::take(&mut state.queue)
    }
}

impl Default for AlignGuard {
    fn default() -> Self {
        AlignGuard::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn note(id: u64) -> Notification {
        Notification {
            event: observer::Event::DEFINE,
            object_id: id,
            originator: 0,
        }
    }

    #[test]
    fn events_during_alignment_are_held_then_replayed_in_order() {
        let guard = AlignGuard::new();
        guard.begin_align();
        assert!(guard.hold_or_pass(note(1)).is_none());
        assert!(guard.hold_or_pass(note(2)).is_none());
        let replayed = guard.end_align();
        assert_eq!(replayed.iter().map(|n| n.object_id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn events_after_alignment_pass_straight_through() {
        let guard = AlignGuard::new();
        guard.begin_align();
        let _ = guard.end_align();
        assert!(guard.hold_or_pass(note(3)).is_some());
    }
}
