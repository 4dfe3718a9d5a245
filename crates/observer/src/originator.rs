use std::cell::Cell;

thread_local! {
    /// The identity a producer attributes to operations on this thread
    /// (§4.E step 1: "a producer ... enters `notify` with the originator
    /// identity (from TLS owner)"). Default `0`, an id no real object or
    /// observer instance is ever assigned (`store`'s id counter starts at
    /// 1), so ordinary application-driven writes never accidentally
    /// collide with an `Observer::instance` and get suppressed.
    static CURRENT_ORIGINATOR: Cell<u64> = const { Cell::new(0) };
}

/// Reads the originator identity attributed to the calling thread.
pub fn current() -> u64 {
    CURRENT_ORIGINATOR.with(Cell::get)
}

/// Sets the calling thread's originator identity, returning the previous
/// value. A mount tags its own writes with its instance id this way so the
/// loopback suppression `notify` performs (`observer.instance == originator`)
/// catches its own echo instead of every other subscriber's.
pub fn set(id: u64) -> u64 {
    CURRENT_ORIGINATOR.with(|c| c.replace(id))
}

/// Runs `f` with the calling thread's originator identity temporarily set
/// to `id`, restoring whatever it was before on return (including on
/// panic, since the restore runs in a `Drop` guard rather than after `f`
/// returns normally).
pub fn with<R>(id: u64, f: impl FnOnce() -> R) -> R {
    struct Restore(u64);
    impl Drop for Restore {
        fn drop(&mut self) {
            CURRENT_ORIGINATOR.with(|c| c.set(self.0));
        }
    }
    let previous = set(id);
    let _restore = Restore(previous);
    f()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_to_zero() {
        assert_eq!(current(), 0);
    }

    #[test]
    fn with_restores_previous_value_on_return() {
        set(7);
        with(42, || assert_eq!(current(), 42));
        assert_eq!(current(), 7);
        set(0);
    }
}
