/// Object lifecycle state (§4.B). Corto models this as a bitmask; the three
/// states named in the spec's transition table are mutually exclusive at
/// any instant (`DECLARED` is cleared the moment `VALID` is set, and vice
/// versa on `invalidate`), so an enum expresses the same invariant without
/// letting an `Object` hold an invalid combination.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    Declared,
    Valid,
    Deleted,
}

impl State {
    /// Whether `self -> to` is one of the four edges in §4.B's transition
    /// table. `Deleted` has no outgoing edges; it is terminal.
    pub fn can_transition(self, to: State) -> bool {
        matches!(
            (self, to),
            (State::Declared, State::Valid)
                | (State::Declared, State::Deleted)
                | (State::Valid, State::Declared)
                | (State::Valid, State::Deleted)
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deleted_is_terminal() {
        assert!(!State::Deleted.can_transition(State::Declared));
        assert!(!State::Deleted.can_transition(State::Valid));
    }

    #[test]
    fn declared_cannot_go_directly_to_valid_twice() {
        assert!(State::Declared.can_transition(State::Valid));
        assert!(!State::Valid.can_transition(State::Valid));
    }
}
