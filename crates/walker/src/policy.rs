use metamodel::Modifier;

/// Boolean combinator applied between a walker's access mask and a member's
/// modifiers (§4.D "access mask + operator").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessOp {
    And,
    Or,
    Xor,
    Not,
}

#[derive(Clone, Copy, Debug)]
pub struct AccessPolicy {
    pub mask: Modifier,
    pub op: AccessOp,
}

impl AccessPolicy {
    /// The default policy: visit every member regardless of modifiers.
    pub fn all() -> AccessPolicy {
        AccessPolicy {
            mask: Modifier::NONE,
            op: AccessOp::Or,
        }
    }

    pub fn matches(&self, modifiers: Modifier) -> bool {
        match self.op {
            AccessOp::And => modifiers.contains(self.mask),
            AccessOp::Or => self.mask.is_empty() || modifiers.overlaps(self.mask),
            AccessOp::Xor => {
                let shared = modifiers.overlaps(self.mask);
                let only_one = (modifiers.0 ^ self.mask.0) != 0;
                shared != (!only_one)
            }
            AccessOp::Not => !modifiers.overlaps(self.mask),
        }
    }
}

/// Which members of a composite's key set a walker is interested in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyAction {
    All,
    KeysOnly,
    DataOnly,
}

/// How a walker treats an `OPTIONAL` member whose condition is unmet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OptionalAction {
    /// Skip members whose condition does not currently hold.
    OnlyIfSet,
    /// Always visit, regardless of condition.
    Always,
    /// Visit the member's address/slot even when absent, without
    /// dereferencing it (used by copy/free passes that need to zero a slot).
    PassThroughAddress,
}

/// Whether a walker follows an `Any` indirection into its concrete value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AliasAction {
    Follow,
    Ignore,
}

/// For union-shaped composites (a discriminator member plus case members):
/// visit only the active case, or all cases regardless of discriminator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnionCases {
    Discriminated,
    All,
}

/// The full set of policies a walker embeds (§4.D).
#[derive(Clone, Copy, Debug)]
pub struct Policy {
    pub access: AccessPolicy,
    pub key_action: KeyAction,
    pub optional_action: OptionalAction,
    pub alias_action: AliasAction,
    pub union_cases: UnionCases,
    /// Whether `metaprogram[BASE]` is set: visit base members before own
    /// members (§4.D: "iterates base first (if `metaprogram[BASE]` is set)").
    pub visit_base: bool,
}

impl Default for Policy {
    fn default() -> Policy {
        Policy {
            access: AccessPolicy::all(),
            key_action: KeyAction::All,
            optional_action: OptionalAction::OnlyIfSet,
            alias_action: AliasAction::Follow,
            union_cases: UnionCases::Discriminated,
            visit_base: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn access_and_requires_all_mask_bits() {
        let p = AccessPolicy {
            mask: Modifier::KEY | Modifier::OBSERVABLE,
            op: AccessOp::And,
        };
        assert!(p.matches(Modifier::KEY | Modifier::OBSERVABLE | Modifier::WRITABLE));
        assert!(!p.matches(Modifier::KEY));
    }

    #[test]
    fn access_not_excludes_overlap() {
        let p = AccessPolicy {
            mask: Modifier::PRIVATE,
            op: AccessOp::Not,
        };
        assert!(p.matches(Modifier::OBSERVABLE));
        assert!(!p.matches(Modifier::PRIVATE | Modifier::OBSERVABLE));
    }
}
