use chrono::{DateTime, Utc};

/// A bound of a history window: either "now" (`fromNow`/`toNow`) or a fixed
/// instant (`fromTime`/`toTime`).
#[derive(Clone, Copy, Debug)]
pub enum TimeBound {
    Now,
    At(DateTime<Utc>),
}

/// The history-window portion of a query (§4.F: `fromNow`, `fromTime`,
/// `toNow`, `toTime`, `forDuration`, `slimit`, `soffset`).
#[derive(Clone, Debug, Default)]
pub struct HistoryWindow {
    pub from: Option<TimeBound>,
    pub to: Option<TimeBound>,
    pub for_duration: Option<chrono::Duration>,
    pub slimit: Option<usize>,
    pub soffset: Option<usize>,
}

impl HistoryWindow {
    /// True if this query asks for anything other than the live, current
    /// state — the distinction `yield_unknown`'s restriction to live
    /// queries (SPEC_FULL.md's Open Question Decision) is keyed on.
    pub fn is_historical(&self) -> bool {
        self.from.is_some() || self.to.is_some() || self.for_duration.is_some()
    }
}

/// The accumulated query state a [`crate::Select`] builds and a [`crate::
/// Dispatcher`] routes (§4.F).
#[derive(Clone, Debug, Default)]
pub struct Query {
    /// Pattern matched against child ids (not the full path) of each
    /// candidate result.
    pub expr: Option<String>,
    /// Scope the query runs from, relative to the caller's current scope
    /// unless it starts with `/`.
    pub from: String,
    pub content_type: Option<String>,
    pub offset: usize,
    pub limit: Option<usize>,
    pub type_filter: Option<String>,
    pub instanceof_filter: Option<String>,
    /// `instance(id)` restrictor (original-source supplement #3): exclude a
    /// specific instance id from results, e.g. a mount excluding itself.
    pub exclude_instance: Option<u64>,
    /// `mount(id)` restrictor: only route to the named mount.
    pub only_mount: Option<u64>,
    pub history: HistoryWindow,
    pub yield_unknown: bool,
}

impl Query {
    pub fn new(from: impl Into<String>) -> Query {
        Query {
            from: from.into(),
            ..Query::default()
        }
    }
}
