/// Runs an enqueued notification job later, typically on a worker thread
/// (§4.E: "the dispatcher runs the handler later"). Grounded on
/// `automations::Executor`'s poll-driven job queue shape, simplified to the
/// single method a notifier needs.
pub trait Dispatcher: Send + Sync {
    fn enqueue(&self, job: Box<dyn FnOnce() + Send>);
}

/// A dispatcher that runs jobs inline, on the calling thread — the default
/// when an observer has no dispatcher set (§4.E: "otherwise the callback
/// runs synchronously on the producer's thread").
pub struct Inline;

impl Dispatcher for Inline {
    fn enqueue(&self, job: Box<dyn FnOnce() + Send>) {
        job();
    }
}
