//! Observer registry with isolated invocation.
//!
//! Every registered observer sees every event of every process. An observer
//! that returns an error or panics is logged and skipped; the remaining
//! observers and the delivering task are unaffected.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};

use ralph_core::{ProcessObserver, StreamKind};
use tracing::warn;

/// Fan-out list of process observers.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: RwLock<Vec<Arc<dyn ProcessObserver>>>,
}

impl ObserverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer. Observers are invoked in registration order.
    pub fn register(&self, observer: Arc<dyn ProcessObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Arc<dyn ProcessObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Deliver one output line to every observer.
    pub fn emit_output(&self, project: &str, stream: StreamKind, line: &str) {
        for observer in self.snapshot() {
            match catch_unwind(AssertUnwindSafe(|| observer.on_output(project, stream, line))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(project = %project, error = %e, "Output observer failed");
                }
                Err(_) => {
                    warn!(project = %project, "Output observer panicked");
                }
            }
        }
    }

    /// Deliver an exit event to every observer.
    pub fn emit_exit(&self, project: &str, exit_code: i32) {
        for observer in self.snapshot() {
            match catch_unwind(AssertUnwindSafe(|| observer.on_exit(project, exit_code))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(project = %project, error = %e, "Exit observer failed");
                }
                Err(_) => {
                    warn!(project = %project, "Exit observer panicked");
                }
            }
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}

/// Adapts an output closure to the observer port.
pub(crate) struct OutputFn<F>(pub F);

impl<F> ProcessObserver for OutputFn<F>
where
    F: Fn(&str, StreamKind, &str) + Send + Sync,
{
    fn on_output(&self, project: &str, stream: StreamKind, line: &str) -> anyhow::Result<()> {
        (self.0)(project, stream, line);
        Ok(())
    }
}

/// Adapts an exit closure to the observer port.
pub(crate) struct ExitFn<F>(pub F);

impl<F> ProcessObserver for ExitFn<F>
where
    F: Fn(&str, i32) + Send + Sync,
{
    fn on_exit(&self, project: &str, exit_code: i32) -> anyhow::Result<()> {
        (self.0)(project, exit_code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Failing;
    impl ProcessObserver for Failing {
        fn on_output(&self, _: &str, _: StreamKind, _: &str) -> anyhow::Result<()> {
            anyhow::bail!("subscriber went away")
        }
    }

    struct Panicking;
    impl ProcessObserver for Panicking {
        fn on_exit(&self, _: &str, _: i32) -> anyhow::Result<()> {
            panic!("observer bug");
        }
    }

    #[test]
    fn test_failing_observers_are_isolated() {
        let registry = ObserverRegistry::new();
        let lines = Arc::new(Mutex::new(Vec::new()));
        let exits = Arc::new(Mutex::new(Vec::new()));

        registry.register(Arc::new(Failing));
        registry.register(Arc::new(Panicking));
        let sink = lines.clone();
        registry.register(Arc::new(OutputFn(move |p: &str, s: StreamKind, l: &str| {
            sink.lock().unwrap().push(format!("{p}/{s}/{l}"));
        })));
        let sink = exits.clone();
        registry.register(Arc::new(ExitFn(move |p: &str, code: i32| {
            sink.lock().unwrap().push((p.to_string(), code));
        })));

        registry.emit_output("alpha", StreamKind::Stderr, "boom");
        registry.emit_exit("alpha", 3);

        assert_eq!(registry.len(), 4);
        assert_eq!(*lines.lock().unwrap(), vec!["alpha/stderr/boom".to_string()]);
        assert_eq!(*exits.lock().unwrap(), vec![("alpha".to_string(), 3)]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ObserverRegistry::new();
        assert!(registry.is_empty());
        registry.emit_output("alpha", StreamKind::Stdout, "nobody listens");
    }
}
