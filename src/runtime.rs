use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use prioicon_dom::{Document, MutationRecord};

use crate::debounce::{DebounceDelays, Debouncer};
use crate::engine::{Engine, ScanPass};
use crate::watcher::MutationWatcher;

/// Signals a page delivers to its runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The document has been parsed
    Ready,
    /// A batch of child-list mutations
    Mutations(Vec<MutationRecord>),
    /// Partial-page navigation finished replacing content
    NavigationComplete,
}

/// Host-side handle to one open page.
///
/// Dropping every `Page` handle closes the page and ends its runtime.
#[derive(Debug, Clone)]
pub struct Page {
    document: Arc<Mutex<Document>>,
    events: mpsc::UnboundedSender<PageEvent>,
}

impl Page {
    pub fn new(document: Document) -> (Self, mpsc::UnboundedReceiver<PageEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let page = Self {
            document: Arc::new(Mutex::new(document)),
            events,
        };
        (page, receiver)
    }

    pub fn document(&self) -> Arc<Mutex<Document>> {
        self.document.clone()
    }

    pub fn ready(&self) {
        self.send(PageEvent::Ready);
    }

    pub fn navigation_complete(&self) {
        self.send(PageEvent::NavigationComplete);
    }

    /// Apply a host edit, then deliver the mutations it produced as one batch.
    pub fn mutate<R>(&self, edit: impl FnOnce(&mut Document) -> R) -> R {
        let (result, records) = {
            let mut doc = lock(&self.document);
            let result = edit(&mut doc);
            (result, doc.take_records())
        };
        if !records.is_empty() {
            self.send(PageEvent::Mutations(records));
        }
        result
    }

    /// Serialize the current document.
    pub fn html(&self) -> String {
        lock(&self.document).to_html()
    }

    fn send(&self, event: PageEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Page runtime has stopped, dropping event");
        }
    }
}

/// Lock the document, recovering it if a previous holder panicked.
pub fn lock(document: &Mutex<Document>) -> MutexGuard<'_, Document> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    /// Before the ready signal
    Waiting,
    Scanning,
    /// Watchers armed, nothing scheduled
    Idle,
    /// A debounced rescan is scheduled
    PendingRescan,
}

/// Counters accumulated over a page's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeStats {
    pub passes: usize,
    pub failed_passes: usize,
    pub replaced: usize,
    pub mutation_triggers: usize,
    pub navigation_triggers: usize,
    pub ignored_batches: usize,
}

/// Drives the engine for one page: initial pass on ready, then debounced
/// rescans on mutation and navigation triggers until the page closes.
pub struct PageRuntime<P: ScanPass = Engine> {
    engine: P,
    document: Arc<Mutex<Document>>,
    delays: DebounceDelays,
    watcher: MutationWatcher,
    debouncer: Debouncer,
    state: RuntimeState,
    stats: RuntimeStats,
}

impl<P: ScanPass> PageRuntime<P> {
    pub fn new(engine: P, page: &Page, delays: DebounceDelays) -> Self {
        Self {
            engine,
            document: page.document(),
            delays,
            watcher: MutationWatcher::new(),
            debouncer: Debouncer::new(),
            state: RuntimeState::Waiting,
            stats: RuntimeStats::default(),
        }
    }

    pub fn state(&self) -> RuntimeState {
        self.state
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    /// Run until every `Page` handle is dropped. A rescan still pending at
    /// that point is discarded.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<PageEvent>) -> RuntimeStats {
        loop {
            let deadline = self.debouncer.deadline();
            tokio::select! {
                biased;

                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if self.debouncer.fire(Instant::now()) {
                        self.run_pass();
                    }
                }
            }
        }

        self.debouncer.cancel();
        if self.debug() {
            tracing::info!(
                "Page closed after {} passes ({} replaced)",
                self.stats.passes,
                self.stats.replaced
            );
        }
        self.stats
    }

    /// React to one page event.
    pub fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Ready => {
                if self.state != RuntimeState::Waiting {
                    if self.debug() {
                        tracing::info!("Ignoring repeated ready signal");
                    }
                    return;
                }
                self.run_pass();
                self.watcher.arm();
            }
            PageEvent::Mutations(records) => self.handle_mutations(&records),
            PageEvent::NavigationComplete => {
                if self.state == RuntimeState::Waiting {
                    return;
                }
                self.stats.navigation_triggers += 1;
                self.schedule(self.delays.navigation);
            }
        }
    }

    fn handle_mutations(&mut self, records: &[MutationRecord]) {
        if !self.watcher.is_armed() {
            return;
        }
        let wants_rescan = {
            let doc = lock(&self.document);
            self.watcher.wants_rescan(&doc, records)
        };
        if wants_rescan {
            self.stats.mutation_triggers += 1;
            self.schedule(self.delays.mutation);
        } else {
            self.stats.ignored_batches += 1;
            if self.debug() {
                tracing::info!("Ignoring mutation batch of {} records", records.len());
            }
        }
    }

    fn schedule(&mut self, delay: std::time::Duration) {
        self.debouncer.trigger(Instant::now(), delay);
        self.state = RuntimeState::PendingRescan;
    }

    /// Run one pass. A pass that fails or panics is logged and never stops
    /// the runtime.
    fn run_pass(&mut self) {
        self.state = RuntimeState::Scanning;
        let (result, own_records) = {
            let mut doc = lock(&self.document);
            let engine = &self.engine;
            let result = panic::catch_unwind(AssertUnwindSafe(|| engine.scan(&mut doc)));
            (result, doc.take_records())
        };

        match result {
            Ok(Ok(report)) => {
                self.stats.passes += 1;
                self.stats.replaced += report.replaced;
                if self.debug() {
                    tracing::info!(
                        "Scan pass {}: {} roots{}, {} candidates, {} replaced, {} skipped",
                        self.stats.passes,
                        report.roots,
                        if report.used_fallback { " (body fallback)" } else { "" },
                        report.candidates,
                        report.replaced,
                        report.skipped()
                    );
                }
            }
            Ok(Err(e)) => {
                self.stats.failed_passes += 1;
                if self.debug() {
                    tracing::error!("Scan pass failed: {}", e);
                }
            }
            Err(payload) => {
                self.stats.failed_passes += 1;
                if self.debug() {
                    tracing::error!("Scan pass panicked: {}", panic_message(payload.as_ref()));
                }
            }
        }

        self.state = if self.debouncer.is_pending() {
            RuntimeState::PendingRescan
        } else {
            RuntimeState::Idle
        };

        // The pass's own insertions reach the watcher like any other batch.
        if !own_records.is_empty() {
            self.handle_mutations(&own_records);
        }
    }

    fn debug(&self) -> bool {
        self.engine.config().debug()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::engine::{ScanReport, ScanRoots};
    use crate::error::EngineError;
    use prioicon_core::PriorityConfiguration;
    use prioicon_dom::DomError;

    fn runtime(html: &str) -> (Page, PageRuntime) {
        let (page, _events) = Page::new(Document::parse_html(html));
        let engine = Engine::new(PriorityConfiguration::defaults(), ScanRoots::default());
        let runtime = PageRuntime::new(engine, &page, DebounceDelays::default());
        (page, runtime)
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_transitions() {
        let (page, mut runtime) = runtime("<body><p>Low</p></body>");
        assert_eq!(runtime.state(), RuntimeState::Waiting);

        runtime.handle_event(PageEvent::Ready);
        assert_eq!(runtime.state(), RuntimeState::Idle);
        assert_eq!(runtime.stats().passes, 1);
        // the first pass happens before the watcher is armed
        assert_eq!(runtime.stats().ignored_batches, 0);

        let records = page.mutate(|doc| {
            let body = doc.body().unwrap();
            doc.append_html(body, "<p>High</p>").unwrap();
            doc.take_records()
        });
        runtime.handle_event(PageEvent::Mutations(records));
        assert_eq!(runtime.state(), RuntimeState::PendingRescan);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_before_ready_ignored() {
        let (_page, mut runtime) = runtime("<body><p>Low</p></body>");
        runtime.handle_event(PageEvent::NavigationComplete);
        runtime.handle_event(PageEvent::Mutations(Vec::new()));

        assert_eq!(runtime.state(), RuntimeState::Waiting);
        assert_eq!(runtime.stats(), &RuntimeStats::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_ready_runs_once() {
        let (_page, mut runtime) = runtime("<body><p>Low</p></body>");
        runtime.handle_event(PageEvent::Ready);
        runtime.handle_event(PageEvent::Ready);
        assert_eq!(runtime.stats().passes, 1);
    }

    enum Failure {
        Error,
        Panic,
    }

    /// Fails its first `remaining` passes, then scans normally.
    struct FlakyPass {
        engine: Engine,
        failure: Failure,
        remaining: AtomicUsize,
    }

    impl ScanPass for FlakyPass {
        fn scan(&self, doc: &mut Document) -> Result<ScanReport, EngineError> {
            if self.remaining.load(Ordering::SeqCst) > 0 {
                self.remaining.fetch_sub(1, Ordering::SeqCst);
                match self.failure {
                    Failure::Error => {
                        return Err(EngineError::Dom(DomError::NodeNotFound(doc.root())))
                    }
                    Failure::Panic => panic!("scan pass blew up"),
                }
            }
            self.engine.scan(doc)
        }

        fn config(&self) -> &PriorityConfiguration {
            self.engine.config()
        }
    }

    async fn recovers_after(failure: Failure) -> RuntimeStats {
        let (page, events) = Page::new(Document::parse_html("<body><p>Low</p></body>"));
        let pass = FlakyPass {
            engine: Engine::new(PriorityConfiguration::defaults(), ScanRoots::default()),
            failure,
            remaining: AtomicUsize::new(1),
        };
        let handle = tokio::spawn(PageRuntime::new(pass, &page, DebounceDelays::default()).run(events));

        page.ready();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(page.html().contains("<p>Low</p>"));

        page.mutate(|doc| {
            let body = doc.body().unwrap();
            doc.append_html(body, "<p>High</p>").unwrap();
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        let html = page.html();
        assert!(!html.contains("<p>Low</p>"));
        assert!(!html.contains("<p>High</p>"));

        drop(page);
        handle.await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_pass_does_not_stop_runtime() {
        let stats = recovers_after(Failure::Error).await;
        assert_eq!(stats.failed_passes, 1);
        assert_eq!(stats.passes, 1);
        assert_eq!(stats.replaced, 2);
        assert_eq!(stats.mutation_triggers, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_pass_does_not_stop_runtime() {
        let stats = recovers_after(Failure::Panic).await;
        assert_eq!(stats.failed_passes, 1);
        assert_eq!(stats.passes, 1);
        assert_eq!(stats.replaced, 2);
    }

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom 1");
        let payload = panic::catch_unwind(|| std::panic::panic_any(7u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn test_lock_recovers_poisoned_document() {
        let document = Arc::new(Mutex::new(Document::parse_html("<p>x</p>")));
        let poisoned = document.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoned.lock().unwrap();
            panic!("poison");
        })
        .join();

        assert!(document.is_poisoned());
        assert!(lock(&document).to_html().contains("<p>x</p>"));
    }
}
