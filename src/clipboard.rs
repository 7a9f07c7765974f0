//! Per-cell clipboard export.
//!
//! A [`CopyButton`] is a two-state machine (Idle/Confirmed). Activating it
//! writes the cell text to the clipboard in the background; a successful write
//! shows the confirmation for [`COPY_DWELL`] and then reverts on its own.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use arboard::Clipboard;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tracing::{error, trace};

use crate::domain::{COPIED_LABEL, COPY_DWELL, COPY_LABEL, TableError};
use crate::interaction::PointerEvent;

/// Asynchronous "write text" primitive of the platform clipboard.
pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: String) -> BoxFuture<'static, Result<(), TableError>>;
}

/// Synchronous clipboard backend owned by [`SystemClipboard`].
trait ClipboardHandle: Send {
    fn set_text(&mut self, text: String) -> Result<(), TableError>;
}

impl ClipboardHandle for Clipboard {
    fn set_text(&mut self, text: String) -> Result<(), TableError> {
        Clipboard::set_text(self, text)?;
        Ok(())
    }
}

/// The system clipboard, accessed through `arboard`.
///
/// One handle is opened up front and kept for the lifetime of the app: on
/// X11 and Wayland the copied text is only served while it is alive. Writes
/// run on a blocking thread so a slow display server never stalls the event
/// loop.
#[derive(Clone)]
pub struct SystemClipboard {
    handle: Arc<Mutex<Box<dyn ClipboardHandle>>>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, TableError> {
        Ok(Self::with_handle(Box::new(Clipboard::new()?)))
    }

    fn with_handle(handle: Box<dyn ClipboardHandle>) -> Self {
        Self {
            handle: Arc::new(Mutex::new(handle)),
        }
    }
}

impl fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemClipboard").finish_non_exhaustive()
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: String) -> BoxFuture<'static, Result<(), TableError>> {
        let handle = self.handle.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                handle
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .set_text(text)
            })
            .await?
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    Idle,
    Confirmed,
}

impl CopyState {
    /// Accessible name and tooltip.
    pub fn label(&self) -> &'static str {
        match self {
            CopyState::Idle => COPY_LABEL,
            CopyState::Confirmed => COPIED_LABEL,
        }
    }

    /// Visible indicator.
    pub fn indicator(&self) -> &'static str {
        match self {
            CopyState::Idle => "⧉",
            CopyState::Confirmed => "✓",
        }
    }
}

struct CopyInner {
    state: CopyState,
    // Bumped whenever the pending revert is replaced or cancelled.
    generation: u64,
    revert: Option<JoinHandle<()>>,
    alive: bool,
}

impl CopyInner {
    fn cancel_revert(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.revert.take() {
            handle.abort();
        }
    }
}

fn lock(inner: &Mutex<CopyInner>) -> MutexGuard<'_, CopyInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct CopyButton {
    text: String,
    inner: Arc<Mutex<CopyInner>>,
    clipboard: Arc<dyn ClipboardWriter>,
}

impl CopyButton {
    pub fn new(text: impl Into<String>, clipboard: Arc<dyn ClipboardWriter>) -> Self {
        Self {
            text: text.into(),
            inner: Arc::new(Mutex::new(CopyInner {
                state: CopyState::Idle,
                generation: 0,
                revert: None,
                alive: true,
            })),
            clipboard,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> CopyState {
        lock(&self.inner).state
    }

    pub fn label(&self) -> &'static str {
        self.state().label()
    }

    pub fn indicator(&self) -> &'static str {
        self.state().indicator()
    }

    /// Starts a clipboard write of the cell text and stops `event` from
    /// reaching the enclosing row.
    ///
    /// Must be called from within a tokio runtime. The returned handle
    /// resolves once the write outcome has been applied.
    pub fn activate(&self, event: &mut PointerEvent) -> JoinHandle<()> {
        event.stop_propagation();

        trace!("Copying {:?} to clipboard ...", self.text);
        let write = self.clipboard.write_text(self.text.clone());
        let weak = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            let result = write.await;
            let Some(inner) = weak.upgrade() else {
                trace!("Copy widget was torn down before the write finished.");
                return;
            };
            match result {
                Ok(()) => confirm(&inner),
                Err(e) => {
                    error!("Failed to copy: {e}");
                    let mut guard = lock(&inner);
                    if guard.alive {
                        guard.cancel_revert();
                        guard.state = CopyState::Idle;
                    }
                }
            }
        })
    }
}

fn confirm(inner: &Arc<Mutex<CopyInner>>) {
    let mut guard = lock(inner);
    if !guard.alive {
        return;
    }
    guard.cancel_revert();
    guard.state = CopyState::Confirmed;
    trace!("Copied cell content to clipboard.");

    let generation = guard.generation;
    let weak: Weak<Mutex<CopyInner>> = Arc::downgrade(inner);
    guard.revert = Some(tokio::spawn(async move {
        tokio::time::sleep(COPY_DWELL).await;
        if let Some(inner) = weak.upgrade() {
            let mut guard = lock(&inner);
            if guard.alive && guard.generation == generation {
                guard.state = CopyState::Idle;
                guard.revert = None;
            }
        }
    }));
}

impl Drop for CopyButton {
    fn drop(&mut self) {
        let mut guard = lock(&self.inner);
        guard.alive = false;
        guard.cancel_revert();
    }
}

impl fmt::Debug for CopyButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyButton")
            .field("text", &self.text)
            .field("state", &self.state())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::testing::RecordingClipboard;
    use super::*;

    fn button(text: &str, clipboard: &Arc<RecordingClipboard>) -> CopyButton {
        CopyButton::new(text, clipboard.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn starts_idle() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let b = button("test-id", &clipboard);
        assert_eq!(b.state(), CopyState::Idle);
        assert_eq!(b.label(), "Copy to clipboard");
        assert!(clipboard.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn successful_copy_confirms_then_reverts() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let b = button("test-id-123", &clipboard);

        let mut event = PointerEvent::default();
        b.activate(&mut event).await.unwrap();

        assert_eq!(clipboard.writes(), vec!["test-id-123"]);
        assert_eq!(b.state(), CopyState::Confirmed);
        assert_eq!(b.label(), "Copied!");

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(b.state(), CopyState::Confirmed);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(b.state(), CopyState::Idle);
        assert_eq!(b.label(), "Copy to clipboard");
    }

    #[tokio::test(start_paused = true)]
    async fn activation_stops_propagation() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let b = button("x", &clipboard);
        let mut event = PointerEvent::default();
        assert!(!event.propagation_stopped());
        b.activate(&mut event).await.unwrap();
        assert!(event.propagation_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_copy_never_confirms() {
        let clipboard = Arc::new(RecordingClipboard::failing());
        let b = button("test-id", &clipboard);

        b.activate(&mut PointerEvent::default()).await.unwrap();
        assert_eq!(clipboard.writes(), vec!["test-id"]);
        assert_eq!(b.state(), CopyState::Idle);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(b.state(), CopyState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_copy_while_confirmed_returns_to_idle() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let b = button("id-1", &clipboard);

        b.activate(&mut PointerEvent::default()).await.unwrap();
        assert_eq!(b.state(), CopyState::Confirmed);

        clipboard.fail.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(500)).await;
        b.activate(&mut PointerEvent::default()).await.unwrap();
        assert_eq!(b.state(), CopyState::Idle);
        assert!(lock(&b.inner).revert.is_none());

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(b.state(), CopyState::Idle);
        assert_eq!(clipboard.writes().len(), 2);
    }

    /// Replays one scripted `(delay, succeeds)` outcome per write.
    struct ScriptedClipboard {
        outcomes: Mutex<VecDeque<(Duration, bool)>>,
    }

    impl ScriptedClipboard {
        fn new(outcomes: impl IntoIterator<Item = (u64, bool)>) -> Self {
            Self {
                outcomes: Mutex::new(
                    outcomes
                        .into_iter()
                        .map(|(ms, ok)| (Duration::from_millis(ms), ok))
                        .collect(),
                ),
            }
        }
    }

    impl ClipboardWriter for ScriptedClipboard {
        fn write_text(&self, _text: String) -> BoxFuture<'static, Result<(), TableError>> {
            let (delay, ok) = self.outcomes.lock().unwrap().pop_front().unwrap();
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                if ok {
                    Ok(())
                } else {
                    Err(TableError::Clipboard("busy".to_string()))
                }
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn outcomes_apply_in_completion_order() {
        let clipboard = Arc::new(ScriptedClipboard::new([(100, true), (0, false)]));
        let b = CopyButton::new("id-1", clipboard);

        let slow = b.activate(&mut PointerEvent::default());
        let fast = b.activate(&mut PointerEvent::default());

        fast.await.unwrap();
        assert_eq!(b.state(), CopyState::Idle);

        // the earlier write still landed, so it confirms when it completes
        slow.await.unwrap();
        assert_eq!(b.state(), CopyState::Confirmed);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(b.state(), CopyState::Confirmed);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(b.state(), CopyState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn reactivation_restarts_dwell() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let b = button("id-1", &clipboard);

        b.activate(&mut PointerEvent::default()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        b.activate(&mut PointerEvent::default()).await.unwrap();

        // the first timer would have fired here
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(b.state(), CopyState::Confirmed);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(b.state(), CopyState::Idle);
        assert_eq!(clipboard.writes().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_pending_revert() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let b = button("id-1", &clipboard);
        b.activate(&mut PointerEvent::default()).await.unwrap();

        let inner = b.inner.clone();
        drop(b);
        {
            let guard = lock(&inner);
            assert!(!guard.alive);
            assert!(guard.revert.is_none());
        }

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(lock(&inner).state, CopyState::Confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn write_finishing_after_teardown_is_ignored() {
        let clipboard = Arc::new(RecordingClipboard::slow(Duration::from_millis(100)));
        let b = button("id-1", &clipboard);

        let handle = b.activate(&mut PointerEvent::default());
        let inner = b.inner.clone();
        drop(b);

        handle.await.unwrap();
        let guard = lock(&inner);
        assert_eq!(guard.state, CopyState::Idle);
        assert!(guard.revert.is_none());
    }

    #[derive(Default)]
    struct SharedHandle {
        texts: Arc<Mutex<Vec<String>>>,
        opened: Arc<AtomicUsize>,
    }

    impl SharedHandle {
        fn open(&self) -> Box<dyn ClipboardHandle> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Box::new(SharedHandle {
                texts: self.texts.clone(),
                opened: self.opened.clone(),
            })
        }
    }

    impl ClipboardHandle for SharedHandle {
        fn set_text(&mut self, text: String) -> Result<(), TableError> {
            self.texts.lock().unwrap().push(text);
            Ok(())
        }
    }

    #[tokio::test]
    async fn system_clipboard_keeps_one_handle() {
        let backend = SharedHandle::default();
        let clipboard = SystemClipboard::with_handle(backend.open());

        clipboard.write_text("id-1".to_string()).await.unwrap();
        clipboard.clone().write_text("id-2".to_string()).await.unwrap();

        assert_eq!(backend.opened.load(Ordering::SeqCst), 1);
        assert_eq!(*backend.texts.lock().unwrap(), vec!["id-1", "id-2"]);
        // the handle outlives each write
        assert_eq!(Arc::strong_count(&clipboard.handle), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn write_finishing_after_teardown_without_references() {
        let clipboard = Arc::new(RecordingClipboard::slow(Duration::from_millis(100)));
        let b = button("id-1", &clipboard);
        let handle = b.activate(&mut PointerEvent::default());
        drop(b);
        handle.await.unwrap();
        assert_eq!(clipboard.writes(), vec!["id-1"]);
    }
}
