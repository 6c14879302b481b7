//! The cooperative engine of `spec.md` §4.4: interleaves timer-driven
//! and event-driven redraws of a [`ContainerTree`] until cancelled.
//!
//! The lifecycle spec describes a forwarder task (reads terminal
//! events), a periodic task (ticks a redraw timer) and a main task
//! (draws). The periodic ticker is a genuine spawned `tokio` task,
//! since it needs nothing but a clock; the forwarder and the main loop
//! share a single task instead, because both need exclusive access to
//! the same [`Terminal`] and `Terminal::event` cannot be called through
//! a shared handle (see [`crate::terminal::Terminal::event`]'s `Self:
//! Sized` bound). `tokio::select!` between the next terminal event and
//! the next tick gives the same interleaving the spec describes
//! without requiring two tasks to fight over one file descriptor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::warn;

use crate::cancel::CancelToken;
use crate::container::{ContainerTree, WidgetFailure};
use crate::dist::{Distributor, SubscriberHandle};
use crate::error::{Result, TermGridError};
use crate::event::{Event, EventKind};
use crate::terminal::Terminal;

/// The default redraw interval, matching the teacher workspace's frame
/// pacing for timer-driven redraws.
pub const DEFAULT_REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// What the run loop should do after an error handler has looked at a
/// failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorAction {
    /// Ignore the failure and keep running.
    Continue,
    /// Stop the run loop; [`RunLoop::run`] returns the underlying error.
    Abort,
}

/// An error surfaced to a [`RunLoopOptions::error_handler`], with enough
/// context to log or display without exposing the full [`TermGridError`]
/// taxonomy.
#[derive(Clone, Debug)]
pub enum RunLoopError {
    /// A widget's `draw`, `keyboard`, or `mouse` call failed.
    Widget {
        /// The id of the failing leaf, if it has one.
        id: Option<String>,
        /// The failure, rendered.
        message: String,
    },
    /// The terminal back end reported a failure, either from `draw`'s
    /// flush or from an [`Event::Error`].
    Terminal(String),
}

type ErrorHandler = Arc<dyn Fn(&RunLoopError) -> ErrorAction + Send + Sync>;
type KeyboardSubscriber = Box<dyn FnMut(Event) + Send + 'static>;

/// Programmatic configuration for a [`RunLoop`], built with the same
/// `fn with_x(mut self, ...) -> Self` convention as [`crate::container::ContainerOptions`].
pub struct RunLoopOptions {
    redraw_interval: Duration,
    error_handler: Option<ErrorHandler>,
    keyboard_subscribers: Vec<KeyboardSubscriber>,
}

impl RunLoopOptions {
    /// Defaults: a 250ms redraw interval, no error handler (so any
    /// failure is fatal), and no extra keyboard subscribers.
    pub fn new() -> Self {
        Self {
            redraw_interval: DEFAULT_REDRAW_INTERVAL,
            error_handler: None,
            keyboard_subscribers: Vec::new(),
        }
    }

    /// Set how often the periodic task marks a redraw needed.
    #[must_use]
    pub fn redraw_interval(mut self, interval: Duration) -> Self {
        self.redraw_interval = interval;
        self
    }

    /// Install a handler for widget and terminal failures. Without one,
    /// any failure ends the run loop; [`RunLoop::run`] then returns that
    /// error.
    #[must_use]
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RunLoopError) -> ErrorAction + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Subscribe an extra keyboard callback, installed alongside the
    /// engine's own container-tree routing when [`RunLoop::run`] starts.
    /// Unlike a widget's `keyboard_scope`, this sees every key event
    /// regardless of focus, independent of the container tree.
    #[must_use]
    pub fn keyboard_subscriber<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Event) + Send + 'static,
    {
        self.keyboard_subscribers.push(Box::new(callback));
        self
    }
}

impl Default for RunLoopOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The engine: owns a terminal back end and a container tree, and
/// drives both until cancelled.
pub struct RunLoop<T: Terminal> {
    terminal: T,
    tree: ContainerTree,
    cancel: CancelToken,
    dist: Distributor,
    options: RunLoopOptions,
}

impl<T: Terminal + 'static> RunLoop<T> {
    /// Build a run loop over an already-built tree and a terminal back
    /// end. `cancel` is shared with the caller so cancellation can be
    /// requested from outside the loop (a signal handler, another task,
    /// and so on).
    pub fn new(terminal: T, tree: ContainerTree, cancel: CancelToken, options: RunLoopOptions) -> Self {
        Self {
            terminal,
            tree,
            cancel,
            dist: Distributor::new(),
            options,
        }
    }

    /// The event distributor every terminal event is dispatched
    /// through. Subscribe before or after [`RunLoop::run`] starts;
    /// either way, subscriptions stay live until stopped or the run
    /// loop shuts down.
    pub fn distributor(&self) -> &Distributor {
        &self.dist
    }

    /// Drive the loop per `spec.md` §4.4's lifecycle:
    ///
    /// 1. Subscribe the caller-provided keyboard callbacks.
    /// 2. Draw once, synchronously, before anything else.
    /// 3. Until cancelled, interleave terminal events (routed into the
    ///    container tree, then dispatched to subscribers) and periodic
    ///    ticks, drawing whenever either marks a redraw needed.
    /// 4. On exit (cancellation or a fatal failure), stop every
    ///    subscriber and close the terminal before returning.
    pub async fn run(mut self) -> Result<()> {
        let mut handles: Vec<SubscriberHandle> = Vec::new();
        for callback in self.options.keyboard_subscribers.drain(..) {
            handles.push(self.dist.subscribe(vec![EventKind::Key], callback).await);
        }

        let mut fatal = self.draw_once().await.err();

        if fatal.is_none() {
            fatal = self.drive().await;
        }

        self.cancel.cancel();
        for handle in handles {
            handle.stop().await;
        }
        let _ = self.terminal.close();

        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn draw_once(&mut self) -> Result<()> {
        match self.tree.draw(&mut self.terminal).await {
            Ok(failures) => {
                for failure in failures {
                    if let Some(err) = self.judge_widget_failure(failure) {
                        return Err(err);
                    }
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn drive(&mut self) -> Option<TermGridError> {
        let dirty = Arc::new(AtomicBool::new(false));
        let tick_notify = Arc::new(Notify::new());

        let periodic_cancel = self.cancel.clone();
        let periodic_dirty = dirty.clone();
        let periodic_notify = tick_notify.clone();
        let interval = self.options.redraw_interval;
        let periodic = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; this loop's caller
            // already drew synchronously, so skip it.
            ticker.tick().await;
            loop {
                tokio::select! {
                    biased;
                    () = periodic_cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        periodic_dirty.store(true, Ordering::Release);
                        periodic_notify.notify_one();
                    }
                }
            }
        });

        let fatal = self.event_loop(&dirty, &tick_notify).await;

        periodic.abort();
        fatal
    }

    async fn event_loop(&mut self, dirty: &Arc<AtomicBool>, tick_notify: &Arc<Notify>) -> Option<TermGridError> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }

            if dirty.swap(false, Ordering::AcqRel) {
                match self.tree.draw(&mut self.terminal).await {
                    Ok(failures) => {
                        for failure in failures {
                            if let Some(err) = self.judge_widget_failure(failure) {
                                return Some(err);
                            }
                        }
                    }
                    Err(e) => {
                        if let Some(err) = self.judge_terminal_failure(e) {
                            return Some(err);
                        }
                    }
                }
                continue;
            }

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return None,
                () = tick_notify.notified() => {}
                outcome = self.terminal.event(&self.cancel) => {
                    match outcome {
                        Ok(Some(event)) => {
                            self.dist.dispatch(event.clone()).await;
                            if let Some(err) = self.route(event).await {
                                return Some(err);
                            }
                            dirty.store(true, Ordering::Release);
                        }
                        Ok(None) => {}
                        Err(e) => {
                            if let Some(err) = self.judge_terminal_failure(e) {
                                return Some(err);
                            }
                        }
                    }
                }
            }
        }
    }

    async fn route(&mut self, event: Event) -> Option<TermGridError> {
        match event {
            Event::Resize(_, _) => None,
            Event::Key(key) => {
                for failure in self.tree.route_keyboard(key).await {
                    if let Some(err) = self.judge_widget_failure(failure) {
                        return Some(err);
                    }
                }
                None
            }
            Event::Mouse(mouse) => {
                for failure in self.tree.route_mouse(mouse).await {
                    if let Some(err) = self.judge_widget_failure(failure) {
                        return Some(err);
                    }
                }
                None
            }
            Event::Error(message) => self.judge_terminal_failure(TermGridError::TerminalIo(std::io::Error::other(message))),
        }
    }

    fn judge_widget_failure(&self, failure: WidgetFailure) -> Option<TermGridError> {
        let WidgetFailure { id, error } = failure;
        match &self.options.error_handler {
            Some(handler) => {
                let report = RunLoopError::Widget {
                    id: id.clone(),
                    message: error.to_string(),
                };
                match handler(&report) {
                    ErrorAction::Continue => {
                        warn!(?id, %error, "widget failure handled, continuing");
                        None
                    }
                    ErrorAction::Abort => Some(error),
                }
            }
            None => Some(error),
        }
    }

    fn judge_terminal_failure(&self, error: TermGridError) -> Option<TermGridError> {
        match &self.options.error_handler {
            Some(handler) => match handler(&RunLoopError::Terminal(error.to_string())) {
                ErrorAction::Continue => {
                    warn!(%error, "terminal failure handled, continuing");
                    None
                }
                ErrorAction::Abort => Some(error),
            },
            None => Some(error),
        }
    }
}
