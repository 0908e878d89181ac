//! The compile context a round runs in, and the messages it receives.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::BuildError;
use crate::target::{BuildTarget, TargetChunk};

/// Whether a build is incremental or starts from scratch.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BuildMode {
    /// Incremental build: only changed inputs are processed.
    #[default]
    Make,
    /// Full build: previous state is discarded.
    Rebuild,
}

/// One output file produced in a round, with the sources that contributed to it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GeneratedFile {
    /// The output file.
    pub output: PathBuf,
    /// Contributing sources, in registration order.
    pub sources: Vec<PathBuf>,
}

/// Every output file a target produced in one round.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FileGeneratedEvent {
    /// The producing target.
    pub target: BuildTarget,
    /// Outputs in registration order.
    pub files: Vec<GeneratedFile>,
}

/// Messages delivered to a [`CompileContext`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum BuildMessage {
    /// Output files were generated for a target.
    FileGenerated(FileGeneratedEvent),
    /// Free-form progress text.
    Progress(String),
}

/// Mode flags, cancellation and message delivery for one build.
pub trait CompileContext {
    /// The build mode.
    fn mode(&self) -> BuildMode;

    /// Returns `true` for incremental builds.
    fn is_make(&self) -> bool {
        self.mode() == BuildMode::Make
    }

    /// Returns `true` for full rebuilds.
    fn is_rebuild(&self) -> bool {
        self.mode() == BuildMode::Rebuild
    }

    /// Returns `true` once cancellation was requested.
    fn is_canceled(&self) -> bool;

    /// Fails with [`BuildError::Canceled`] once cancellation was requested.
    fn check_canceled(&self) -> Result<(), BuildError> {
        if self.is_canceled() {
            Err(BuildError::Canceled)
        } else {
            Ok(())
        }
    }

    /// Whether `chunk` may be built incrementally, processing only what
    /// changed, instead of in full.
    fn should_differentiate(&self, chunk: &TargetChunk) -> bool;

    /// Delivers a message to whoever observes the build.
    fn process_message(&self, message: BuildMessage);
}

/// Receives every message processed by a [`BuildSession`].
pub trait BuildListener: Send + Sync {
    /// Called once per message, in delivery order.
    fn on_message(&self, message: &BuildMessage);
}

/// A listener that keeps every message it receives.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Mutex<Vec<BuildMessage>>,
}

impl MessageLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far.
    pub fn messages(&self) -> Vec<BuildMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// The file generated events received so far.
    pub fn file_events(&self) -> Vec<FileGeneratedEvent> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                BuildMessage::FileGenerated(event) => Some(event.clone()),
                BuildMessage::Progress(_) => None,
            })
            .collect()
    }

    /// Drops every message.
    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

impl BuildListener for MessageLog {
    fn on_message(&self, message: &BuildMessage) {
        self.messages.lock().unwrap().push(message.clone());
    }
}

/// The [`CompileContext`] of one build session.
///
/// Cancellation is an atomic flag, so [`cancel`](Self::cancel) may be called
/// from another thread while a round is running.
#[derive(Default)]
pub struct BuildSession {
    mode: BuildMode,
    canceled: AtomicBool,
    listeners: Vec<Arc<dyn BuildListener>>,
    forced: HashSet<BuildTarget>,
}

impl BuildSession {
    /// Creates a session running in `mode`.
    pub fn new(mode: BuildMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Adds a listener.
    pub fn add_listener(&mut self, listener: Arc<dyn BuildListener>) {
        self.listeners.push(listener);
    }

    /// Forces every chunk containing `target` to be built in full.
    pub fn force_full_build(&mut self, target: BuildTarget) {
        self.forced.insert(target);
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Release);
    }
}

impl CompileContext for BuildSession {
    fn mode(&self) -> BuildMode {
        self.mode
    }

    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    fn should_differentiate(&self, chunk: &TargetChunk) -> bool {
        self.is_make() && !chunk.targets().iter().any(|t| self.forced.contains(t))
    }

    fn process_message(&self, message: BuildMessage) {
        match &message {
            BuildMessage::FileGenerated(event) => tracing::debug!(
                build_target = %event.target,
                files = event.files.len(),
                "files generated"
            ),
            BuildMessage::Progress(text) => tracing::info!("{text}"),
        }
        for listener in &self.listeners {
            listener.on_message(&message);
        }
    }
}
