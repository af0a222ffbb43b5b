//! Typestate pattern for the migration run state machine.
//!
//! A run moves `NotStarted → Running → Completed | Failed`. The states are
//! encoded in the type system, so an invalid transition (such as resuming a
//! failed run) is a compile-time error rather than a runtime one. Terminal
//! states are never re-entered.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a migration run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Create a run ID from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique run ID using ULID.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string().to_lowercase())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Run status as reported outside the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run created, nothing dispatched yet.
    NotStarted,
    /// Steps are being dispatched.
    Running,
    /// All steps confirmed.
    Completed,
    /// A step failed; the run aborted.
    Failed,
}

impl RunStatus {
    /// Get the status name as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Marker trait for run states.
pub trait RunState: private::Sealed + Send + Sync {
    /// Get the reportable status for this state.
    fn status() -> RunStatus;

    /// Get the state name for log messages.
    fn name() -> &'static str;
}

mod private {
    pub trait Sealed {}
}

/// Run created, nothing dispatched yet.
#[derive(Debug, Clone, Copy)]
pub struct NotStarted;

/// Steps are being dispatched in order.
#[derive(Debug, Clone, Copy)]
pub struct Running;

/// Every step confirmed; the run is finished.
#[derive(Debug, Clone, Copy)]
pub struct Completed;

/// A step failed and the run aborted at it.
#[derive(Debug, Clone, Copy)]
pub struct Failed;

impl private::Sealed for NotStarted {}
impl private::Sealed for Running {}
impl private::Sealed for Completed {}
impl private::Sealed for Failed {}

impl RunState for NotStarted {
    fn status() -> RunStatus {
        RunStatus::NotStarted
    }
    fn name() -> &'static str {
        "not_started"
    }
}

impl RunState for Running {
    fn status() -> RunStatus {
        RunStatus::Running
    }
    fn name() -> &'static str {
        "running"
    }
}

impl RunState for Completed {
    fn status() -> RunStatus {
        RunStatus::Completed
    }
    fn name() -> &'static str {
        "completed"
    }
}

impl RunState for Failed {
    fn status() -> RunStatus {
        RunStatus::Failed
    }
    fn name() -> &'static str {
        "failed"
    }
}

/// Data shared across all run states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunData {
    /// Unique run identifier.
    pub run_id: RunId,
    /// Name of the plan being executed.
    pub plan: String,
    /// Index of the step currently (or last) being executed.
    pub cursor: usize,
    /// When dispatching began.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the run reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Failure message, for failed runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A migration run in a specific state.
///
/// The state parameter `S` determines which transitions are available.
#[derive(Debug)]
pub struct MigrationRun<S: RunState> {
    data: RunData,
    _state: PhantomData<S>,
}

impl<S: RunState> MigrationRun<S> {
    /// Get a reference to the run data.
    #[must_use]
    pub const fn data(&self) -> &RunData {
        &self.data
    }

    /// Get the run ID.
    #[must_use]
    pub const fn run_id(&self) -> &RunId {
        &self.data.run_id
    }

    /// Get the current status.
    #[must_use]
    pub fn status(&self) -> RunStatus {
        S::status()
    }

    /// Convert into the underlying data (consuming the run).
    #[must_use]
    pub fn into_data(self) -> RunData {
        self.data
    }

    /// Internal helper to transition to a new state.
    fn transition_with<T: RunState>(mut self, f: impl FnOnce(&mut RunData)) -> MigrationRun<T> {
        f(&mut self.data);
        MigrationRun {
            data: self.data,
            _state: PhantomData,
        }
    }
}

impl MigrationRun<NotStarted> {
    /// Create a new run for the named plan.
    #[must_use]
    pub fn create(plan: impl Into<String>) -> Self {
        Self {
            data: RunData {
                run_id: RunId::generate(),
                plan: plan.into(),
                cursor: 0,
                started_at: None,
                finished_at: None,
                error: None,
            },
            _state: PhantomData,
        }
    }

    /// Begin dispatching steps.
    #[must_use]
    pub fn begin(self) -> MigrationRun<Running> {
        self.transition_with(|data| {
            data.started_at = Some(Utc::now());
        })
    }
}

impl MigrationRun<Running> {
    /// Record that the step at `index` is now being dispatched.
    pub fn enter_step(&mut self, index: usize) {
        self.data.cursor = index;
    }

    /// Transition to the completed state.
    ///
    /// Call once every step in the plan has confirmed.
    #[must_use]
    pub fn complete(self) -> MigrationRun<Completed> {
        self.transition_with(|data| {
            data.finished_at = Some(Utc::now());
        })
    }

    /// Transition to the failed state.
    ///
    /// The cursor identifies the failing step; the run never resumes.
    #[must_use]
    pub fn fail(self, error: String) -> MigrationRun<Failed> {
        self.transition_with(|data| {
            data.finished_at = Some(Utc::now());
            data.error = Some(error);
        })
    }
}
