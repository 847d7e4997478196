//! Script runner
//!
//! Replays a data script against a fresh `AtomicState` and `EventLog`,
//! recording what every step did.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::Result;
use crate::event_log::{Event, EventKind, EventLog};
use crate::script::{Script, Step};
use crate::state::{AtomicState, GlobalState, StateContainer};
use crate::store::{self, DataEntry};

/// What a single step did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepOutcome {
    Write { name: String, removed: bool },
    TryWrite { name: String, accepted: bool },
    Read { name: String, entry: Option<DataEntry> },
    Reset,
    /// `reset: false`
    Skipped,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Write { name, removed: true } => write!(f, "write {name}: removed"),
            StepOutcome::Write { name, removed: false } => write!(f, "write {name}: stored"),
            StepOutcome::TryWrite { name, accepted } => {
                let verdict = if *accepted { "accepted" } else { "rejected" };
                write!(f, "try_write {name}: {verdict}")
            }
            StepOutcome::Read { name, entry: None } => write!(f, "read {name}: <absent>"),
            StepOutcome::Read { name, entry: Some(entry) } => {
                let shown = serde_json::to_string(entry).unwrap_or_default();
                write!(f, "read {name}: {shown}")
            }
            StepOutcome::Reset => write!(f, "reset: all items cleared"),
            StepOutcome::Skipped => write!(f, "reset: skipped"),
        }
    }
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct ScriptReport {
    pub outcomes: Vec<StepOutcome>,
    pub state: Arc<GlobalState>,
    pub events: Vec<Event>,
}

impl ScriptReport {
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "outcomes": self.outcomes,
            "state": self.state.to_json(),
            "events": self.events,
        })
    }

    pub fn rejected_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StepOutcome::TryWrite { accepted: false, .. }))
            .count()
    }
}

pub struct Runner {
    script: Script,
    state: AtomicState,
    event_log: EventLog,
}

impl Runner {
    /// Validate the script and load its initial snapshot
    pub fn new(script: Script) -> Result<Self> {
        script.validate()?;
        let state = AtomicState::new(script.initial_state()?);

        Ok(Self {
            script,
            state,
            event_log: EventLog::new(),
        })
    }

    pub fn state(&self) -> &AtomicState {
        &self.state
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    #[instrument(skip(self), fields(steps = self.script.count_steps()))]
    pub fn run(&self) -> ScriptReport {
        let started = Instant::now();
        info!("Starting data script");
        self.event_log.emit(EventKind::ScriptStarted {
            step_count: self.script.count_steps(),
        });

        let outcomes: Vec<StepOutcome> = self.script.steps.iter().map(|s| self.step(s)).collect();

        let total_duration_ms = started.elapsed().as_millis() as u64;
        self.event_log
            .emit(EventKind::ScriptCompleted { total_duration_ms });

        let report = ScriptReport {
            outcomes,
            state: self.state.read(),
            events: self.event_log.events(),
        };
        info!(
            items = report.state.app.data.len(),
            rejected = report.rejected_count(),
            total_duration_ms,
            "Data script finished"
        );
        report
    }

    fn step(&self, step: &Step) -> StepOutcome {
        match step {
            Step::Write { write } => {
                store::write_data_item(
                    &self.event_log,
                    &self.state,
                    &write.name,
                    write.value.clone(),
                    write.meta(),
                );
                StepOutcome::Write {
                    name: write.name.clone(),
                    removed: write.value.is_null(),
                }
            }
            Step::TryWrite { try_write } => {
                let accepted = store::try_write_data_item(
                    &self.event_log,
                    &self.state,
                    &try_write.name,
                    try_write.value.clone(),
                    try_write.meta(),
                );
                StepOutcome::TryWrite {
                    name: try_write.name.clone(),
                    accepted,
                }
            }
            Step::Read { read } => StepOutcome::Read {
                name: read.clone(),
                entry: store::read_data_item(&self.state, read),
            },
            Step::Reset { reset: true } => {
                store::reset_data(&self.state);
                StepOutcome::Reset
            }
            Step::Reset { reset: false } => StepOutcome::Skipped,
        }
    }
}
