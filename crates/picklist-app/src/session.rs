use picklist_core::config::PersistFailurePolicy;
use picklist_core::record::{PickingTask, STATUS_NOT_PICKED, STATUS_PICKED};
use picklist_core::scan;

/// A status change that has been applied locally and still needs to be
/// written back to the title store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub barcode: String,
    pub status: i32,
}

impl StatusUpdate {
    pub fn done(&self) -> bool {
        self.status == STATUS_PICKED
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Loaded { count: usize },
    Toggled { barcode: String, done: bool },
    Reverted { barcode: String, done: bool },
    SelectionChanged { barcode: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Selected { barcode: String },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistResolution {
    Acknowledged,
    KeptOptimistic { barcode: String, message: String },
    Reverted { barcode: String, message: String },
}

/// In-memory picking state shared by every UI surface.
///
/// All mutation goes through this type so that the task list, the single
/// selection, and the change-event queue never drift apart.
pub struct PickingSession {
    tasks: Vec<PickingTask>,
    selected: Option<String>,
    policy: PersistFailurePolicy,
    events: Vec<ChangeEvent>,
}

impl PickingSession {
    pub fn new(policy: PersistFailurePolicy) -> Self {
        Self {
            tasks: Vec::new(),
            selected: None,
            policy,
            events: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[PickingTask] {
        &self.tasks
    }

    pub fn task_by_barcode(&self, barcode: &str) -> Option<&PickingTask> {
        self.tasks.iter().find(|task| task.barcode == barcode)
    }

    pub fn selected_barcode(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_task(&self) -> Option<&PickingTask> {
        let barcode = self.selected.as_deref()?;
        self.task_by_barcode(barcode)
    }

    /// Replaces the whole task list in one step. The selection survives only
    /// when the selected barcode still exists in the new list.
    pub fn replace_tasks(&mut self, tasks: Vec<PickingTask>) {
        self.tasks = tasks;

        if let Some(barcode) = self.selected.clone() {
            if self.task_by_barcode(&barcode).is_none() {
                self.selected = None;
                self.events
                    .push(ChangeEvent::SelectionChanged { barcode: None });
            }
        }

        self.events.push(ChangeEvent::Loaded {
            count: self.tasks.len(),
        });
    }

    /// Flips the done flag locally and hands back the write that still has to
    /// reach the store. Returns `None` for an unknown barcode.
    pub fn toggle(&mut self, barcode: &str) -> Option<StatusUpdate> {
        let task = self.tasks.iter_mut().find(|task| task.barcode == barcode)?;

        task.done = !task.done;
        let status = if task.done {
            STATUS_PICKED
        } else {
            STATUS_NOT_PICKED
        };

        self.events.push(ChangeEvent::Toggled {
            barcode: task.barcode.clone(),
            done: task.done,
        });

        Some(StatusUpdate {
            barcode: barcode.to_string(),
            status,
        })
    }

    /// Settles an earlier optimistic toggle once its write has finished.
    ///
    /// A failed write is resolved by policy: keep the optimistic value, or
    /// roll it back. The rollback only fires while the local flag still holds
    /// the value this update wrote; a later toggle owns the state after that.
    pub fn apply_persist_outcome(
        &mut self,
        update: &StatusUpdate,
        outcome: Result<(), String>,
    ) -> PersistResolution {
        let message = match outcome {
            Ok(()) => return PersistResolution::Acknowledged,
            Err(message) => message,
        };

        match self.policy {
            PersistFailurePolicy::Keep => PersistResolution::KeptOptimistic {
                barcode: update.barcode.clone(),
                message,
            },
            PersistFailurePolicy::Revert => {
                let superseded = self
                    .task_by_barcode(&update.barcode)
                    .map(|task| task.done != update.done())
                    .unwrap_or(true);

                if superseded {
                    return PersistResolution::KeptOptimistic {
                        barcode: update.barcode.clone(),
                        message,
                    };
                }

                let reverted_done = !update.done();
                if let Some(task) = self
                    .tasks
                    .iter_mut()
                    .find(|task| task.barcode == update.barcode)
                {
                    task.done = reverted_done;
                }

                self.events.push(ChangeEvent::Reverted {
                    barcode: update.barcode.clone(),
                    done: reverted_done,
                });

                PersistResolution::Reverted {
                    barcode: update.barcode.clone(),
                    message,
                }
            }
        }
    }

    /// Resolves scanner input against the task list. A hit always selects the
    /// matched task, so re-scanning the same barcode is a no-op rather than a
    /// toggle. A miss leaves the current selection in place.
    pub fn resolve_scan(&mut self, scanned: &str) -> ScanOutcome {
        let Some(task) = scan::resolve(&self.tasks, scanned) else {
            return ScanOutcome::NotFound;
        };

        let barcode = task.barcode.clone();
        if self.selected.as_deref() != Some(barcode.as_str()) {
            self.selected = Some(barcode.clone());
            self.events.push(ChangeEvent::SelectionChanged {
                barcode: Some(barcode.clone()),
            });
        }

        ScanOutcome::Selected { barcode }
    }

    /// Selects a task by barcode, or closes the selection when the same task
    /// is selected again.
    pub fn select(&mut self, barcode: &str) {
        if self.selected.as_deref() == Some(barcode) {
            self.clear_selection();
            return;
        }

        if self.task_by_barcode(barcode).is_none() {
            return;
        }

        self.selected = Some(barcode.to_string());
        self.events.push(ChangeEvent::SelectionChanged {
            barcode: Some(barcode.to_string()),
        });
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.events
                .push(ChangeEvent::SelectionChanged { barcode: None });
        }
    }

    /// Drains every change recorded since the last call, in order.
    pub fn take_events(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.events)
    }
}
