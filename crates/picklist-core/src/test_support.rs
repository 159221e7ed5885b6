use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::anyhow;

use crate::record::TitleRecord;
use crate::title_store::TitleStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub barcode: String,
    pub status: i32,
}

/// Scripted [`TitleStore`] double: queued fetch results, queued update
/// outcomes, and a record of every update call.
#[derive(Default)]
pub struct QueueStore {
    fetches: Mutex<VecDeque<anyhow::Result<Vec<TitleRecord>>>>,
    update_outcomes: Mutex<VecDeque<anyhow::Result<()>>>,
    updates: Mutex<Vec<UpdateCall>>,
}

impl QueueStore {
    pub fn new(
        fetches: Vec<anyhow::Result<Vec<TitleRecord>>>,
        update_outcomes: Vec<anyhow::Result<()>>,
    ) -> Self {
        Self {
            fetches: Mutex::new(fetches.into()),
            update_outcomes: Mutex::new(update_outcomes.into()),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fetches(fetches: Vec<anyhow::Result<Vec<TitleRecord>>>) -> Self {
        Self::new(fetches, Vec::new())
    }

    pub fn updates(&self) -> Vec<UpdateCall> {
        self.updates.lock().expect("updates lock").clone()
    }
}

impl TitleStore for QueueStore {
    fn fetch_titles(&self) -> anyhow::Result<Vec<TitleRecord>> {
        self.fetches
            .lock()
            .expect("fetches lock")
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("missing scripted fetch result")))
    }

    fn update_status(&self, barcode: &str, status: i32) -> anyhow::Result<()> {
        self.updates.lock().expect("updates lock").push(UpdateCall {
            barcode: barcode.to_string(),
            status,
        });

        self.update_outcomes
            .lock()
            .expect("outcomes lock")
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("missing scripted update outcome")))
    }
}
