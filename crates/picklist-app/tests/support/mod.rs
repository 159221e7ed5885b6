use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use anyhow::anyhow;
use picklist_core::record::TitleRecord;
use picklist_core::title_store::TitleStore;

pub static ENV_LOCK: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub barcode: String,
    pub status: i32,
}

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

pub fn record(barcode: &str, coordinate: &str, status: i32) -> TitleRecord {
    TitleRecord {
        id: 1,
        title: format!("Title {barcode}"),
        image_url: format!("covers/{barcode}.jpg"),
        barcode: barcode.to_string(),
        coordinate: coordinate.to_string(),
        copies: 1,
        status,
        updated_at: None,
    }
}

#[allow(dead_code)]
pub fn write_valid_config(home: &Path, store_path: &Path) {
    let config_dir = home.join(".config").join("picklist");
    fs::create_dir_all(&config_dir).expect("create config dir");

    let config = format!(
        r#"
version = 1

[store]
path = "{}"
"#,
        store_path.display()
    );

    fs::write(config_dir.join("config.toml"), config).expect("write config");
}
