use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, SendError, Sender};

use picklist_app::StatusUpdate;
use picklist_core::ingest::load_tasks;
use picklist_core::record::PickingTask;
use picklist_core::title_store::{JsonTitleStore, TitleStore};
use ratatui::Frame;
use ratatui::text::{Line, Text};

use crate::theme;
use crate::ui::modal::{ModalSpec, render_modal};

const FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

#[derive(Debug, Clone, Default)]
pub(crate) struct LoadingState {
    frame_index: usize,
}

impl LoadingState {
    pub(crate) fn next_frame(&mut self) {
        self.frame_index = (self.frame_index + 1) % FRAMES.len();
    }

    fn current_frame(&self) -> &'static str {
        FRAMES[self.frame_index]
    }
}

#[derive(Debug)]
pub(crate) enum LoadEvent {
    Started,
    Done {
        token: u64,
        result: Result<Vec<PickingTask>, String>,
    },
}

#[derive(Debug)]
pub(crate) enum PersistEvent {
    Done {
        update: StatusUpdate,
        result: Result<(), String>,
    },
}

/// Runs store operations off the UI thread and reports back over a channel
/// the event loop drains on ticks.
pub(crate) trait StoreWorker: Send + Sync {
    fn spawn_load(&self, token: u64) -> Receiver<LoadEvent>;

    fn spawn_persist(&self, update: StatusUpdate) -> Receiver<PersistEvent>;
}

#[derive(Debug)]
struct PersistJob {
    update: StatusUpdate,
    reply: Sender<PersistEvent>,
}

#[derive(Debug)]
pub(crate) struct SystemStoreWorker {
    store_path: PathBuf,
    persist_queue: Sender<PersistJob>,
}

impl SystemStoreWorker {
    pub(crate) fn new(store_path: PathBuf) -> Self {
        let (persist_queue, jobs) = mpsc::channel::<PersistJob>();
        let store = JsonTitleStore::new(store_path.clone());

        // A single writer thread applies updates one at a time; overlapping
        // toggles of different tasks must not interleave their
        // read-modify-write of the store file. The thread exits when the
        // queue sender is dropped.
        std::thread::spawn(move || {
            for job in jobs {
                let result = store
                    .update_status(&job.update.barcode, job.update.status)
                    .map_err(|error| format!("{error:#}"));
                let _ = job.reply.send(PersistEvent::Done {
                    update: job.update,
                    result,
                });
            }
        });

        Self {
            store_path,
            persist_queue,
        }
    }
}

impl StoreWorker for SystemStoreWorker {
    fn spawn_load(&self, token: u64) -> Receiver<LoadEvent> {
        let store_path = self.store_path.clone();
        let (sender, receiver) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = sender.send(LoadEvent::Started);

            let store = JsonTitleStore::new(store_path);
            let result = load_tasks(&store).map_err(|error| format!("{error:#}"));
            let _ = sender.send(LoadEvent::Done { token, result });
        });

        receiver
    }

    fn spawn_persist(&self, update: StatusUpdate) -> Receiver<PersistEvent> {
        let (sender, receiver) = mpsc::channel();
        let job = PersistJob {
            update,
            reply: sender,
        };
        if let Err(SendError(job)) = self.persist_queue.send(job) {
            let PersistJob { update, reply } = job;
            let _ = reply.send(PersistEvent::Done {
                update,
                result: Err("persist worker is not running".to_string()),
            });
        }

        receiver
    }
}

pub(crate) fn render_loading_modal(
    frame: &mut Frame<'_>,
    title: &str,
    message: &str,
    key_hint: &str,
    loading: &LoadingState,
) {
    let body = Text::from(vec![
        Line::from(""),
        Line::from(format!("{} {}", loading.current_frame(), message)),
    ]);
    render_modal(
        frame,
        ModalSpec {
            title,
            title_style: Some(theme::focus_prompt()),
            body,
            key_hint: Some(key_hint),
            width_pct: 72,
            height_pct: 42,
        },
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use picklist_core::record::TitleRecord;

    use super::{LoadEvent, PersistEvent, StoreWorker, SystemStoreWorker};

    fn write_store(records: &[TitleRecord]) -> (tempfile::TempDir, std::path::PathBuf) {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("titles.json");
        let raw = serde_json::to_string(records).expect("serialize records");
        std::fs::write(&path, raw).expect("write store");
        (temp, path)
    }

    fn record(barcode: &str, coordinate: &str, status: i32) -> TitleRecord {
        TitleRecord {
            id: 1,
            title: format!("Title {barcode}"),
            image_url: String::new(),
            barcode: barcode.to_string(),
            coordinate: coordinate.to_string(),
            copies: 1,
            status,
            updated_at: None,
        }
    }

    #[test]
    fn spawn_load_delivers_sorted_tasks() {
        let (_temp, path) = write_store(&[
            record("9785389022222", "B12:3", 0),
            record("9785389011111", "A10:5", 1),
        ]);

        let worker = SystemStoreWorker::new(path);
        let receiver = worker.spawn_load(7);

        loop {
            let event = receiver
                .recv_timeout(Duration::from_secs(5))
                .expect("load event");
            match event {
                LoadEvent::Started => continue,
                LoadEvent::Done { token, result } => {
                    assert_eq!(token, 7);
                    let tasks = result.expect("load result");
                    assert_eq!(tasks[0].coordinate, "A10:5");
                    assert!(tasks[0].done);
                    break;
                }
            }
        }
    }

    #[test]
    fn spawn_load_reports_a_missing_store_as_an_error_string() {
        let temp = tempfile::tempdir().expect("temp dir");
        let worker = SystemStoreWorker::new(temp.path().join("absent.json"));
        let receiver = worker.spawn_load(1);

        loop {
            let event = receiver
                .recv_timeout(Duration::from_secs(5))
                .expect("load event");
            if let LoadEvent::Done { result, .. } = event {
                assert!(result.is_err());
                break;
            }
        }
    }

    #[test]
    fn spawn_persist_writes_the_status_back() {
        let (_temp, path) = write_store(&[record("9785389011111", "A10:5", 0)]);

        let worker = SystemStoreWorker::new(path.clone());
        let receiver = worker.spawn_persist(picklist_app::StatusUpdate {
            barcode: "9785389011111".to_string(),
            status: 1,
        });

        let PersistEvent::Done { update, result } = receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("persist event");
        result.expect("persist result");
        assert_eq!(update.barcode, "9785389011111");

        let raw = std::fs::read_to_string(&path).expect("read store");
        let records: Vec<TitleRecord> = serde_json::from_str(&raw).expect("parse store");
        assert_eq!(records[0].status, 1);
    }

    #[test]
    fn overlapping_persists_of_different_tasks_both_land() {
        let (_temp, path) = write_store(&[
            record("9785389011111", "A10:5", 0),
            record("9785389022222", "B12:3", 0),
        ]);

        let worker = SystemStoreWorker::new(path.clone());
        let receivers = [
            worker.spawn_persist(picklist_app::StatusUpdate {
                barcode: "9785389011111".to_string(),
                status: 1,
            }),
            worker.spawn_persist(picklist_app::StatusUpdate {
                barcode: "9785389022222".to_string(),
                status: 1,
            }),
        ];

        for receiver in receivers {
            let PersistEvent::Done { result, .. } = receiver
                .recv_timeout(Duration::from_secs(5))
                .expect("persist event");
            result.expect("persist result");
        }

        let raw = std::fs::read_to_string(&path).expect("read store");
        let records: Vec<TitleRecord> = serde_json::from_str(&raw).expect("parse store");
        for record in &records {
            assert_eq!(
                record.status, 1,
                "update for {} reported success but was not written",
                record.barcode
            );
        }
    }
}
