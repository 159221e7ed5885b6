use serde::{Deserialize, Serialize};

/// Status code used on the wire: `1` means picked, any other value means
/// not picked.
pub const STATUS_PICKED: i32 = 1;
pub const STATUS_NOT_PICKED: i32 = 0;

/// Raw title record as the storage backend exports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub id: i64,
    pub title: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub barcode: String,
    pub coordinate: String,
    pub copies: u32,
    pub status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One unit of picking work, derived from a [`TitleRecord`].
///
/// The list a session holds is sorted by `coordinate` once at load time and
/// never re-sorted afterwards; only the `done` flag mutates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickingTask {
    pub id: i64,
    pub title: String,
    pub cover_ref: String,
    pub barcode: String,
    pub coordinate: String,
    pub copies: u32,
    pub done: bool,
}

impl PickingTask {
    pub fn from_record(record: TitleRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            cover_ref: record.image_url,
            barcode: record.barcode,
            coordinate: record.coordinate,
            copies: record.copies,
            done: record.status == STATUS_PICKED,
        }
    }

    /// Wire status value matching the current `done` flag.
    pub fn status(&self) -> i32 {
        if self.done {
            STATUS_PICKED
        } else {
            STATUS_NOT_PICKED
        }
    }
}
