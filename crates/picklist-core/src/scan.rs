use crate::record::PickingTask;

/// Resolves a scanned barcode against the current task list.
///
/// A task matches when its barcode ends with the scanned string, which
/// tolerates scanners that truncate leading digits and operators who type a
/// partial code. When several barcodes share the scanned suffix the first
/// match in current list order wins; that ambiguity is accepted rather than
/// resolved by a best-match heuristic. Empty or whitespace-only scans never
/// match (a bare suffix test would match every task).
pub fn resolve<'a>(tasks: &'a [PickingTask], scanned: &str) -> Option<&'a PickingTask> {
    let scanned = scanned.trim();
    if scanned.is_empty() {
        return None;
    }

    tasks.iter().find(|task| task.barcode.ends_with(scanned))
}
