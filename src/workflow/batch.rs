use tracing::info;

use crate::tools::DelegationTool;
use crate::types::{BatchEntry, Task, TaskId};

/// Run `tasks` one at a time, in order.
///
/// Every task yields exactly one entry; a failed task is recorded as an
/// error-valued result and the batch keeps going.
pub async fn run_batch(delegation: &DelegationTool, tasks: &[Task]) -> Vec<BatchEntry> {
    let mut entries = Vec::with_capacity(tasks.len());
    for (position, task) in tasks.iter().enumerate() {
        let id = task.id().cloned().unwrap_or_else(TaskId::unknown);
        info!(%id, position, total = tasks.len(), "running batch task");
        let result = delegation.invoke(task).await;
        entries.push(BatchEntry { id, result });
    }
    entries
}
