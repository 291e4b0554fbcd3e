use super::AppResult;
use crate::domain::{NewTask, Task, TaskId};
use crate::ports::TaskRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Write-through cache of the task collection.
///
/// Every operation awaits the remote resource first and touches the local
/// collection only once the call has succeeded. A failed call leaves the
/// collection as it was.
pub struct TaskStore {
    repository: Arc<dyn TaskRepository>,
    items: RwLock<Vec<Task>>,
    loaded_at: RwLock<Option<DateTime<Utc>>>,
}

impl TaskStore {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self {
            repository,
            items: RwLock::new(Vec::new()),
            loaded_at: RwLock::new(None),
        }
    }

    /// Replaces the whole collection with the server's list.
    pub async fn load(&self) -> AppResult<usize> {
        let tasks = self.repository.list_tasks().await?;
        let count = tasks.len();

        *self.items.write().await = tasks;
        *self.loaded_at.write().await = Some(Utc::now());

        tracing::info!("Loaded {} tasks", count);
        Ok(count)
    }

    /// Appends the server-returned task; the id always comes from the server.
    pub async fn add(&self, task: &NewTask) -> AppResult<Task> {
        let created = self.repository.create_task(task).await?;
        self.items.write().await.push(created.clone());

        tracing::info!("Added task {}", created.id);
        Ok(created)
    }

    /// Returns `None` when no local entry has the id; the response is dropped
    /// in that case.
    pub async fn edit(
        &self,
        id: TaskId,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> AppResult<Option<Task>> {
        let task = Task::new(id, title, body);
        let updated = self.repository.update_task(&task).await?;

        let mut items = self.items.write().await;
        match items.iter_mut().find(|item| item.id == updated.id) {
            Some(item) => {
                *item = updated.clone();
                tracing::info!("Edited task {}", id);
                Ok(Some(updated))
            }
            None => {
                tracing::warn!("Edited task {} is not in the local collection", id);
                Ok(None)
            }
        }
    }

    /// Returns whether a local entry was removed.
    pub async fn delete(&self, id: TaskId) -> AppResult<bool> {
        self.repository.delete_task(id).await?;

        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|task| task.id != id);
        let removed = items.len() != before;

        tracing::info!("Deleted task {} (present locally: {})", id, removed);
        Ok(removed)
    }

    pub async fn snapshot(&self) -> Vec<Task> {
        self.items.read().await.clone()
    }

    pub async fn loaded_at(&self) -> Option<DateTime<Utc>> {
        *self.loaded_at.read().await
    }
}
