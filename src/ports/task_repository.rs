use crate::domain::{NewTask, Task, TaskId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RepositoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The remote task resource.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list_tasks(&self) -> RepositoryResult<Vec<Task>>;
    async fn create_task(&self, task: &NewTask) -> RepositoryResult<Task>;
    async fn update_task(&self, task: &Task) -> RepositoryResult<Task>;
    async fn delete_task(&self, id: TaskId) -> RepositoryResult<()>;
}
