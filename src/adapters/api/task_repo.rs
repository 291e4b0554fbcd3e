use super::{ApiClient, TaskCreateDto, TaskDto, TaskUpdateDto};
use crate::{
    domain::{NewTask, Task, TaskId},
    ports::{RepositoryResult, TaskRepository},
};
use async_trait::async_trait;

const TASKS_PATH: &str = "/posts";

pub struct RestTaskRepository {
    client: ApiClient,
}

impl RestTaskRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn task_path(id: TaskId) -> String {
        format!("{TASKS_PATH}/{id}")
    }
}

#[async_trait]
impl TaskRepository for RestTaskRepository {
    async fn list_tasks(&self) -> RepositoryResult<Vec<Task>> {
        let task_dtos: Vec<TaskDto> = self.client.get(TASKS_PATH).await?;
        Ok(task_dtos.into_iter().map(|dto| dto.into()).collect())
    }

    async fn create_task(&self, task: &NewTask) -> RepositoryResult<Task> {
        let create_dto = TaskCreateDto::from(task);

        let task_dto: TaskDto = self.client.post(TASKS_PATH, &create_dto).await?;
        Ok(task_dto.into())
    }

    async fn update_task(&self, task: &Task) -> RepositoryResult<Task> {
        let update_dto = TaskUpdateDto::from(task);

        let task_dto: TaskDto = self
            .client
            .put(&Self::task_path(task.id), &update_dto)
            .await?;
        Ok(task_dto.into())
    }

    async fn delete_task(&self, id: TaskId) -> RepositoryResult<()> {
        self.client.delete(&Self::task_path(id)).await
    }
}
