use crate::domain::{NewTask, Task, TaskId};
use serde::{Deserialize, Serialize};

// Unknown fields such as `userId` are ignored.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskDto {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

// Request DTOs
#[derive(Debug, Serialize)]
pub struct TaskCreateDto<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TaskUpdateDto<'a> {
    pub id: u64,
    pub title: &'a str,
    pub body: &'a str,
}

// Conversion implementations
impl From<TaskDto> for Task {
    fn from(dto: TaskDto) -> Self {
        Self {
            id: TaskId(dto.id),
            title: dto.title,
            body: dto.body,
        }
    }
}

impl<'a> From<&'a NewTask> for TaskCreateDto<'a> {
    fn from(task: &'a NewTask) -> Self {
        Self {
            title: &task.title,
            body: &task.body,
        }
    }
}

impl<'a> From<&'a Task> for TaskUpdateDto<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: task.id.0,
            title: &task.title,
            body: &task.body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_dto_ignores_extra_fields() {
        let json = r#"{"userId": 1, "id": 4, "title": "eum et est", "body": "ullam et saepe"}"#;
        let task: Task = serde_json::from_str::<TaskDto>(json).unwrap().into();
        assert_eq!(task, Task::new(4, "eum et est", "ullam et saepe"));
    }

    #[test]
    fn test_create_dto_has_no_id() {
        let new_task = NewTask {
            title: "t".into(),
            body: "b".into(),
        };
        let value = serde_json::to_value(TaskCreateDto::from(&new_task)).unwrap();
        assert_eq!(value, serde_json::json!({"title": "t", "body": "b"}));
    }
}
