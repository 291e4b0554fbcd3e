use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        TaskId(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub body: String,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
        }
    }

    /// Business rule: title match used by the list filter
    pub fn title_contains(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
    }
}

/// A task that has not been stored yet; the remote resource assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub body: String,
}

impl NewTask {
    /// Validates the fields but keeps the raw values, whitespace included.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> DomainResult<Self> {
        let title = title.into();
        let body = body.into();

        if title.trim().is_empty() {
            return Err(DomainError::MissingField("title".to_string()));
        }
        if body.trim().is_empty() {
            return Err(DomainError::MissingField("body".to_string()));
        }

        Ok(Self { title, body })
    }
}
