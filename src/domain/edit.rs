use super::{Task, TaskId};

/// Inline edit state of the list. Only one row can be in edit mode at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowEdit {
    #[default]
    Viewing,
    Editing {
        id: TaskId,
        draft_title: String,
        draft_body: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftField {
    #[default]
    Title,
    Body,
}

impl DraftField {
    pub fn toggled(self) -> Self {
        match self {
            DraftField::Title => DraftField::Body,
            DraftField::Body => DraftField::Title,
        }
    }
}

/// What a Save resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Commit {
        id: TaskId,
        title: String,
        body: String,
    },
    /// The edited task is no longer in the collection.
    Missing(TaskId),
    NotEditing,
}

impl RowEdit {
    /// Seeds the drafts from the task's current values.
    pub fn begin(task: &Task) -> Self {
        RowEdit::Editing {
            id: task.id,
            draft_title: task.title.clone(),
            draft_body: task.body.clone(),
        }
    }

    pub fn is_editing(&self, id: TaskId) -> bool {
        matches!(self, RowEdit::Editing { id: editing, .. } if *editing == id)
    }

    pub fn editing_id(&self) -> Option<TaskId> {
        match self {
            RowEdit::Editing { id, .. } => Some(*id),
            RowEdit::Viewing => None,
        }
    }

    pub fn draft_mut(&mut self, field: DraftField) -> Option<&mut String> {
        match (self, field) {
            (RowEdit::Editing { draft_title, .. }, DraftField::Title) => Some(draft_title),
            (RowEdit::Editing { draft_body, .. }, DraftField::Body) => Some(draft_body),
            (RowEdit::Viewing, _) => None,
        }
    }

    /// Leaves edit mode and decides whether the drafts should be sent.
    pub fn save(&mut self, collection: &[Task]) -> SaveOutcome {
        match std::mem::take(self) {
            RowEdit::Viewing => SaveOutcome::NotEditing,
            RowEdit::Editing {
                id,
                draft_title,
                draft_body,
            } => {
                if collection.iter().any(|task| task.id == id) {
                    SaveOutcome::Commit {
                        id,
                        title: draft_title,
                        body: draft_body,
                    }
                } else {
                    SaveOutcome::Missing(id)
                }
            }
        }
    }

    pub fn cancel(&mut self) {
        *self = RowEdit::Viewing;
    }
}
