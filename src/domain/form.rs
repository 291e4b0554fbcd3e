use super::NewTask;

pub const TITLE_REQUIRED: &str = "Title is required!";
pub const BODY_REQUIRED: &str = "Description is required!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Body,
}

impl FormField {
    pub fn toggled(self) -> Self {
        match self {
            FormField::Title => FormField::Body,
            FormField::Body => FormField::Title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormErrors {
    pub title: Option<&'static str>,
    pub body: Option<&'static str>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }

    pub fn get(&self, field: FormField) -> Option<&'static str> {
        match field {
            FormField::Title => self.title,
            FormField::Body => self.body,
        }
    }
}

/// State of the task creation form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskForm {
    pub title: String,
    pub body: String,
    pub errors: FormErrors,
}

impl TaskForm {
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Body => &self.body,
        }
    }

    /// Any edit of a field clears that field's error, and only that one.
    pub fn edit(&mut self, field: FormField, apply: impl FnOnce(&mut String)) {
        match field {
            FormField::Title => {
                apply(&mut self.title);
                self.errors.title = None;
            }
            FormField::Body => {
                apply(&mut self.body);
                self.errors.body = None;
            }
        }
    }

    pub fn push_char(&mut self, field: FormField, c: char) {
        self.edit(field, |value| value.push(c));
    }

    pub fn pop_char(&mut self, field: FormField) {
        self.edit(field, |value| {
            value.pop();
        });
    }

    /// Validates and, on success, hands back the raw values and resets the form.
    pub fn submit(&mut self) -> Option<NewTask> {
        let errors = FormErrors {
            title: self.title.trim().is_empty().then_some(TITLE_REQUIRED),
            body: self.body.trim().is_empty().then_some(BODY_REQUIRED),
        };

        if !errors.is_empty() {
            self.errors = errors;
            return None;
        }

        let form = std::mem::take(self);
        Some(NewTask {
            title: form.title,
            body: form.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(title: &str, body: &str) -> TaskForm {
        TaskForm {
            title: title.to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_submit_returns_raw_values_and_clears_form() {
        let mut form = filled(" Ship it ", "today");
        let task = form.submit().expect("valid form");
        assert_eq!(task.title, " Ship it ");
        assert_eq!(task.body, "today");
        assert_eq!(form, TaskForm::default());
    }

    #[test]
    fn test_blank_fields_block_submit() {
        let mut form = filled("   ", "");
        assert!(form.submit().is_none());
        assert_eq!(form.errors.title, Some(TITLE_REQUIRED));
        assert_eq!(form.errors.body, Some(BODY_REQUIRED));
        assert_eq!(form.title, "   ");
    }

    #[test]
    fn test_only_missing_field_gets_error() {
        let mut form = filled("title", " \n");
        assert!(form.submit().is_none());
        assert_eq!(form.errors.get(FormField::Title), None);
        assert_eq!(form.errors.get(FormField::Body), Some(BODY_REQUIRED));
    }

    #[test]
    fn test_editing_a_field_clears_only_its_error() {
        let mut form = TaskForm::default();
        assert!(form.submit().is_none());

        form.push_char(FormField::Title, 'x');
        assert_eq!(form.errors.title, None);
        assert_eq!(form.errors.body, Some(BODY_REQUIRED));

        form.pop_char(FormField::Body);
        assert!(form.errors.is_empty());
    }
}
