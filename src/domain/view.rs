//! Filter, sort and pagination over the task collection.
//!
//! Everything here is a pure function of the collection and a [`ViewState`];
//! nothing is written back to the store.

use serde::Serialize;
use std::cmp::Ordering;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::Task;

pub const PAGE_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Title,
    Body,
}

impl SortField {
    pub fn toggled(self) -> Self {
        match self {
            SortField::Title => SortField::Body,
            SortField::Body => SortField::Title,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortField::Title => "Title",
            SortField::Body => "Description",
        }
    }

    fn key(self, task: &Task) -> &str {
        match self {
            SortField::Title => &task.title,
            SortField::Body => &task.body,
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortField::Title),
            "body" => Ok(SortField::Body),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Asc => "↓",
            SortOrder::Desc => "↑",
        }
    }
}

/// View-local filter/sort/page state. `current_page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub filter: String,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    pub current_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filter: String::new(),
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
            current_page: 1,
        }
    }
}

impl ViewState {
    // Filter and sort changes leave current_page untouched.
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn toggle_sort_field(&mut self) {
        self.sort_field = self.sort_field.toggled();
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_order = self.sort_order.toggled();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.current_page = (self.current_page + 1).min(total_pages).max(1);
    }
}

/// One rendered page of the derived view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskPage {
    pub rows: Vec<Task>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

impl TaskPage {
    pub fn has_previous(&self) -> bool {
        self.current_page != 1
    }

    pub fn has_next(&self) -> bool {
        self.total_pages > 0 && self.current_page != self.total_pages
    }
}

/// Comparison in the spirit of a default locale collation.
///
/// The primary key ignores accents and case, and orders punctuation before
/// digits before letters. Ties fall back to accents (unaccented first), then
/// to case (lowercase first).
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(primary_key(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| case_tiebreak(a, b))
}

fn char_class(c: char) -> u8 {
    if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    }
}

fn primary_key(s: &str) -> impl Iterator<Item = (u8, char)> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| (char_class(c), c))
}

// Lowercased but with accents kept as combining marks.
fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

fn case_tiebreak(a: &str, b: &str) -> Ordering {
    a.chars()
        .zip(b.chars())
        .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) if y.is_uppercase() => Ordering::Less,
            (false, true) if x.is_uppercase() => Ordering::Greater,
            _ => Ordering::Equal,
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &str) -> Vec<&'a Task> {
    let needle = filter.to_lowercase();
    tasks.iter().filter(|task| task.title_contains(&needle)).collect()
}

pub fn sort_tasks(tasks: &mut [&Task], field: SortField, order: SortOrder) {
    tasks.sort_by(|a, b| {
        let ord = locale_compare(field.key(a), field.key(b));
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

pub fn total_pages(matches: usize) -> usize {
    matches.div_ceil(PAGE_SIZE)
}

/// Runs the filter → sort → paginate pipeline.
pub fn derive_page(tasks: &[Task], state: &ViewState) -> TaskPage {
    let mut filtered = filter_tasks(tasks, &state.filter);
    sort_tasks(&mut filtered, state.sort_field, state.sort_order);

    let total_matches = filtered.len();
    let start = state.current_page.saturating_sub(1).saturating_mul(PAGE_SIZE);
    let rows = filtered
        .into_iter()
        .skip(start)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    TaskPage {
        rows,
        current_page: state.current_page,
        total_pages: total_pages(total_matches),
        total_matches,
    }
}
