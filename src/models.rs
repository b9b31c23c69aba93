use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const KEY_SCHEDULED: &str = "Scheduled";
pub const KEY_ANYTIME: &str = "Anytime";
pub const KEY_FIRST_LAUNCH: &str = "isFirstLaunch";

/// Scheduled todos keyed by `YYYY-MM-DD`.
pub type Scheduled = BTreeMap<String, Vec<Todo>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Scheduled,
    Anytime,
}

impl Section {
    /// The storage key the section's collection is persisted under.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Scheduled => KEY_SCHEDULED,
            Section::Anytime => KEY_ANYTIME,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

impl Todo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sentinel with every text field set to `""`.
    pub fn empty() -> Self {
        Self {
            title: String::new(),
            date: Some(String::new()),
            time: Some(String::new()),
            description: Some(String::new()),
            is_completed: false,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn toggle_completed(&mut self) {
        self.is_completed = !self.is_completed;
    }
}

/// One list section as the UI shows it: a date header and its items.
/// The anytime section uses an empty date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSection {
    pub date: String,
    pub items: Vec<Todo>,
}
