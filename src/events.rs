use crate::models::{Scheduled, Section, Todo};

/// Snapshot of a collection after it was reassigned.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "section", content = "items")]
pub enum StateChange {
    Scheduled(Scheduled),
    Anytime(Vec<Todo>),
}

impl StateChange {
    pub fn section(&self) -> Section {
        match self {
            StateChange::Scheduled(_) => Section::Scheduled,
            StateChange::Anytime(_) => Section::Anytime,
        }
    }
}

pub type Listener = Box<dyn Fn(&StateChange) + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_serializes_with_section_tag() {
        let change = StateChange::Anytime(vec![Todo::new("a").with_date("")]);
        assert_eq!(change.section(), Section::Anytime);
        let value = serde_json::to_value(&change).expect("serialize change");
        assert_eq!(value["section"], "Anytime");
        assert_eq!(value["items"][0]["title"], "a");

        let scheduled = StateChange::Scheduled(Scheduled::new());
        assert_eq!(scheduled.section(), Section::Scheduled);
        assert_eq!(
            serde_json::to_value(&scheduled).expect("serialize change"),
            serde_json::json!({ "section": "Scheduled", "items": {} })
        );
    }
}
