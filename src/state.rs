use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::dates::{format_date, today};
use crate::events::{Listener, StateChange};
use crate::models::{Scheduled, Section, TaskSection, Todo, KEY_FIRST_LAUNCH};
use crate::storage::KeyValueStore;

const FIRST_LAUNCH_SEEN: &str = "false";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    IndexOutOfRange {
        section: Section,
        index: usize,
        len: usize,
    },
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::IndexOutOfRange {
                section,
                index,
                len,
            } => write!(f, "index {index} out of range for {section} (len {len})"),
        }
    }
}

impl std::error::Error for StateError {}

/// Where `insert` places a todo within its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertPosition {
    #[default]
    End,
    At(usize),
}

impl InsertPosition {
    fn resolve(self, section: Section, len: usize) -> Result<usize, StateError> {
        match self {
            InsertPosition::End => Ok(len),
            InsertPosition::At(index) if index <= len => Ok(index),
            InsertPosition::At(index) => Err(StateError::IndexOutOfRange {
                section,
                index,
                len,
            }),
        }
    }
}

impl From<Option<usize>> for InsertPosition {
    fn from(value: Option<usize>) -> Self {
        value.map_or(InsertPosition::End, InsertPosition::At)
    }
}

/// Scheduled and anytime todos, written through to a key-value store on every change.
#[derive(Clone)]
pub struct TodoListState {
    inner: Arc<Mutex<StateData>>,
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl TodoListState {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self::with_selected_date(store, today())
    }

    /// Seeds example todos on first launch, otherwise loads what `store` holds.
    pub fn with_selected_date(
        store: impl KeyValueStore + 'static,
        selected_date: NaiveDate,
    ) -> Self {
        let mut data = StateData {
            scheduled: Scheduled::new(),
            anytime: Vec::new(),
            selected_date,
            store: Box::new(store),
        };

        if data.store.contains(KEY_FIRST_LAUNCH) {
            data.load_all();
        } else {
            data.seed();
            data.save(Section::Scheduled);
            data.save(Section::Anytime);
        }

        Self {
            inner: Arc::new(Mutex::new(data)),
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn scheduled(&self) -> Scheduled {
        let guard = self.inner.lock().expect("state poisoned");
        guard.scheduled.clone()
    }

    pub fn anytime(&self) -> Vec<Todo> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.anytime.clone()
    }

    pub fn tasks_on(&self, date: &str) -> Vec<Todo> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.scheduled.get(date).cloned().unwrap_or_default()
    }

    pub fn selected_date(&self) -> NaiveDate {
        let guard = self.inner.lock().expect("state poisoned");
        guard.selected_date
    }

    pub fn selected_date_key(&self) -> String {
        format_date(self.selected_date())
    }

    pub fn set_selected_date(&self, date: NaiveDate) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.selected_date = date;
    }

    /// The selected day's section followed by the anytime section.
    pub fn sections(&self) -> Vec<TaskSection> {
        let guard = self.inner.lock().expect("state poisoned");
        let date = format_date(guard.selected_date);
        let items = guard.scheduled.get(&date).cloned().unwrap_or_default();
        vec![
            TaskSection { date, items },
            TaskSection {
                date: String::new(),
                items: guard.anytime.clone(),
            },
        ]
    }

    /// Runs `listener` after every accepted change to either collection.
    /// The state is unlocked by then, so listeners may read it; they must not
    /// subscribe from inside the callback.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&StateChange) + Send + 'static,
    {
        let mut guard = self.listeners.lock().expect("listeners poisoned");
        guard.push(Box::new(listener));
    }

    fn notify(&self, change: StateChange) {
        let guard = self.listeners.lock().expect("listeners poisoned");
        for listener in guard.iter() {
            listener(&change);
        }
    }

    /// Scheduled todos are looked up under the selected date. An unknown date is a no-op.
    pub fn toggle_complete(&self, section: Section, index: usize) -> Result<(), StateError> {
        let change = {
            let mut guard = self.inner.lock().expect("state poisoned");
            let items = match section {
                Section::Scheduled => {
                    let date = format_date(guard.selected_date);
                    match guard.scheduled.get_mut(&date) {
                        Some(items) => items,
                        None => return Ok(()),
                    }
                }
                Section::Anytime => &mut guard.anytime,
            };
            let len = items.len();
            let todo = items.get_mut(index).ok_or(StateError::IndexOutOfRange {
                section,
                index,
                len,
            })?;
            todo.toggle_completed();
            guard.commit(section)
        };
        self.notify(change);
        Ok(())
    }

    /// Scheduled todos go under `date`, or the selected date, and take that date.
    /// Anytime todos lose their date and time.
    pub fn insert(
        &self,
        todo: Todo,
        section: Section,
        position: InsertPosition,
        date: Option<&str>,
    ) -> Result<(), StateError> {
        let mut todo = todo;
        let change = {
            let mut guard = self.inner.lock().expect("state poisoned");
            match section {
                Section::Scheduled => {
                    let date = guard.resolve_date(date);
                    let len = guard.scheduled.get(&date).map_or(0, Vec::len);
                    let index = position.resolve(section, len)?;
                    todo.date = Some(date.clone());
                    guard.scheduled.entry(date).or_default().insert(index, todo);
                }
                Section::Anytime => {
                    let index = position.resolve(section, guard.anytime.len())?;
                    todo.date = Some(String::new());
                    todo.time = Some(String::new());
                    guard.anytime.insert(index, todo);
                }
            }
            guard.commit(section)
        };
        self.notify(change);
        Ok(())
    }

    /// Returns `None` when no todos were ever scheduled on the resolved date.
    /// Removing the last todo of a date keeps the date with an empty list.
    pub fn remove(
        &self,
        section: Section,
        index: usize,
        date: Option<&str>,
    ) -> Result<Option<Todo>, StateError> {
        let (removed, change) = {
            let mut guard = self.inner.lock().expect("state poisoned");
            let items = match section {
                Section::Scheduled => {
                    let date = guard.resolve_date(date);
                    match guard.scheduled.get_mut(&date) {
                        Some(items) => items,
                        None => return Ok(None),
                    }
                }
                Section::Anytime => &mut guard.anytime,
            };
            if index >= items.len() {
                return Err(StateError::IndexOutOfRange {
                    section,
                    index,
                    len: items.len(),
                });
            }
            let removed = items.remove(index);
            (removed, guard.commit(section))
        };
        self.notify(change);
        Ok(Some(removed))
    }
}

enum Loaded<T> {
    Value(T),
    Missing,
    Unreadable,
}

struct StateData {
    scheduled: Scheduled,
    anytime: Vec<Todo>,
    selected_date: NaiveDate,
    store: Box<dyn KeyValueStore>,
}

impl StateData {
    fn resolve_date(&self, date: Option<&str>) -> String {
        date.map(str::to_string)
            .unwrap_or_else(|| format_date(self.selected_date))
    }

    fn seed(&mut self) {
        let date = format_date(self.selected_date);
        log::info!("first launch, seeding example todos date={date}");
        if let Err(err) = self
            .store
            .set(KEY_FIRST_LAUNCH, FIRST_LAUNCH_SEEN.to_string())
        {
            log::warn!("failed to record first launch: {err}");
        }

        let scheduled = Todo::new("Create new task")
            .with_date(date.clone())
            .with_time("8:00 PM")
            .with_description("Click the plus button to add a scheduled task.");
        self.scheduled = Scheduled::from([(date, vec![scheduled])]);
        self.anytime = vec![Todo::new("Update your task")
            .with_date("")
            .with_time("")
            .with_description("This task has not yet been scheduled.")];
    }

    /// Missing keys are written back empty. Unreadable ones are left in storage
    /// and their collection starts empty.
    fn load_all(&mut self) {
        match self.load::<Scheduled>(Section::Scheduled) {
            Loaded::Value(scheduled) => {
                self.scheduled = scheduled;
                self.save(Section::Scheduled);
            }
            Loaded::Missing => self.save(Section::Scheduled),
            Loaded::Unreadable => {}
        }
        match self.load::<Vec<Todo>>(Section::Anytime) {
            Loaded::Value(anytime) => {
                self.anytime = anytime;
                self.save(Section::Anytime);
            }
            Loaded::Missing => self.save(Section::Anytime),
            Loaded::Unreadable => {}
        }
    }

    fn load<T: DeserializeOwned>(&self, section: Section) -> Loaded<T> {
        let key = section.as_str();
        let json = match self.store.get(key) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::debug!("nothing stored under key={key}");
                return Loaded::Missing;
            }
            Err(err) => {
                log::warn!("failed to read key={key}: {err}");
                return Loaded::Unreadable;
            }
        };
        match serde_json::from_str(&json) {
            Ok(value) => Loaded::Value(value),
            Err(err) => {
                log::warn!("ignoring unreadable data under key={key}: {err}");
                Loaded::Unreadable
            }
        }
    }

    /// Persists the whole collection and snapshots it for listeners.
    fn commit(&mut self, section: Section) -> StateChange {
        self.save(section);
        match section {
            Section::Scheduled => StateChange::Scheduled(self.scheduled.clone()),
            Section::Anytime => StateChange::Anytime(self.anytime.clone()),
        }
    }

    /// Failures leave the previously stored value in place.
    fn save(&mut self, section: Section) {
        let key = section.as_str();
        let encoded = match section {
            Section::Scheduled => serde_json::to_string(&self.scheduled),
            Section::Anytime => serde_json::to_string(&self.anytime),
        };
        let json = match encoded {
            Ok(json) => json,
            Err(err) => {
                log::warn!("skipping save of key={key}: {err}");
                return;
            }
        };
        match self.store.set(key, json) {
            Ok(()) => log::debug!("saved key={key}"),
            Err(err) => log::warn!("failed to save key={key}: {err}"),
        }
    }
}
