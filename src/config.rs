use std::path::PathBuf;

pub const ENV_DATA_DIR: &str = "TODO_STORE_DIR";
pub const ENV_LOG: &str = "TODO_STORE_LOG";

const APP_DIR_NAME: &str = "todo-store";
const FALLBACK_DIR_NAME: &str = "todo-store-data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_spec: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::resolve(|name| std::env::var(name).ok(), dirs::data_dir())
    }

    /// `TODO_STORE_DIR` wins over `platform_data_dir`, which is the
    /// per-user data directory (`dirs::data_dir()`). Blank values count as unset.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        platform_data_dir: Option<PathBuf>,
    ) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_dir = non_empty(ENV_DATA_DIR)
            .map(PathBuf::from)
            .or_else(|| platform_data_dir.map(|dir| dir.join(APP_DIR_NAME)))
            .unwrap_or_else(fallback_data_dir);
        let log_spec = non_empty(ENV_LOG).or_else(|| non_empty("RUST_LOG"));

        Self { data_dir, log_spec }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }
}

/// Used only when the platform reports no data directory.
fn fallback_data_dir() -> PathBuf {
    std::env::temp_dir().join(FALLBACK_DIR_NAME)
}
