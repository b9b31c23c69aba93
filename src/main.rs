use std::error::Error;

use todo_store::logging::init_logging;
use todo_store::{AppConfig, FileStore, TodoListState};

/// Opens the store and prints the selected day and anytime sections as JSON.
fn main() -> Result<(), Box<dyn Error>> {
    let mut config = AppConfig::from_env();
    if let Some(dir) = std::env::args().nth(1) {
        config = config.with_data_dir(dir);
    }

    let _logger = init_logging(&config.data_dir, config.log_spec.as_deref())?;

    let store = match FileStore::open(config.data_dir.clone()) {
        Ok(store) => store,
        Err(err) => {
            log::warn!(
                "starting with an empty store, failed to open {}: {err}",
                config.data_dir.display()
            );
            let store = FileStore::new(config.data_dir.clone());
            store.ensure_dirs()?;
            store
        }
    };
    let state = TodoListState::new(store);
    log::info!(
        "loaded state selected_date={} scheduled_days={} anytime={}",
        state.selected_date_key(),
        state.scheduled().len(),
        state.anytime().len()
    );

    println!("{}", serde_json::to_string_pretty(&state.sections())?);
    Ok(())
}
