use std::path::Path;

pub const LOG_FILE_BASENAME: &str = "todo-store";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 10;

/// Used when neither `TODO_STORE_LOG` nor `RUST_LOG` is set.
pub fn default_log_spec() -> &'static str {
    if cfg!(debug_assertions) {
        "warn,todo_store=debug"
    } else {
        "warn,todo_store=info"
    }
}

/// Logs live next to `store.json`.
pub fn log_directory(data_dir: &Path) -> &Path {
    data_dir
}

#[cfg(feature = "app")]
fn log_file_spec(data_dir: &Path) -> flexi_logger::FileSpec {
    flexi_logger::FileSpec::default()
        .directory(log_directory(data_dir))
        .basename(LOG_FILE_BASENAME)
        .suffix(LOG_FILE_SUFFIX)
}

/// Starts the file logger for `data_dir`. The returned handle flushes on drop,
/// so `main` keeps it alive for the whole run.
#[cfg(feature = "app")]
pub fn init_logging(
    data_dir: &Path,
    spec: Option<&str>,
) -> Result<flexi_logger::LoggerHandle, flexi_logger::FlexiLoggerError> {
    use flexi_logger::{detailed_format, Cleanup, Criterion, Duplicate, Logger, Naming, WriteMode};

    std::fs::create_dir_all(data_dir)?;

    let spec = spec.unwrap_or_else(|| default_log_spec());
    let echo = if cfg!(debug_assertions) {
        Duplicate::Info
    } else {
        Duplicate::None
    };
    let handle = Logger::try_with_str(spec)?
        .log_to_file(log_file_spec(data_dir))
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
        )
        .duplicate_to_stdout(echo)
        .start()?;

    install_panic_hook();

    log::info!(
        "logging to {} spec={spec}",
        log_directory(data_dir).display()
    );
    Ok(handle)
}

#[cfg(any(feature = "app", test))]
fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}

#[cfg(feature = "app")]
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let thread = std::thread::current();
        let thread = thread.name().unwrap_or("<unnamed>");
        let location = info
            .location()
            .map(|loc| loc.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        let backtrace = std::backtrace::Backtrace::force_capture();

        log::error!(
            "panic in thread={thread} at {location}: {}\nbacktrace:\n{backtrace}",
            panic_message(info.payload())
        );
        default_hook(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_targets_this_crate() {
        assert!(default_log_spec().starts_with("warn,todo_store="));
    }

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let literal: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(literal.as_ref()), "boom");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");
        let other: Box<dyn std::any::Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other.as_ref()), "<non-string panic payload>");
    }

    #[test]
    fn logs_share_the_data_dir() {
        let dir = Path::new("/tmp/todo-store");
        assert_eq!(log_directory(dir), dir);
    }
}
