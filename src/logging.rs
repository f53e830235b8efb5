use std::env;
use std::ffi::OsStr;
use std::io;
use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Installs the global subscriber: stderr always, plus a daily rolling file
/// when `RAYDRIVE_LOG_FILE` is set. Later calls are no-ops.
pub fn init() {
    // Env filter: use RUST_LOG or default to info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .compact();

    let file_layer = env::var("RAYDRIVE_LOG_FILE").ok().map(|log_path| {
        let path = Path::new(&log_path);
        let dir = path.parent().unwrap_or(Path::new("."));
        let file = path.file_name().unwrap_or(OsStr::new("raydrive.log"));
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file));
        let _ = FILE_GUARD.set(guard);

        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .compact()
            .boxed()
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        // Hook panics to log with backtrace
        std::panic::set_hook(Box::new(|info| {
            let mut msg = String::new();
            if let Some(loc) = info.location() {
                msg.push_str(&format!("panic at {}:{}:{} ", loc.file(), loc.line(), loc.column()));
            }
            if let Some(s) = info.payload().downcast_ref::<&str>() {
                msg.push_str(s);
            } else if let Some(s) = info.payload().downcast_ref::<String>() {
                msg.push_str(s);
            } else {
                msg.push_str("<non-string panic>");
            }
            let bt = std::backtrace::Backtrace::force_capture();
            tracing::error!("{}\nBacktrace:\n{:?}", msg, bt);
        }));
    }
}
