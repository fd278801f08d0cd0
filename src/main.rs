use std::sync::Arc;

use anyhow::Result;
use chrono::Local;

use desklog::app_data::{AppDirs, BundledFile, DEFAULT_APP_NAME};
use desklog::config::{self, LoggingConfig, CONFIG_FILE_NAME};
use desklog::logging::{self, LoggingContext};
use desklog::messages::MessageCatalog;

const CLASS: &str = "desklog::main";

const BUNDLED_FILES: &[BundledFile] = &[
    BundledFile {
        name: CONFIG_FILE_NAME,
        contents: include_bytes!("../resources/logging.toml"),
    },
    BundledFile {
        name: "messages_en.toml",
        contents: include_bytes!("../resources/messages_en.toml"),
    },
];

fn main() -> Result<()> {
    let app_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());
    let dirs = AppDirs::new(&app_name);

    // Seed defaults first so the config and catalog below exist
    let seeded = dirs.initialize_user_data_files(BUNDLED_FILES)?;

    let config = LoggingConfig::load_from(&config::config_file_path(&dirs))?;
    let messages = MessageCatalog::load(&dirs.data_file_path("messages_en.toml"))
        .unwrap_or_else(|_| MessageCatalog::new());

    let context = Arc::new(LoggingContext::new(dirs.clone(), config.log_settings()));
    context.initialize();

    // Route `tracing` macros from dependencies into the same sinks
    logging::install_tracing(Arc::clone(&context))?;

    for path in &seeded.created {
        context.info(CLASS, messages.format("data.seeded", &[&path.display()]));
    }
    for (path, reason) in &seeded.failed {
        context.warning(
            CLASS,
            messages.format("data.seed_failed", &[&path.display(), reason]),
        );
    }

    match context.log_directory() {
        Some(logs_dir) => {
            // Clean up log files past the retention period
            let today = Local::now().date_naive();
            if let Ok(count) = logging::cleanup_old_logs(&logs_dir, today, config.retention_days) {
                if count > 0 {
                    tracing::info!(target: CLASS, "{}", messages.format("logs.cleaned", &[&count]));
                }
            }
            context.info(
                CLASS,
                messages.format("app.started", &[&dirs.app_name(), &logs_dir.display()]),
            );
        }
        None => context.warning(
            CLASS,
            messages.format("app.console_only", &[&dirs.app_name()]),
        ),
    }

    context.flush();
    Ok(())
}
