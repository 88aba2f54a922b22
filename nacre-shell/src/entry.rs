//! Implements the command-line interface for the `nacre` shell.

use std::io::IsTerminal;

use crate::args::CommandLineArgs;
use crate::config;
use crate::events;
use crate::productinfo;

/// Main entry point for the `nacre` shell.
pub fn run() {
    //
    // Set up panic handler. On release builds, it will capture panic details to a
    // temporary .toml file and report a human-readable message to the screen.
    //
    human_panic::setup_panic!(
        human_panic::Metadata::new(productinfo::PRODUCT_NAME, productinfo::PRODUCT_VERSION)
            .homepage(productinfo::PRODUCT_DISPLAY_URI)
    );

    //
    // Parse args.
    //
    if let Err(err) = CommandLineArgs::parse_args(std::env::args_os()) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    //
    // Run.
    //
    let exit_code = match run_impl() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}: {err}", productinfo::PRODUCT_NAME);
            1
        }
    };

    std::process::exit(i32::from(exit_code));
}

/// Loads configuration, sets up tracing, and runs the read loop. Returns the exit code.
fn run_impl() -> Result<u8, nacre_interactive::ShellError> {
    let config_result = config::load_config();
    let config = config_result.config;

    // Initializing tracing.
    let mut enabled_events = config.logging.enable.clone();
    if let Ok(list) = std::env::var(events::TRACE_EVENTS_ENV_VAR) {
        enabled_events.extend(events::parse_event_list(&list));
    }
    let event_config = events::TraceEventConfig::init(&enabled_events);

    if let Some(err) = &config_result.error {
        let path = config_result
            .path
            .as_ref()
            .map_or_else(String::new, |p| p.display().to_string());
        tracing::warn!("{path}: {err}");
    }

    tracing::debug!(
        "{}; tracing {:?}",
        productinfo::get_product_display_str(),
        event_config.get_enabled_events()
    );

    let interactive = std::io::stdin().is_terminal();

    // Compose the options we'll use to create the shell.
    let defaults = nacre_core::CreateOptions::default();
    let options = nacre_core::CreateOptions {
        interactive,
        history_file: config.history.file.or(defaults.history_file),
        max_history_entries: config
            .history
            .max_entries
            .unwrap_or(defaults.max_history_entries),
        shell_name: productinfo::PRODUCT_NAME.into(),
    };

    let mut shell = nacre_core::Shell::new(options)?;

    let input = nacre_interactive::MinimalInputBackend::new()?;
    let ui_options = nacre_interactive::Options {
        show_prompt: interactive,
        ..nacre_interactive::Options::default()
    };

    let mut interactive_shell =
        nacre_interactive::InteractiveShell::new(&mut shell, input, ui_options);

    interactive_shell.run_interactively()
}
