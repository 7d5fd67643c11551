//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the per-user store and print the default overview.
//! - Verify `checknotes_core` linkage without any presentation layer.

use checknotes_core::{ListKind, Store};
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = checknotes_core::init_default_logging() {
        eprintln!("logging disabled: {err}");
    }

    let store = match Store::open_default() {
        Ok(store) => store,
        Err(err) => {
            log::error!("event=cli_start module=cli status=error error={err}");
            eprintln!("cannot open store: {err}");
            return ExitCode::FAILURE;
        }
    };

    let lists = match store.service().get_lists(false, false, None) {
        Ok(lists) => lists,
        Err(err) => {
            eprintln!("cannot read lists: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("checknotes_core version={}", checknotes_core::core_version());
    if let Some(path) = store.path() {
        println!("store={}", path.display());
    }
    for list in &lists {
        let pin = if list.pinned { "*" } else { " " };
        match list.kind {
            ListKind::Checklist => println!(
                "{pin} [{}/{}] {}",
                list.done_count, list.item_count, list.title
            ),
            ListKind::Text => println!("{pin} [note] {}", list.title),
        }
    }

    ExitCode::SUCCESS
}
