//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `tenbin_core` linkage.
//! - Print the stored board summary when `TENBIN_DB_PATH` points at a database.

use tenbin_core::db::{open_db, open_db_in_memory};
use tenbin_core::{SqliteKeyValueStore, TaskBoard};

fn main() {
    println!("tenbin_core ping={}", tenbin_core::ping());
    println!("tenbin_core version={}", tenbin_core::core_version());

    let opened = match std::env::var("TENBIN_DB_PATH") {
        Ok(path) if !path.trim().is_empty() => open_db(path.trim()),
        _ => open_db_in_memory(),
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("tenbin_core storage=error {err}");
            std::process::exit(1);
        }
    };
    let store = match SqliteKeyValueStore::try_new(&conn) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("tenbin_core storage=error {err}");
            std::process::exit(1);
        }
    };

    let board = TaskBoard::load(store);
    let balance = board.balance();
    println!(
        "tenbin_core tasks={} work={} play={} tilt={:?}",
        board.tasks().len(),
        balance.work_sum,
        balance.play_sum,
        balance.tilt()
    );
}
