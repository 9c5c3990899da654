use chrono::Utc;

use shoplens_store::{connect, fixtures, migrations, SqliteRecordStore};

use crate::commands::{self, CommandResult};

pub fn run(database_url: &str) -> CommandResult {
    let runtime = match commands::runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect(database_url)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let store = SqliteRecordStore::new(pool);
        let summary = fixtures::seed(&store, Utc::now())
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 6u8))?;
        Ok::<fixtures::SeedSummary, (&'static str, String, u8)>(summary)
    });

    match result {
        Ok(summary) => CommandResult::success(
            "seed",
            format!(
                "seeded demo data: {} orders, {} customers, {} products",
                summary.orders, summary.customers, summary.products
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}
