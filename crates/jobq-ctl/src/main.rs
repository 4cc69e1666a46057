/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands, ConfigCommands, DlqCommands, WorkerCommands};
use jobq::{ConfigStore, Database, DAL};

// Workers are single-threaded processes; everything else is short-lived
// command handling, so one runtime flavor serves both.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    // A store that cannot be opened or migrated is fatal: refuse to start
    // rather than run against a broken database.
    let database =
        Database::new(&cli.database).context("Failed to initialize the job database")?;
    database
        .run_migrations()
        .await
        .context("Failed to migrate the job database")?;
    let dal = DAL::new(database);

    let config = ConfigStore::new(&cli.config);
    config
        .init()
        .context("Failed to initialize the configuration store")?;

    match cli.command {
        Commands::Enqueue {
            command,
            id,
            priority,
        } => commands::enqueue::run(&dal, &config, command, id, priority).await,
        Commands::Worker(WorkerCommands::Start { count }) => {
            commands::worker::start(&cli.database, &cli.config, count)
        }
        Commands::Worker(WorkerCommands::Stop) => commands::worker::stop(),
        Commands::Worker(WorkerCommands::Run) => {
            commands::worker::run_worker(dal, config).await;
            Ok(())
        }
        Commands::Status => commands::status::run(&dal).await,
        Commands::List { state, output } => commands::list::run(&dal, state, output).await,
        Commands::Dlq(DlqCommands::List { output }) => commands::dlq::list(&dal, output).await,
        Commands::Dlq(DlqCommands::Retry { job_id }) => commands::dlq::retry(&dal, &job_id).await,
        Commands::Config(ConfigCommands::Set { key, value }) => {
            commands::config::set(&config, key, value)
        }
        Commands::Config(ConfigCommands::Show) => commands::config::show(&config),
        Commands::Stats => commands::stats::run(&dal).await,
    }
}
