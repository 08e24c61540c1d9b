use anyhow::Result;
use async_trait::async_trait;
use clap::{CommandFactory, Parser, Subcommand};

use crate::Runnable;

use self::database::Database;

mod database;

/// Compiles registered schemas into the database
#[derive(Parser)]
pub struct Compile {
    /// Compiles every target
    #[clap(long)]
    pub all: bool,
    #[clap(subcommand)]
    pub subcmd: Option<SubCommand>,
    /// Prints more information
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum SubCommand {
    Database(Database),
}

#[async_trait]
impl Runnable for Compile {
    async fn run(&mut self) -> Result<()> {
        if !self.all {
            return Ok(Compile::command().print_help()?);
        }

        let mut database = Database {
            database_url: std::env::var("DATABASE_URL").ok(),
            dry_run: false,
            verbose: self.verbose,
        };
        database.run().await
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}
