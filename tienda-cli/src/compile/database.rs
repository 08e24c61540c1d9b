use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use log::info;
use tienda::schema::Schema as _;
use tienda_compile::database::DatabaseCompiler;

use crate::config::{Config, CONFIG_FILE};
use crate::Runnable;

/// Creates or syncs the registered tables in the database
#[derive(Parser)]
pub struct Database {
    /// Postgres connection url
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
    /// Prints the SQL instead of running it
    #[clap(long)]
    pub dry_run: bool,
    /// Prints more information
    #[clap(short, long)]
    pub verbose: bool,
}

#[async_trait]
impl Runnable for Database {
    async fn run(&mut self) -> Result<()> {
        let config = Config::load(CONFIG_FILE).await?;
        let uri = config.database_url(self.database_url.as_deref())?;

        let compiler =
            DatabaseCompiler::connect(&uri, productos::schema::Schema::database_schemas())
                .await
                .context("could not connect to database")?
                .with_schema_name(config.schema());

        if self.dry_run {
            let sql = compiler
                .compile()
                .await
                .context("could not compile database")?;
            if sql.is_empty() {
                info!("database is up to date");
            } else {
                println!("{}", sql);
            }
            return Ok(());
        }

        let result = compiler
            .execute()
            .await
            .context("could not compile database")?;
        info!(
            "compiled database ({} queries, {} rows affected)",
            result.queries_executed, result.rows_affected
        );

        Ok(())
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}
