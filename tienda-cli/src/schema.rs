use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use tienda::schema::Schema as _;
use tienda_compile::sql::write_table_create_sql;

use crate::Runnable;

/// Prints the CREATE statements of every registered table
#[derive(Parser)]
pub struct Schema {
    /// Prints more information
    #[clap(short, long)]
    pub verbose: bool,
}

#[async_trait]
impl Runnable for Schema {
    async fn run(&mut self) -> Result<()> {
        for schema in productos::schema::Schema::database_schemas() {
            log::debug!(
                "table {} has {} columns and {} indexes",
                schema.table_name,
                schema.columns.len(),
                schema.indexes.len()
            );
            println!("{}", write_table_create_sql(None, &schema));
        }

        Ok(())
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}
