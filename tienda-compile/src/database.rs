use std::borrow::Cow;

use log::{debug, info};
use sqlx::{Executor, PgPool};
use tienda::database::{
    DatabaseColumn, DatabaseDefault, DatabaseIndex, DatabaseSchema, DatabaseType,
};
use tokio_stream::StreamExt;

use crate::{
    error::Error,
    sql::{write_sync_sql, write_table_create_sql},
};

pub const DEFAULT_SCHEMA: &str = "public";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompileDatabaseResult {
    pub queries_executed: usize,
    pub rows_affected: u64,
}

/// Connects to `uri`, then creates or syncs every table in `schemas`.
pub async fn compile_database(
    uri: &str,
    schemas: Vec<DatabaseSchema>,
) -> Result<CompileDatabaseResult, Error> {
    let pool = PgPool::connect(uri).await?;
    DatabaseCompiler::from_pool(&pool, schemas).execute().await
}

pub struct DatabaseCompiler<'pool> {
    pool: Cow<'pool, PgPool>,
    schema_name: String,
    tables: Vec<DatabaseSchema>,
}

impl<'pool> DatabaseCompiler<'pool> {
    pub async fn connect(
        uri: &str,
        tables: Vec<DatabaseSchema>,
    ) -> Result<DatabaseCompiler<'static>, sqlx::Error> {
        let pool = PgPool::connect(uri).await?;

        Ok(DatabaseCompiler {
            pool: Cow::Owned(pool),
            schema_name: DEFAULT_SCHEMA.to_string(),
            tables,
        })
    }

    pub fn from_pool(pool: &'pool PgPool, tables: Vec<DatabaseSchema>) -> DatabaseCompiler<'pool> {
        DatabaseCompiler {
            pool: Cow::Borrowed(pool),
            schema_name: DEFAULT_SCHEMA.to_string(),
            tables,
        }
    }

    /// Reads and alters tables in `schema_name` instead of `public`.
    pub fn with_schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = schema_name.into();
        self
    }

    /// Returns the SQL needed to bring the database in line with the schemas.
    ///
    /// An empty string means the database is already up to date.
    pub async fn compile(&self) -> Result<String, Error> {
        let mut sql = Vec::new();

        for table in &self.tables {
            match self.fetch_table(table).await? {
                Some(db_columns) => {
                    let db_indexes = self.fetch_indexes(table).await?;
                    let sync_sql = write_sync_sql(
                        Some(&self.schema_name),
                        table,
                        &db_columns,
                        &db_indexes,
                    );
                    if !sync_sql.is_empty() {
                        debug!("table {} is out of date", table.table_name);
                        sql.push(sync_sql);
                    }
                }
                None => {
                    debug!("table {} does not exist", table.table_name);
                    sql.push(write_table_create_sql(Some(&self.schema_name), table));
                }
            }
        }

        Ok(sql.join("\n").trim().to_string())
    }

    /// Compiles and runs the SQL against the database.
    pub async fn execute(&self) -> Result<CompileDatabaseResult, Error> {
        let sql = self.compile().await?;
        if sql.is_empty() {
            info!("database is up to date");
            return Ok(CompileDatabaseResult::default());
        }

        debug!("executing:\n{}", sql);
        let results = self
            .pool
            .execute_many(sql.as_str())
            .collect::<Result<Vec<_>, _>>()
            .await?;
        let queries_executed = results.len();
        let rows_affected = results
            .iter()
            .fold(0, |acc, result| result.rows_affected() + acc);

        info!("executed {} queries", queries_executed);
        Ok(CompileDatabaseResult {
            queries_executed,
            rows_affected,
        })
    }

    async fn fetch_table(
        &self,
        table: &DatabaseSchema,
    ) -> Result<Option<Vec<DatabaseColumn>>, Error> {
        #[derive(Debug, sqlx::FromRow)]
        struct ColumnsQuery {
            column_name: String,
            column_default: Option<String>,
            is_nullable: bool,
            data_type: String,
            character_maximum_length: Option<i32>,
            numeric_precision: Option<i32>,
            numeric_scale: Option<i32>,
            is_identity: bool,
            is_primary_key: bool,
            is_unique: bool,
        }

        let raw_columns: Vec<ColumnsQuery> = sqlx::query_as(FETCH_TABLE_QUERY)
            .bind(&self.schema_name)
            .bind(&table.table_name)
            .fetch_all(&*self.pool)
            .await?;

        if raw_columns.is_empty() {
            return Ok(None);
        }

        let columns = raw_columns
            .into_iter()
            .map(|col| {
                let ty = col
                    .data_type
                    .parse::<DatabaseType>()
                    .map(|database_type| match database_type {
                        DatabaseType::Text(None) => {
                            DatabaseType::Text(col.character_maximum_length)
                        }
                        DatabaseType::Numeric(None) => DatabaseType::Numeric(
                            col.numeric_precision
                                .zip(col.numeric_scale)
                                .and_then(|(p, s)| {
                                    Some((u16::try_from(p).ok()?, u16::try_from(s).ok()?))
                                }),
                        ),
                        other => other,
                    })
                    .map_err(|_| {
                        Error::UnsupportedType(
                            table.table_name.clone(),
                            col.column_name.clone(),
                            col.data_type.clone(),
                        )
                    })?;

                Ok(DatabaseColumn {
                    name: col.column_name,
                    ty,
                    nullable: col.is_nullable,
                    default: col.column_default.map(parse_column_default),
                    unique: col.is_unique,
                    primary_key: col.is_primary_key,
                    identity: col.is_identity,
                })
            })
            .collect::<Result<_, Error>>()?;

        Ok(Some(columns))
    }

    async fn fetch_indexes(&self, table: &DatabaseSchema) -> Result<Vec<DatabaseIndex>, Error> {
        let rows: Vec<(String, Vec<String>, bool)> = sqlx::query_as(FETCH_INDEXES_QUERY)
            .bind(&self.schema_name)
            .bind(&table.table_name)
            .fetch_all(&*self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(name, columns, unique)| DatabaseIndex {
                name,
                columns,
                unique,
            })
            .collect())
    }
}

/// Parses a default expression as reported by `information_schema.columns`.
fn parse_column_default(def: String) -> DatabaseDefault {
    if let Some(quoted) = def.strip_prefix('\'') {
        // 'text'::character varying
        let end = quoted.rfind('\'').unwrap_or(quoted.len());
        return DatabaseDefault::String(quoted[..end].replace("''", "'"));
    }

    match def.as_str() {
        "true" => DatabaseDefault::Bool(true),
        "false" => DatabaseDefault::Bool(false),
        _ => {
            if let Ok(num) = def.parse::<u64>() {
                DatabaseDefault::Int(num)
            } else if let Ok(num) = def.parse::<f64>() {
                DatabaseDefault::Float(num)
            } else {
                DatabaseDefault::Raw(def)
            }
        }
    }
}

const FETCH_TABLE_QUERY: &str = "
SELECT
    column_name::text AS column_name,
    column_default::text AS column_default,
    is_nullable = 'YES' AS is_nullable,
    data_type::text AS data_type,
    character_maximum_length::int4 AS character_maximum_length,
    numeric_precision::int4 AS numeric_precision,
    numeric_scale::int4 AS numeric_scale,
    is_identity = 'YES' AS is_identity,
(
    SELECT
        COUNT(*) > 0
    FROM information_schema.table_constraints tco
    JOIN information_schema.key_column_usage kcu
    ON kcu.constraint_name = tco.constraint_name
    AND kcu.constraint_schema = tco.constraint_schema
    WHERE
        tco.constraint_type = 'PRIMARY KEY' AND
        kcu.table_schema = $1 AND
        kcu.table_name = $2 AND
        kcu.column_name = information_schema.columns.column_name
) AS is_primary_key,
(
    SELECT
        COUNT(*) > 0
    FROM information_schema.table_constraints tco
    JOIN information_schema.key_column_usage kcu
    ON kcu.constraint_name = tco.constraint_name
    AND kcu.constraint_schema = tco.constraint_schema
    WHERE
        tco.constraint_type = 'UNIQUE' AND
        kcu.table_schema = $1 AND
        kcu.table_name = $2 AND
        kcu.column_name = information_schema.columns.column_name
) AS is_unique
FROM information_schema.columns
WHERE table_schema = $1
AND table_name = $2
ORDER BY ordinal_position;
";

const FETCH_INDEXES_QUERY: &str = "
SELECT
    index_class.relname::text,
    array_agg(att.attname::text ORDER BY k.ord)::text[],
    idx.indisunique
FROM pg_index idx
JOIN pg_class index_class ON index_class.oid = idx.indexrelid
JOIN pg_class table_class ON table_class.oid = idx.indrelid
JOIN pg_namespace ns ON ns.oid = table_class.relnamespace
CROSS JOIN LATERAL unnest(idx.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
JOIN pg_attribute att ON att.attrelid = idx.indrelid AND att.attnum = k.attnum
WHERE ns.nspname = $1
AND table_class.relname = $2
AND NOT idx.indisprimary
AND NOT EXISTS (
    SELECT 1 FROM pg_constraint con WHERE con.conindid = idx.indexrelid
)
GROUP BY index_class.relname, idx.indisunique
ORDER BY index_class.relname;
";

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn column_defaults() {
        assert_eq!(
            parse_column_default("true".to_string()),
            DatabaseDefault::Bool(true)
        );
        assert_eq!(
            parse_column_default("0".to_string()),
            DatabaseDefault::Int(0)
        );
        assert_eq!(
            parse_column_default("1.5".to_string()),
            DatabaseDefault::Float(1.5)
        );
        assert_eq!(
            parse_column_default("'it''s'::character varying".to_string()),
            DatabaseDefault::String("it's".to_string())
        );
        assert_eq!(
            parse_column_default("now()".to_string()),
            DatabaseDefault::Raw("NOW()".to_string())
        );
    }
}
