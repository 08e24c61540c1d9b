//! SQL writers for table schemas. Nothing here touches a database.
//!
//! Writers take an optional schema name. With `Some(schema)` every table and
//! index reference is qualified as `schema.name`; with `None` names are left
//! for the connection's `search_path` to resolve.

use tienda::database::{DatabaseColumn, DatabaseIndex, DatabaseSchema};

pub fn qualify(schema_name: Option<&str>, name: &str) -> String {
    match schema_name {
        Some(schema_name) => format!("{}.{}", schema_name, name),
        None => name.to_string(),
    }
}

pub fn write_table_create_sql(schema_name: Option<&str>, table: &DatabaseSchema) -> String {
    let columns = table
        .columns
        .iter()
        .map(|column| format!("  {}", write_column_sql(column)))
        .collect::<Vec<_>>()
        .join(",\n");

    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);\n",
        qualify(schema_name, &table.table_name),
        columns
    );

    for index in &table.indexes {
        sql.push_str(&write_index_create_sql(schema_name, &table.table_name, index));
        sql.push('\n');
    }

    sql
}

pub fn write_column_sql(column: &DatabaseColumn) -> String {
    let mut sql = format!("{} {}", column.name, column.ty);

    if column.identity {
        sql.push_str(" GENERATED BY DEFAULT AS IDENTITY");
    }

    if !column.nullable {
        sql.push_str(" NOT NULL");
    }

    if let Some(default) = &column.default {
        sql.push_str(&format!(" DEFAULT {}", default));
    }

    if column.unique {
        sql.push_str(" UNIQUE");
    }

    if column.primary_key {
        sql.push_str(" PRIMARY KEY");
    }

    sql
}

/// The index is always created in the schema of its table.
pub fn write_index_create_sql(
    schema_name: Option<&str>,
    table_name: &str,
    index: &DatabaseIndex,
) -> String {
    format!(
        "CREATE {unique}INDEX IF NOT EXISTS {name} ON {table} ({columns});",
        unique = if index.unique { "UNIQUE " } else { "" },
        name = index.name,
        table = qualify(schema_name, table_name),
        columns = index.columns.join(", "),
    )
}

pub fn write_index_drop_sql(schema_name: Option<&str>, index_name: &str) -> String {
    format!("DROP INDEX IF EXISTS {};", qualify(schema_name, index_name))
}

/// Statements that bring an existing table in line with `table`.
///
/// `db_indexes` holds the indexes on the table that are not backing a
/// constraint. An index whose columns or uniqueness changed is dropped and
/// created again.
pub fn write_sync_sql(
    schema_name: Option<&str>,
    table: &DatabaseSchema,
    db_columns: &[DatabaseColumn],
    db_indexes: &[DatabaseIndex],
) -> String {
    let mut statements = Vec::new();
    let table_name = &table.table_name;
    let qualified_table = qualify(schema_name, table_name);

    for schema_col in &table.columns {
        let db_col = match db_columns
            .iter()
            .find(|db_col| db_col.name == schema_col.name)
        {
            Some(db_col) => db_col,
            None => {
                statements.push(format!(
                    "ALTER TABLE {} ADD COLUMN {};",
                    qualified_table,
                    write_column_sql(schema_col)
                ));
                continue;
            }
        };
        let column = &schema_col.name;

        if schema_col.ty != db_col.ty {
            statements.push(format!(
                "ALTER TABLE {qualified_table} ALTER COLUMN {column} TYPE {ty} USING {column}::{ty};",
                ty = schema_col.ty,
            ));
        }

        if schema_col.nullable != db_col.nullable {
            let action = if db_col.nullable {
                "SET NOT NULL"
            } else {
                "DROP NOT NULL"
            };
            statements.push(format!(
                "ALTER TABLE {qualified_table} ALTER COLUMN {column} {action};"
            ));
        }

        if schema_col.default != db_col.default {
            match &schema_col.default {
                Some(default) => statements.push(format!(
                    "ALTER TABLE {qualified_table} ALTER COLUMN {column} SET DEFAULT {default};"
                )),
                None => statements.push(format!(
                    "ALTER TABLE {qualified_table} ALTER COLUMN {column} DROP DEFAULT;"
                )),
            }
        }

        if schema_col.identity != db_col.identity {
            let action = if schema_col.identity {
                "ADD GENERATED BY DEFAULT AS IDENTITY"
            } else {
                "DROP IDENTITY IF EXISTS"
            };
            statements.push(format!(
                "ALTER TABLE {qualified_table} ALTER COLUMN {column} {action};"
            ));
        }

        if schema_col.unique != db_col.unique {
            if db_col.unique {
                statements.push(format!(
                    "ALTER TABLE {qualified_table} DROP CONSTRAINT {table_name}_{column}_key;"
                ));
            } else {
                statements.push(format!(
                    "ALTER TABLE {qualified_table} ADD CONSTRAINT {table_name}_{column}_key UNIQUE ({column});"
                ));
            }
        }
    }

    // Columns that exist in the db but not in the schema
    for db_col in db_columns
        .iter()
        .filter(|db_col| table.column(&db_col.name).is_none())
    {
        statements.push(format!(
            "ALTER TABLE {} DROP COLUMN {};",
            qualified_table, db_col.name
        ));
    }

    for db_index in db_indexes {
        let stale = match table.index(&db_index.name) {
            Some(index) => index.columns != db_index.columns || index.unique != db_index.unique,
            None => true,
        };
        if stale {
            statements.push(write_index_drop_sql(schema_name, &db_index.name));
        }
    }

    for index in &table.indexes {
        let in_step = db_indexes.iter().any(|db_index| db_index == index);
        if !in_step {
            statements.push(write_index_create_sql(schema_name, table_name, index));
        }
    }

    statements.join("\n")
}

#[cfg(test)]
mod test {
    use tienda::database::{DatabaseDefault, DatabaseType};

    use super::*;

    fn column(name: &str, ty: DatabaseType) -> DatabaseColumn {
        DatabaseColumn {
            name: name.to_string(),
            ty,
            nullable: false,
            default: None,
            unique: false,
            primary_key: false,
            identity: false,
        }
    }

    fn index(name: &str, columns: &[&str]) -> DatabaseIndex {
        DatabaseIndex {
            name: name.to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            unique: false,
        }
    }

    fn schema() -> DatabaseSchema {
        DatabaseSchema {
            table_name: "item".to_string(),
            columns: vec![
                DatabaseColumn {
                    primary_key: true,
                    identity: true,
                    ..column("id", DatabaseType::BigInt)
                },
                column("title", DatabaseType::Text(Some(60))),
                column("cost", DatabaseType::Numeric(Some((8, 2)))),
                DatabaseColumn {
                    default: Some(DatabaseDefault::Bool(true)),
                    ..column("active", DatabaseType::Bool)
                },
            ],
            indexes: vec![index("idx_item_title", &["title"])],
        }
    }

    #[test]
    fn create_table() {
        assert_eq!(
            write_table_create_sql(None, &schema()),
            "CREATE TABLE IF NOT EXISTS item (\n\
             \x20 id bigint GENERATED BY DEFAULT AS IDENTITY NOT NULL PRIMARY KEY,\n\
             \x20 title character varying(60) NOT NULL,\n\
             \x20 cost numeric(8, 2) NOT NULL,\n\
             \x20 active boolean NOT NULL DEFAULT true\n\
             );\n\
             CREATE INDEX IF NOT EXISTS idx_item_title ON item (title);\n"
        );
    }

    #[test]
    fn create_table_in_schema() {
        let sql = write_table_create_sql(Some("ventas"), &schema());
        let statements: Vec<_> = sql
            .lines()
            .filter(|line| line.starts_with("CREATE"))
            .collect();
        assert_eq!(
            statements,
            [
                "CREATE TABLE IF NOT EXISTS ventas.item (",
                "CREATE INDEX IF NOT EXISTS idx_item_title ON ventas.item (title);",
            ]
        );
    }

    #[test]
    fn column_sql() {
        let col = DatabaseColumn {
            nullable: true,
            unique: true,
            default: Some(DatabaseDefault::String("n/a".to_string())),
            ..column("code", DatabaseType::Text(None))
        };
        assert_eq!(
            write_column_sql(&col),
            "code character varying DEFAULT 'n/a' UNIQUE"
        );
    }

    #[test]
    fn unique_index() {
        let index = DatabaseIndex {
            unique: true,
            ..index("uq_item_title_cost", &["title", "cost"])
        };
        assert_eq!(
            write_index_create_sql(None, "item", &index),
            "CREATE UNIQUE INDEX IF NOT EXISTS uq_item_title_cost ON item (title, cost);"
        );
    }

    #[test]
    fn sync_in_step_is_empty() {
        let schema = schema();
        let sql = write_sync_sql(Some("ventas"), &schema, &schema.columns, &schema.indexes);
        assert_eq!(sql, "");
    }

    #[test]
    fn sync_changes() {
        let schema = schema();
        let db_columns = vec![
            DatabaseColumn {
                primary_key: true,
                ..column("id", DatabaseType::BigInt)
            },
            DatabaseColumn {
                nullable: true,
                ..column("title", DatabaseType::Text(Some(40)))
            },
            column("active", DatabaseType::Bool),
            column("legacy", DatabaseType::Integer),
        ];
        let db_indexes = vec![index("idx_item_legacy", &["legacy"])];

        let sql = write_sync_sql(None, &schema, &db_columns, &db_indexes);
        let statements: Vec<_> = sql.lines().collect();
        assert_eq!(
            statements,
            [
                "ALTER TABLE item ALTER COLUMN id ADD GENERATED BY DEFAULT AS IDENTITY;",
                "ALTER TABLE item ALTER COLUMN title TYPE character varying(60) USING title::character varying(60);",
                "ALTER TABLE item ALTER COLUMN title SET NOT NULL;",
                "ALTER TABLE item ADD COLUMN cost numeric(8, 2) NOT NULL;",
                "ALTER TABLE item ALTER COLUMN active SET DEFAULT true;",
                "ALTER TABLE item DROP COLUMN legacy;",
                "DROP INDEX IF EXISTS idx_item_legacy;",
                "CREATE INDEX IF NOT EXISTS idx_item_title ON item (title);",
            ]
        );
    }

    #[test]
    fn sync_qualifies_names() {
        let schema = schema();
        let db_columns = &schema.columns[..3];
        let db_indexes = vec![index("idx_item_legacy", &["cost"])];

        let sql = write_sync_sql(Some("ventas"), &schema, db_columns, &db_indexes);
        let statements: Vec<_> = sql.lines().collect();
        assert_eq!(
            statements,
            [
                "ALTER TABLE ventas.item ADD COLUMN active boolean NOT NULL DEFAULT true;",
                "DROP INDEX IF EXISTS ventas.idx_item_legacy;",
                "CREATE INDEX IF NOT EXISTS idx_item_title ON ventas.item (title);",
            ]
        );
    }

    #[test]
    fn sync_recreates_changed_index() {
        let mut schema = schema();
        schema.indexes = vec![index("idx_item_title", &["title", "cost"])];
        let db_indexes = vec![index("idx_item_title", &["title"])];

        let sql = write_sync_sql(None, &schema, &schema.columns, &db_indexes);
        let statements: Vec<_> = sql.lines().collect();
        assert_eq!(
            statements,
            [
                "DROP INDEX IF EXISTS idx_item_title;",
                "CREATE INDEX IF NOT EXISTS idx_item_title ON item (title, cost);",
            ]
        );

        let mut unique = db_indexes[0].clone();
        unique.columns = schema.indexes[0].columns.clone();
        unique.unique = true;
        let sql = write_sync_sql(None, &schema, &schema.columns, &[unique]);
        assert_eq!(sql.lines().count(), 2);
    }
}
