use crate::database::DatabaseSchema;

/// The set of tables an application owns.
pub trait Schema {
    fn database_schemas() -> Vec<DatabaseSchema> {
        Vec::new()
    }
}

#[macro_export]
macro_rules! register_schemas {
    ($( $name: ident ),* $(,)?) => {
        pub struct Schema;

        impl ::tienda::schema::Schema for Schema {
            fn database_schemas() -> Vec<::tienda::database::DatabaseSchema> {
                vec![ $( <$name as ::tienda::database::IntoDatabaseSchema>::database_schema(), )* ]
            }
        }
    };
}
