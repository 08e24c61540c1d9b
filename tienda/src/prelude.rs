pub use crate::database::{
    DatabaseModel, DatabaseSchema, DatabaseValue, IntoDatabaseSchema, ToDatabaseValue,
};
pub use crate::macros::Model;
pub use crate::validation::ValidationError;
