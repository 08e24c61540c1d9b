use std::{fmt, str};

pub use crate::value::{DatabaseValue, ToDatabaseValue};
use crate::validation::ValidationError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DatabaseType {
    SmallInt,
    Integer,
    BigInt,
    Numeric(Option<(u16, u16)>),
    Float,
    Double,
    Money,
    Text(Option<i32>),
    Binary,
    Timestamp,
    Timestamptz,
    Date,
    Time,
    Timetz,
    Bool,
    Uuid,
}

impl DatabaseType {
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::SmallInt | Self::Integer | Self::BigInt)
    }
}

#[derive(Debug)]
pub struct DatabaseTypeFromStrError;

impl str::FromStr for DatabaseType {
    type Err = DatabaseTypeFromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let database_type = match s {
            "smallint" | "int2" => Self::SmallInt,
            "integer" | "int" | "int4" => Self::Integer,
            "bigint" | "int8" => Self::BigInt,
            "numeric" | "decimal" => Self::Numeric(None),
            "real" | "float4" => Self::Float,
            "double precision" | "float8" => Self::Double,
            "money" => Self::Money,
            "character" | "char" | "character varying" | "varchar" => Self::Text(None),
            "bytea" => Self::Binary,
            "timestamp" | "timestamp without time zone" => Self::Timestamp,
            "timestamp with time zone" | "timestamptz" => Self::Timestamptz,
            "date" => Self::Date,
            "time" | "time without time zone" => Self::Time,
            "time with time zone" | "timetz" => Self::Timetz,
            "boolean" | "bool" => Self::Bool,
            "uuid" => Self::Uuid,
            _ => return Err(DatabaseTypeFromStrError),
        };
        Ok(database_type)
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SmallInt => write!(f, "smallint"),
            Self::Integer => write!(f, "integer"),
            Self::BigInt => write!(f, "bigint"),
            Self::Numeric(Some((p, s))) => write!(f, "numeric({}, {})", p, s),
            Self::Numeric(None) => write!(f, "numeric"),
            Self::Float => write!(f, "real"),
            Self::Double => write!(f, "double precision"),
            Self::Money => write!(f, "money"),
            Self::Text(Some(max)) => write!(f, "character varying({})", max),
            Self::Text(None) => write!(f, "character varying"),
            Self::Binary => write!(f, "bytea"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Timestamptz => write!(f, "timestamp with time zone"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::Timetz => write!(f, "time with time zone"),
            Self::Bool => write!(f, "boolean"),
            Self::Uuid => write!(f, "uuid"),
        }
    }
}

#[derive(Clone, Debug, PartialOrd)]
pub enum DatabaseDefault {
    Bool(bool),
    Float(f64),
    Int(u64),
    Raw(String),
    String(String),
}

impl PartialEq for DatabaseDefault {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DatabaseDefault::Bool(v), DatabaseDefault::Bool(other)) => v == other,
            (DatabaseDefault::Float(v), DatabaseDefault::Float(other)) => v == other,
            (DatabaseDefault::Int(v), DatabaseDefault::Int(other)) => v == other,
            (DatabaseDefault::Raw(v), DatabaseDefault::Raw(other)) => {
                v.to_lowercase() == other.to_lowercase()
            }
            (DatabaseDefault::String(v), DatabaseDefault::String(other)) => v == other,
            _ => false,
        }
    }
}

impl fmt::Display for DatabaseDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseDefault::Bool(val) => write!(f, "{}", val),
            DatabaseDefault::Float(val) => write!(f, "{}", val),
            DatabaseDefault::Int(val) => write!(f, "{}", val),
            DatabaseDefault::Raw(val) => write!(f, "{}", val),
            DatabaseDefault::String(val) => write!(f, "'{}'", val.replace('\'', "''")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub struct DatabaseColumn {
    pub name: String,
    pub ty: DatabaseType,
    pub nullable: bool,
    pub default: Option<DatabaseDefault>,
    pub unique: bool,
    pub primary_key: bool,
    /// Values are generated by the database (`GENERATED BY DEFAULT AS IDENTITY`).
    pub identity: bool,
}

/// A secondary index over one or more columns of a table.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DatabaseIndex {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

pub trait IntoDatabaseSchema {
    fn database_schema() -> DatabaseSchema;
}

/// A record whose fields map onto the columns of its own [`DatabaseSchema`].
pub trait DatabaseModel: IntoDatabaseSchema {
    /// Column values of this record, in column order.
    fn database_values(&self) -> Vec<(&'static str, DatabaseValue)>;

    /// Checks every column value against the declared schema.
    fn validate(&self) -> Result<(), ValidationError> {
        Self::database_schema().validate(&self.database_values())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DatabaseSchema {
    pub table_name: String,
    pub columns: Vec<DatabaseColumn>,
    pub indexes: Vec<DatabaseIndex>,
}

impl DatabaseSchema {
    pub fn column(&self, name: &str) -> Option<&DatabaseColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn index(&self, name: &str) -> Option<&DatabaseIndex> {
        self.indexes.iter().find(|index| index.name == name)
    }

    pub fn primary_key(&self) -> Option<&DatabaseColumn> {
        self.columns.iter().find(|column| column.primary_key)
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::prelude::*;

    #[derive(Model)]
    #[tienda(index = ("idx_product_name_price", name, price))]
    pub struct Product {
        #[tienda(primary_key, identity)]
        pub id: Option<i64>,
        #[tienda(max_len = 80, db_index)]
        pub name: String,
        #[tienda(max_digits = 7, decimal_places = 2)]
        pub price: Decimal,
        #[tienda(default = 0)]
        pub stock: i32,
        #[tienda(unique)]
        pub sku: Uuid,
        pub description: Option<String>,
        #[tienda(default_raw = "CURRENT_DATE")]
        pub listed_on: NaiveDate,
    }

    #[derive(Model)]
    #[tienda(table = "catalog_entries")]
    pub struct CatalogEntry {
        #[tienda(primary_key)]
        pub code: Uuid,
        #[tienda(db_type = "Money")]
        pub cost: i64,
    }

    #[derive(Model)]
    #[tienda(indexes = [
        ("idx_order_line_order", order_id),
        ("idx_order_line_order_sku", order_id, sku),
    ])]
    pub struct OrderLine {
        #[tienda(primary_key, identity)]
        pub id: Option<i64>,
        pub order_id: i64,
        pub sku: Uuid,
        #[tienda(db_index)]
        pub quantity: i32,
    }

    #[test]
    fn table_name() {
        assert_eq!(Product::database_schema().table_name, "product");
        assert_eq!(CatalogEntry::database_schema().table_name, "catalog_entries");
    }

    #[test]
    fn columns() {
        let columns = Product::database_schema().columns;
        let expected = vec![
            DatabaseColumn {
                name: "id".to_string(),
                ty: DatabaseType::BigInt,
                nullable: false,
                default: None,
                unique: false,
                primary_key: true,
                identity: true,
            },
            DatabaseColumn {
                name: "name".to_string(),
                ty: DatabaseType::Text(Some(80)),
                nullable: false,
                default: None,
                unique: false,
                primary_key: false,
                identity: false,
            },
            DatabaseColumn {
                name: "price".to_string(),
                ty: DatabaseType::Numeric(Some((7, 2))),
                nullable: false,
                default: None,
                unique: false,
                primary_key: false,
                identity: false,
            },
            DatabaseColumn {
                name: "stock".to_string(),
                ty: DatabaseType::Integer,
                nullable: false,
                default: Some(DatabaseDefault::Int(0)),
                unique: false,
                primary_key: false,
                identity: false,
            },
            DatabaseColumn {
                name: "sku".to_string(),
                ty: DatabaseType::Uuid,
                nullable: false,
                default: None,
                unique: true,
                primary_key: false,
                identity: false,
            },
            DatabaseColumn {
                name: "description".to_string(),
                ty: DatabaseType::Text(None),
                nullable: true,
                default: None,
                unique: false,
                primary_key: false,
                identity: false,
            },
            DatabaseColumn {
                name: "listed_on".to_string(),
                ty: DatabaseType::Date,
                nullable: false,
                default: Some(DatabaseDefault::Raw("CURRENT_DATE".to_string())),
                unique: false,
                primary_key: false,
                identity: false,
            },
        ];
        assert_eq!(columns, expected);
    }

    #[test]
    fn indexes() {
        let schema = Product::database_schema();
        assert_eq!(
            schema.indexes,
            vec![
                DatabaseIndex {
                    name: "idx_product_name_price".to_string(),
                    columns: vec!["name".to_string(), "price".to_string()],
                    unique: false,
                },
                DatabaseIndex {
                    name: "idx_product_name".to_string(),
                    columns: vec!["name".to_string()],
                    unique: false,
                },
            ]
        );
        assert!(CatalogEntry::database_schema().indexes.is_empty());
    }

    #[test]
    fn index_list() {
        let schema = OrderLine::database_schema();
        let indexes: Vec<_> = schema
            .indexes
            .iter()
            .map(|index| (index.name.as_str(), index.columns.join(",")))
            .collect();
        assert_eq!(
            indexes,
            [
                ("idx_order_line_order", "order_id".to_string()),
                ("idx_order_line_order_sku", "order_id,sku".to_string()),
                ("idx_order_line_quantity", "quantity".to_string()),
            ]
        );
    }

    #[test]
    fn db_type_override() {
        let schema = CatalogEntry::database_schema();
        assert_eq!(schema.column("cost").map(|col| &col.ty), Some(&DatabaseType::Money));
        assert_eq!(schema.primary_key().map(|col| col.name.as_str()), Some("code"));
    }

    #[test]
    fn database_values() {
        let product = Product {
            id: None,
            name: "Lamp".to_string(),
            price: Decimal::new(1999, 2),
            stock: 3,
            sku: Uuid::nil(),
            description: Some("Desk lamp".to_string()),
            listed_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        };

        let values = product.database_values();
        let names: Vec<_> = values.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            ["id", "name", "price", "stock", "sku", "description", "listed_on"]
        );
        assert_eq!(values[0].1, DatabaseValue::Null);
        assert_eq!(values[1].1, DatabaseValue::Text("Lamp".to_string()));
        assert_eq!(values[2].1, DatabaseValue::Numeric(Decimal::new(1999, 2)));
        assert_eq!(values[3].1, DatabaseValue::Int(3));
        assert!(product.validate().is_ok());
    }

    #[test]
    fn type_round_trip() {
        for ty in [
            DatabaseType::SmallInt,
            DatabaseType::BigInt,
            DatabaseType::Numeric(None),
            DatabaseType::Text(None),
            DatabaseType::Timestamptz,
            DatabaseType::Bool,
        ] {
            assert_eq!(ty.to_string().parse::<DatabaseType>().ok(), Some(ty));
        }
        assert_eq!(
            DatabaseType::Numeric(Some((5, 2))).to_string(),
            "numeric(5, 2)"
        );
        assert!("jsonb".parse::<DatabaseType>().is_err());
    }

    #[test]
    fn raw_defaults_ignore_case() {
        assert_eq!(
            DatabaseDefault::Raw("now()".to_string()),
            DatabaseDefault::Raw("NOW()".to_string())
        );
        assert_ne!(
            DatabaseDefault::String("now()".to_string()),
            DatabaseDefault::String("NOW()".to_string())
        );
        assert_eq!(DatabaseDefault::String("it's".to_string()).to_string(), "'it''s'");
    }
}
