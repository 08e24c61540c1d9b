use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A single cell value, as handed to the database.
#[derive(Clone, Debug, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(Decimal),
    Text(String),
    Binary(Vec<u8>),
    Uuid(Uuid),
    Timestamp(NaiveDateTime),
    Timestamptz(DateTime<FixedOffset>),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl DatabaseValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DatabaseValue::Null => "null",
            DatabaseValue::Bool(_) => "bool",
            DatabaseValue::Int(_) => "int",
            DatabaseValue::Float(_) => "float",
            DatabaseValue::Numeric(_) => "numeric",
            DatabaseValue::Text(_) => "text",
            DatabaseValue::Binary(_) => "binary",
            DatabaseValue::Uuid(_) => "uuid",
            DatabaseValue::Timestamp(_) => "timestamp",
            DatabaseValue::Timestamptz(_) => "timestamptz",
            DatabaseValue::Date(_) => "date",
            DatabaseValue::Time(_) => "time",
        }
    }
}

pub trait ToDatabaseValue {
    fn to_database_value(&self) -> DatabaseValue;
}

macro_rules! impl_to_database_value {
    ($( $ty: ty => $variant: ident ),* $(,)?) => {
        $(
            impl ToDatabaseValue for $ty {
                fn to_database_value(&self) -> DatabaseValue {
                    DatabaseValue::$variant((*self).into())
                }
            }
        )*
    };
}

impl_to_database_value!(
    bool => Bool,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    Decimal => Numeric,
    Uuid => Uuid,
    NaiveDateTime => Timestamp,
    DateTime<FixedOffset> => Timestamptz,
    NaiveDate => Date,
    NaiveTime => Time,
);

impl ToDatabaseValue for str {
    fn to_database_value(&self) -> DatabaseValue {
        DatabaseValue::Text(self.to_string())
    }
}

impl ToDatabaseValue for String {
    fn to_database_value(&self) -> DatabaseValue {
        DatabaseValue::Text(self.clone())
    }
}

impl ToDatabaseValue for Vec<u8> {
    fn to_database_value(&self) -> DatabaseValue {
        DatabaseValue::Binary(self.clone())
    }
}

impl<T: ToDatabaseValue> ToDatabaseValue for Option<T> {
    fn to_database_value(&self) -> DatabaseValue {
        match self {
            Some(value) => value.to_database_value(),
            None => DatabaseValue::Null,
        }
    }
}

impl<T: ToDatabaseValue + ?Sized> ToDatabaseValue for &T {
    fn to_database_value(&self) -> DatabaseValue {
        (**self).to_database_value()
    }
}
