//! Checks record values against the constraints declared in a [`DatabaseSchema`].
//!
//! This is the boundary every write goes through before reaching the database.
//! Values that do not fit a column are rejected, never rounded or truncated.

use rust_decimal::Decimal;

use crate::database::{DatabaseColumn, DatabaseSchema, DatabaseType, DatabaseValue};

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{table} has no column {column}")]
    UnknownColumn { table: String, column: String },
    #[error("{table}.{column} cannot be null")]
    Required { table: String, column: String },
    #[error("{table}.{column} expects {expected} but got a {found} value")]
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        found: &'static str,
    },
    #[error("{table}.{column} has {len} characters, at most {max} are allowed")]
    TooLong {
        table: String,
        column: String,
        len: usize,
        max: usize,
    },
    #[error("{table}.{column} has {digits} digits in total, at most {max} are allowed")]
    TooManyDigits {
        table: String,
        column: String,
        digits: u32,
        max: u16,
    },
    #[error("{table}.{column} has {places} decimal places, at most {max} are allowed")]
    TooManyDecimalPlaces {
        table: String,
        column: String,
        places: u32,
        max: u16,
    },
    #[error(
        "{table}.{column} has {digits} digits before the decimal point, at most {max} are allowed"
    )]
    TooManyWholeDigits {
        table: String,
        column: String,
        digits: u32,
        max: u16,
    },
}

impl DatabaseSchema {
    /// Validates `(column, value)` pairs, stopping at the first violation.
    pub fn validate(&self, values: &[(&str, DatabaseValue)]) -> Result<(), ValidationError> {
        for (name, value) in values {
            let column = self
                .column(name)
                .ok_or_else(|| ValidationError::UnknownColumn {
                    table: self.table_name.clone(),
                    column: name.to_string(),
                })?;
            column.validate(&self.table_name, value)?;
        }

        Ok(())
    }
}

impl DatabaseColumn {
    pub fn validate(&self, table: &str, value: &DatabaseValue) -> Result<(), ValidationError> {
        if value.is_null() {
            if self.nullable || self.identity || self.default.is_some() {
                return Ok(());
            }
            return Err(ValidationError::Required {
                table: table.to_string(),
                column: self.name.clone(),
            });
        }

        let mismatch = || ValidationError::TypeMismatch {
            table: table.to_string(),
            column: self.name.clone(),
            expected: self.ty.to_string(),
            found: value.kind(),
        };

        match (&self.ty, value) {
            (DatabaseType::Text(max), DatabaseValue::Text(text)) => {
                let len = text.chars().count();
                match max {
                    Some(max) if len > *max as usize => Err(ValidationError::TooLong {
                        table: table.to_string(),
                        column: self.name.clone(),
                        len,
                        max: *max as usize,
                    }),
                    _ => Ok(()),
                }
            }
            (DatabaseType::Numeric(precision), DatabaseValue::Numeric(number)) => {
                self.validate_numeric(table, *precision, number)
            }
            (DatabaseType::Numeric(precision), DatabaseValue::Int(number)) => {
                self.validate_numeric(table, *precision, &Decimal::from(*number))
            }
            (DatabaseType::Money, DatabaseValue::Numeric(_) | DatabaseValue::Int(_)) => Ok(()),
            (ty, DatabaseValue::Int(_)) if ty.is_integer() => Ok(()),
            (DatabaseType::Float | DatabaseType::Double, DatabaseValue::Float(_)) => Ok(()),
            (DatabaseType::Binary, DatabaseValue::Binary(_))
            | (DatabaseType::Bool, DatabaseValue::Bool(_))
            | (DatabaseType::Uuid, DatabaseValue::Uuid(_))
            | (DatabaseType::Timestamp, DatabaseValue::Timestamp(_))
            | (DatabaseType::Timestamptz, DatabaseValue::Timestamptz(_))
            | (DatabaseType::Date, DatabaseValue::Date(_))
            | (DatabaseType::Time | DatabaseType::Timetz, DatabaseValue::Time(_)) => Ok(()),
            _ => Err(mismatch()),
        }
    }

    fn validate_numeric(
        &self,
        table: &str,
        precision: Option<(u16, u16)>,
        number: &Decimal,
    ) -> Result<(), ValidationError> {
        let (max_digits, max_places) = match precision {
            Some(precision) => precision,
            None => return Ok(()),
        };

        let (digits, places) = significant_digits(number);
        let whole_digits = digits.saturating_sub(places);
        let max_whole_digits = max_digits.saturating_sub(max_places);

        if digits > u32::from(max_digits) {
            Err(ValidationError::TooManyDigits {
                table: table.to_string(),
                column: self.name.clone(),
                digits,
                max: max_digits,
            })
        } else if places > u32::from(max_places) {
            Err(ValidationError::TooManyDecimalPlaces {
                table: table.to_string(),
                column: self.name.clone(),
                places,
                max: max_places,
            })
        } else if whole_digits > u32::from(max_whole_digits) {
            Err(ValidationError::TooManyWholeDigits {
                table: table.to_string(),
                column: self.name.clone(),
                digits: whole_digits,
                max: max_whole_digits,
            })
        } else {
            Ok(())
        }
    }
}

/// Returns `(digits, decimal places)` once trailing fractional zeros are dropped.
///
/// Leading zeros never count, so `0.05` has one digit and two decimal places.
fn significant_digits(number: &Decimal) -> (u32, u32) {
    let normalized = number.normalize();
    let places = normalized.scale();
    let mantissa_digits = normalized
        .mantissa()
        .unsigned_abs()
        .checked_ilog10()
        .map_or(1, |log| log + 1);

    (mantissa_digits.max(places), places)
}
