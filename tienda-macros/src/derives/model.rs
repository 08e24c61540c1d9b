use std::collections::HashSet;
use std::iter::FromIterator;

use heck::SnakeCase;
use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::spanned::Spanned;

use crate::{
    attributes::{ItemAttrs, RootAttrs},
    error::Error,
    util::{is_type_option, parse_attrs, parse_struct_fields, DeriveMacro, Field},
};

const DATABASE_TYPES: [&str; 16] = [
    "SmallInt",
    "Integer",
    "BigInt",
    "Numeric",
    "Float",
    "Double",
    "Money",
    "Text",
    "Binary",
    "Timestamp",
    "Timestamptz",
    "Date",
    "Time",
    "Timetz",
    "Bool",
    "Uuid",
];

pub struct DeriveModel {
    fields: Vec<Field<ItemAttrs>>,
    ident: syn::Ident,
    root: RootAttrs,
}

impl DeriveModel {
    fn table_name(&self) -> String {
        self.root
            .table
            .as_ref()
            .map(|table| table.value())
            .unwrap_or_else(|| self.ident.to_string().to_snake_case())
    }

    fn expand_impl_database_schema(&self) -> syn::Result<TokenStream> {
        let ident = &self.ident;
        let table_name = self.table_name();

        let mut primary_keys = self
            .fields
            .iter()
            .filter(|field| field.attrs.primary_key.is_some());
        if let (Some(_), Some(second)) = (primary_keys.next(), primary_keys.next()) {
            return Err(syn::Error::new(
                second.ident.span(),
                "only one field can be marked as primary_key",
            ));
        }

        let columns = self
            .fields
            .iter()
            .map(Self::expand_column)
            .collect::<syn::Result<Vec<_>>>()?;
        let indexes = self.expand_indexes(&table_name)?;

        Ok(quote!(
            impl tienda::database::IntoDatabaseSchema for #ident {
                fn database_schema() -> tienda::database::DatabaseSchema {
                    tienda::database::DatabaseSchema {
                        table_name: #table_name.to_string(),
                        columns: vec![ #( #columns, )* ],
                        indexes: vec![ #( #indexes, )* ],
                    }
                }
            }
        ))
    }

    fn expand_column(field: &Field<ItemAttrs>) -> syn::Result<TokenStream> {
        let attrs = &field.attrs;
        let name = field.ident.to_string();
        let field_ty = &field.field.ty;

        let variant = if let Some(db_type) = &attrs.db_type {
            if !DATABASE_TYPES.contains(&db_type.value().as_str()) {
                return Err(syn::Error::new(db_type.span(), "invalid db_type"));
            }
            syn::Ident::new(&db_type.value(), db_type.span())
        } else if let Some(db_type) = Self::rust_to_db_type(field_ty) {
            syn::Ident::new(db_type, field_ty.span())
        } else {
            return Err(syn::Error::new(field_ty.span(), "type is not supported"));
        };
        let variant_name = variant.to_string();

        if let Some(max_len) = &attrs.max_len {
            if variant_name != "Text" {
                return Err(syn::Error::new(
                    max_len.span(),
                    "max_len can only be used on varchar columns",
                ));
            }
        }
        for precision in [&attrs.max_digits, &attrs.decimal_places].into_iter().flatten() {
            if variant_name != "Numeric" {
                return Err(syn::Error::new(
                    precision.span(),
                    "max_digits and decimal_places can only be used on numeric columns",
                ));
            }
        }

        let ty = match variant_name.as_str() {
            "Text" => match &attrs.max_len {
                Some(max_len) => quote!(Text(Some(#max_len))),
                None => quote!(Text(None)),
            },
            "Numeric" => match (&attrs.max_digits, &attrs.decimal_places) {
                (Some(max_digits), Some(decimal_places)) => {
                    if decimal_places.base10_parse::<u16>()? > max_digits.base10_parse::<u16>()? {
                        return Err(syn::Error::new(
                            decimal_places.span(),
                            "decimal_places cannot be greater than max_digits",
                        ));
                    }
                    quote!(Numeric(Some((#max_digits, #decimal_places))))
                }
                (None, None) => quote!(Numeric(None)),
                (Some(max_digits), None) => {
                    return Err(syn::Error::new(
                        max_digits.span(),
                        "max_digits requires decimal_places",
                    ))
                }
                (None, Some(decimal_places)) => {
                    return Err(syn::Error::new(
                        decimal_places.span(),
                        "decimal_places requires max_digits",
                    ))
                }
            },
            _ => variant.to_token_stream(),
        };

        let primary_key = attrs.primary_key.is_some();
        let identity = attrs.identity.is_some();
        let unique = attrs.unique.is_some();
        let optional = is_type_option(field_ty);

        if identity && !matches!(variant_name.as_str(), "SmallInt" | "Integer" | "BigInt") {
            return Err(syn::Error::new(
                field_ty.span(),
                "identity can only be used on integer columns",
            ));
        }
        if optional && primary_key && !identity {
            return Err(syn::Error::new(
                field_ty.span(),
                "a primary key can only be an Option when it is an identity column",
            ));
        }
        if unique && primary_key {
            return Err(syn::Error::new(
                field.ident.span(),
                "a primary key cannot also be marked as unique",
            ));
        }
        let nullable = optional && !primary_key;

        let default = if let Some(default_raw) = &attrs.default_raw {
            quote!(Some(tienda::database::DatabaseDefault::Raw(#default_raw.to_string())))
        } else if let Some(default) = &attrs.default {
            match Self::lit_to_db_default(default) {
                Some(db_default) => quote!(Some(#db_default)),
                None => {
                    return Err(syn::Error::new(
                        default.span(),
                        "default not supported: use a primitive type only",
                    ))
                }
            }
        } else {
            quote!(None)
        };
        if identity && (attrs.default.is_some() || attrs.default_raw.is_some()) {
            return Err(syn::Error::new(
                field.ident.span(),
                "identity columns cannot have a custom default",
            ));
        }

        Ok(quote!(
            tienda::database::DatabaseColumn {
                name: #name.to_string(),
                ty: tienda::database::DatabaseType::#ty,
                nullable: #nullable,
                default: #default,
                unique: #unique,
                primary_key: #primary_key,
                identity: #identity,
            }
        ))
    }

    fn expand_indexes(&self, table_name: &str) -> syn::Result<Vec<TokenStream>> {
        let mut seen = HashSet::new();
        let mut indexes = Vec::new();

        let declared = self.root.index.iter().chain(
            self.root
                .indexes
                .iter()
                .flat_map(|list| list.0.iter()),
        );
        for index in declared {
            for column in &index.fields {
                if !self.fields.iter().any(|field| field.ident == *column) {
                    return Err(syn::Error::new(
                        column.span(),
                        format!("no field named `{}` to index", column),
                    ));
                }
            }

            let name = index.name.value();
            if !seen.insert(name.clone()) {
                return Err(syn::Error::new(
                    index.name.span(),
                    format!("index `{}` is declared more than once", name),
                ));
            }
            let columns: Vec<String> = index.fields.iter().map(ToString::to_string).collect();
            indexes.push(quote!(
                tienda::database::DatabaseIndex {
                    name: #name.to_string(),
                    columns: vec![ #( #columns.to_string() ),* ],
                    unique: false,
                }
            ));
        }

        for field in self.fields.iter().filter(|field| field.attrs.db_index.is_some()) {
            let column = field.ident.to_string();
            let name = format!("idx_{}_{}", table_name, column);
            if seen.insert(name.clone()) {
                indexes.push(quote!(
                    tienda::database::DatabaseIndex {
                        name: #name.to_string(),
                        columns: vec![ #column.to_string() ],
                        unique: false,
                    }
                ));
            }
        }

        Ok(indexes)
    }

    fn expand_impl_database_model(&self) -> TokenStream {
        let ident = &self.ident;

        let values = self.fields.iter().map(|field| {
            let field_ident = &field.ident;
            let name = field_ident.to_string();
            quote!((
                #name,
                tienda::database::ToDatabaseValue::to_database_value(&self.#field_ident)
            ))
        });

        quote!(
            impl tienda::database::DatabaseModel for #ident {
                fn database_values(&self) -> Vec<(&'static str, tienda::database::DatabaseValue)> {
                    vec![ #( #values, )* ]
                }
            }
        )
    }

    fn lit_to_db_default(lit: &syn::Lit) -> Option<TokenStream> {
        let db_default = match lit {
            syn::Lit::Bool(b) => quote!(tienda::database::DatabaseDefault::Bool(#b)),
            syn::Lit::Float(f) => quote!(tienda::database::DatabaseDefault::Float(#f)),
            syn::Lit::Int(i) => quote!(tienda::database::DatabaseDefault::Int(#i)),
            syn::Lit::Str(s) => {
                quote!(tienda::database::DatabaseDefault::String(#s.to_string()))
            }
            _ => return None,
        };
        Some(db_default)
    }

    fn rust_to_db_type(ty: &syn::Type) -> Option<&'static str> {
        let ty_string = quote!(#ty).to_string().replace(' ', "");
        let ty_str = ty_string
            .strip_prefix("Option<")
            .or_else(|| ty_string.strip_prefix("std::option::Option<"))
            .and_then(|inner| inner.strip_suffix('>'))
            .unwrap_or(&ty_string);

        let db_type = match ty_str {
            // Numeric types
            "i16" | "u16" => "SmallInt",
            "i32" | "u32" => "Integer",
            "i64" => "BigInt",
            "f32" => "Float",
            "f64" => "Double",
            "Decimal" | "rust_decimal::Decimal" => "Numeric",

            // Character types
            "String" => "Text",

            // Binary data types
            "Vec<u8>" => "Binary",

            // Date/Time types
            "chrono::NaiveDateTime" | "NaiveDateTime" => "Timestamp",
            "chrono::DateTime<chrono::FixedOffset>"
            | "chrono::DateTime<FixedOffset>"
            | "DateTime<chrono::FixedOffset>"
            | "DateTime<FixedOffset>" => "Timestamptz",
            "chrono::NaiveDate" | "NaiveDate" => "Date",
            "chrono::NaiveTime" | "NaiveTime" => "Time",

            // Boolean type
            "bool" => "Bool",

            // Uuid type
            "uuid::Uuid" | "Uuid" => "Uuid",

            _ => return None,
        };

        Some(db_type)
    }
}

impl DeriveMacro for DeriveModel {
    fn new(input: syn::DeriveInput) -> Result<Self, Error> {
        let root = parse_attrs::<RootAttrs>(&input.attrs)?;
        let fields = parse_struct_fields::<ItemAttrs>(input.data)?;
        let ident = input.ident;

        Ok(DeriveModel {
            fields,
            ident,
            root,
        })
    }

    fn expand(&self) -> syn::Result<TokenStream> {
        let expanded_impl_database_schema = self.expand_impl_database_schema()?;
        let expanded_impl_database_model = self.expand_impl_database_model();

        Ok(TokenStream::from_iter([
            expanded_impl_database_schema,
            expanded_impl_database_model,
        ]))
    }
}

pub fn expand_derive_model(input: syn::DeriveInput) -> syn::Result<TokenStream> {
    let ident_span = input.ident.span();

    DeriveModel::new(input)
        .map_err(|err| err.into_syn_error(ident_span))?
        .expand()
}
