use better_bae::TryFromAttributes;
use proc_macro2::TokenStream;

use crate::error::Error;

pub trait DeriveMacro: Sized {
    fn new(input: syn::DeriveInput) -> Result<Self, Error>;

    fn expand(&self) -> syn::Result<TokenStream>;
}

pub struct Field<Attr> {
    pub attrs: Attr,
    pub ident: syn::Ident,
    pub field: syn::Field,
}

pub fn parse_attrs<Attr>(attrs: &[syn::Attribute]) -> Result<Attr, Error>
where
    Attr: Default + TryFromAttributes,
{
    Ok(Attr::try_from_attributes(attrs)
        .map_err(Error::Syn)?
        .unwrap_or_default())
}

pub fn parse_struct_fields<Attr>(data: syn::Data) -> Result<Vec<Field<Attr>>, Error>
where
    Attr: Default + TryFromAttributes,
{
    let fields = match data {
        syn::Data::Struct(syn::DataStruct {
            fields: syn::Fields::Named(syn::FieldsNamed { named, .. }),
            ..
        }) => named,
        _ => return Err(Error::InputNotStruct),
    };

    fields
        .into_iter()
        .map(|field| {
            Ok(Field {
                attrs: parse_attrs(&field.attrs)?,
                ident: field.ident.clone().ok_or(Error::InputNotStruct)?,
                field,
            })
        })
        .collect::<Result<_, _>>()
}

pub fn is_type_option(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident == "Option")
            .unwrap_or(false),
        _ => false,
    }
}
