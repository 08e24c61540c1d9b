use better_bae::FromAttributes;
use quote::ToTokens;
use syn::{parse::Parse, spanned::Spanned};

#[derive(Default, FromAttributes)]
#[bae("tienda")]
pub struct RootAttrs {
    pub index: Option<IndexAttr>,
    pub indexes: Option<IndexList>,
    pub table: Option<syn::LitStr>,
}

#[derive(Default, FromAttributes)]
#[bae("tienda")]
pub struct ItemAttrs {
    pub db_index: Option<()>,
    pub db_type: Option<syn::LitStr>,
    pub decimal_places: Option<syn::LitInt>,
    pub default: Option<syn::Lit>,
    pub default_raw: Option<syn::LitStr>,
    pub identity: Option<()>,
    pub max_digits: Option<syn::LitInt>,
    pub max_len: Option<syn::LitInt>,
    pub primary_key: Option<()>,
    pub unique: Option<()>,
}

/// `("index_name", field_a, field_b, ...)`
pub struct IndexAttr {
    pub name: syn::LitStr,
    pub fields: Vec<syn::Ident>,
}

impl syn::parse::Parse for IndexAttr {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let lookahead = input.lookahead1();
        if !lookahead.peek(syn::token::Paren) {
            return Err(lookahead.error());
        }

        let group: syn::ExprTuple = input.parse()?;
        let group_span = group.span();
        let mut elems = group.elems.into_iter();

        let name: syn::LitStr = syn::parse2(
            elems
                .next()
                .ok_or_else(|| syn::Error::new(group_span, "expected (\"index_name\", field, ...)"))?
                .into_token_stream(),
        )?;

        let fields = elems
            .map(|elem| syn::parse2::<syn::Ident>(elem.into_token_stream()))
            .collect::<syn::Result<Vec<_>>>()?;

        if fields.is_empty() {
            return Err(syn::Error::new(
                group_span,
                "an index needs at least one field",
            ));
        }

        Ok(IndexAttr { name, fields })
    }
}

/// `[("index_a", field, ...), ("index_b", field, ...)]`
pub struct IndexList(pub Vec<IndexAttr>);

impl syn::parse::Parse for IndexList {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let content;
        syn::bracketed!(content in input);
        let indexes = content.parse_terminated::<IndexAttr, syn::Token![,]>(IndexAttr::parse)?;

        Ok(IndexList(indexes.into_iter().collect()))
    }
}
