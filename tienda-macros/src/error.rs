use proc_macro2::Span;

pub enum Error {
    InputNotStruct,
    Syn(syn::Error),
}

impl Error {
    pub fn into_syn_error(self, span: Span) -> syn::Error {
        match self {
            Error::InputNotStruct => {
                syn::Error::new(span, "you can only derive on structs with named fields")
            }
            Error::Syn(syn_err) => syn_err,
        }
    }
}
