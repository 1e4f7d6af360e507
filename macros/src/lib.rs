use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

///
/// A derive macro which implements TryFrom<u8> for a fieldless enum.
///
/// Every variant is matched against its own discriminant, so enums with
/// explicit (and sparse) discriminants are supported. The error value is the
/// byte that did not name a variant.
///
/// usage:
/// ```rust,ignore
/// #[derive(Clone, Copy, TryFromByte)]
/// #[repr(u8)]
/// enum CommandId { Status = 0, Transactions = 2 }
/// ```
///
#[proc_macro_derive(TryFromByte)]
pub fn try_from_byte(input: TokenStream) -> TokenStream {
    let DeriveInput { ident, data, .. } = parse_macro_input!(input as DeriveInput);
    let variants = match data {
        Data::Enum(enum_item) => enum_item.variants,
        _ => {
            return syn::Error::new_spanned(&ident, "TryFromByte only works on enums")
                .to_compile_error()
                .into()
        }
    };
    if let Some(variant) = variants
        .iter()
        .find(|variant| !matches!(variant.fields, Fields::Unit))
    {
        return syn::Error::new_spanned(
            &variant.ident,
            "TryFromByte only works on enums without variant fields",
        )
        .to_compile_error()
        .into();
    }
    let arms = variants.iter().map(|variant| {
        let name = &variant.ident;
        quote! {
            if x == #ident::#name as u8 {
                return ::core::result::Result::Ok(#ident::#name);
            }
        }
    });
    let output = quote! {
        impl ::core::convert::TryFrom<u8> for #ident {
            type Error = u8;
            fn try_from(x: u8) -> ::core::result::Result<Self, Self::Error> {
                #(#arms)*
                ::core::result::Result::Err(x)
            }
        }
    };
    output.into()
}
