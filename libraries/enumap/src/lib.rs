//! `#[derive(EnuMap)]` on a fieldless enum `Foo` generates `FooMap<T>`, a
//! struct with one `snake_case` field per variant, plus `Foo::VARIANTS`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut previous_was_lower_or_digit = false;
    for ch in s.chars() {
        if ch.is_uppercase() {
            if previous_was_lower_or_digit {
                result.push('_');
            }
            result.push(ch.to_ascii_lowercase());
            previous_was_lower_or_digit = false;
        } else {
            result.push(ch);
            previous_was_lower_or_digit = true;
        }
    }
    result
}

#[proc_macro_derive(EnuMap)]
pub fn derive_enumap(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let enum_name = &input.ident;
    let vis = &input.vis;
    let map_name = syn::Ident::new(&format!("{enum_name}Map"), enum_name.span());

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(&input.ident, "EnuMap can only be derived for enums")
            .to_compile_error()
            .into();
    };

    let mut variant_names = Vec::new();
    let mut field_names = Vec::new();
    for variant in &data_enum.variants {
        let Fields::Unit = &variant.fields else {
            return syn::Error::new_spanned(
                variant,
                "EnuMap only supports unit variants (variants without fields)",
            )
            .to_compile_error()
            .into();
        };
        variant_names.push(&variant.ident);
        field_names.push(syn::Ident::new(
            &to_snake_case(&variant.ident.to_string()),
            variant.ident.span(),
        ));
    }
    let variant_count = variant_names.len();

    let expanded = quote! {
        impl #enum_name {
            /// Every variant, in declaration order.
            pub const VARIANTS: [#enum_name; #variant_count] = [#(#enum_name::#variant_names),*];
        }

        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        #vis struct #map_name<T> {
            #(pub #field_names: T),*
        }

        impl<T> #map_name<T> {
            pub fn from_fn(mut f: impl FnMut(#enum_name) -> T) -> Self {
                Self {
                    #(#field_names: f(#enum_name::#variant_names)),*
                }
            }

            pub fn get(&self, key: &#enum_name) -> &T {
                match key {
                    #(#enum_name::#variant_names => &self.#field_names),*
                }
            }

            pub fn get_mut(&mut self, key: &#enum_name) -> &mut T {
                match key {
                    #(#enum_name::#variant_names => &mut self.#field_names),*
                }
            }

            pub fn map<U>(self, mut f: impl FnMut(#enum_name, T) -> U) -> #map_name<U> {
                #map_name {
                    #(#field_names: f(#enum_name::#variant_names, self.#field_names)),*
                }
            }

            pub fn iter(&self) -> impl Iterator<Item = (#enum_name, &T)> {
                [#((#enum_name::#variant_names, &self.#field_names)),*].into_iter()
            }
        }
    };

    TokenStream::from(expanded)
}
