use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

#[proc_macro_derive(FormRecord)]
pub fn derive_form_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormRecord derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let record_ident = input.ident;
    let fields_struct_ident = format_ident!("{record_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "FormRecord derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "FormRecord derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let form = form_path();
    let mut key_literals = Vec::new();
    let mut value_arms = Vec::new();
    let mut apply_arms = Vec::new();
    let mut fields_methods = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let field_ty = field.ty;
        let field_name = field_ident.unraw().to_string();

        key_literals.push(quote! { #form::FieldKey::new(#field_name) });

        value_arms.push(quote! {
            #field_name => ::core::option::Option::Some(
                #form::FieldCodec::to_field_value(&self.#field_ident),
            ),
        });

        apply_arms.push(quote! {
            #field_name => {
                self.#field_ident = #form::parse_field::<#field_ty>(key, raw)?;
                ::core::result::Result::Ok(())
            }
        });

        fields_methods.push(quote! {
            pub const fn #field_ident(&self) -> #form::FieldKey {
                #form::FieldKey::new(#field_name)
            }
        });
    }

    quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#fields_methods)*
        }

        impl #form::FormRecord for #record_ident {
            type Fields = #fields_struct_ident;

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn field_keys(&self) -> ::std::vec::Vec<#form::FieldKey> {
                ::std::vec![#(#key_literals),*]
            }

            fn field_value(
                &self,
                key: &#form::FieldKey,
            ) -> ::core::option::Option<#form::FieldValue> {
                match key.as_str() {
                    #(#value_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn apply_raw(
                &mut self,
                key: &#form::FieldKey,
                raw: &str,
            ) -> #form::FormResult<()> {
                match key.as_str() {
                    #(#apply_arms)*
                    _ => ::core::result::Result::Err(
                        #form::FormError::UnknownField(::core::clone::Clone::clone(key)),
                    ),
                }
            }
        }
    }
    .into()
}

fn form_path() -> TokenStream2 {
    match crate_name("calmform") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident::form)
        }
        Ok(FoundCrate::Itself) | Err(_) => quote!(::calmform::form),
    }
}
