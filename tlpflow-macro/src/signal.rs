use proc_macro::{self, TokenStream};
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use super::utils::{clog2, get_enum_encode_value, get_enum_width, get_member_width};

pub fn derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let name = &ast.ident;
    match ast.data {
        syn::Data::Struct(syn::DataStruct {
            fields: syn::Fields::Named(syn::FieldsNamed { ref named, .. }), ..
        }) => {
            let names = named.iter().map(|f| f.ident.clone()).collect::<Vec<_>>();
            let tys = named.iter().map(|f| f.ty.clone()).collect::<Vec<_>>();

            // A `#[member(width = N)]` overrides the width of the field type.
            let widths = named
                .iter()
                .map(|f| match get_member_width(&f.attrs) {
                    Some(width) => {
                        let width = width
                            .base10_parse::<usize>()
                            .unwrap_or_else(|_| panic!("{name}: member width should be usize"));
                        quote! { #width }
                    }
                    None => {
                        let ty = &f.ty;
                        quote! { <#ty as ::tlpflow::Signal>::WIDTH }
                    }
                })
                .collect::<Vec<_>>();

            let expanded = quote! {
                impl #impl_generics ::tlpflow::Signal for #name #ty_generics #where_clause {
                    const WIDTH: usize = 0 #(+ #widths)*;

                    fn transl(self) -> ::std::vec::Vec<bool> {
                        let mut bits = ::std::vec::Vec::with_capacity(<Self as ::tlpflow::Signal>::WIDTH);
                        #(
                            let mut field = ::tlpflow::Signal::transl(self.#names);
                            field.resize(#widths, false);
                            bits.extend(field);
                        )*
                        bits
                    }

                    #[allow(unused_assignments)]
                    fn from_bits(bits: &[bool]) -> ::std::option::Option<Self> {
                        if bits.len() != <Self as ::tlpflow::Signal>::WIDTH {
                            return ::std::option::Option::None;
                        }
                        let mut offset = 0usize;
                        #(
                            let #names = <#tys as ::tlpflow::Signal>::from_bits(&bits[offset..offset + #widths])?;
                            offset += #widths;
                        )*
                        ::std::option::Option::Some(Self { #(#names),* })
                    }
                }
            };

            expanded.into()
        }
        syn::Data::Enum(syn::DataEnum { ref variants, .. }) => {
            let variant_count = variants.iter().count();
            assert!(variant_count > 0, "{name}: Empty enums cannot be derived as tlpflow `Signal`");
            let width = if let Some(width) = get_enum_width(&ast.attrs) {
                width.base10_parse::<usize>().unwrap_or_else(|_| panic!("{name}: Enum width should be usize"))
            } else if variant_count == 1 {
                1
            } else {
                clog2(variant_count)
            };

            let mut encodings = Vec::with_capacity(variant_count);
            for (i, v) in variants.iter().enumerate() {
                let variant_name = &v.ident;
                assert!(
                    matches!(v.fields, syn::Fields::Unit),
                    "{name}::{variant_name}: Only Unit Variant is allowed to be derived as tlpflow Signal"
                );

                let encode_value = if let Some(encode_value_lit) = get_enum_encode_value(&v.attrs) {
                    encode_value_lit
                        .base10_parse::<usize>()
                        .unwrap_or_else(|_| panic!("encoding value of {name}::{variant_name} should be usize"))
                } else {
                    i
                };
                assert!(
                    encode_value < (1 << width),
                    "{encode_value}(encoding of {name}::{variant_name}) exceeds maximum for {width} bits",
                );
                assert!(
                    !encodings.iter().any(|(_, e)| *e == encode_value),
                    "{name}::{variant_name}: encoding {encode_value} is used twice"
                );
                encodings.push((variant_name.clone(), encode_value));
            }

            let into_variants = encodings.iter().map(|(v, e)| quote! { Self::#v => #e, });
            let from_variants = encodings.iter().map(|(v, e)| quote! { #e => ::std::option::Option::Some(Self::#v), });

            let expanded = quote! {
                impl #impl_generics ::tlpflow::Signal for #name #ty_generics #where_clause {
                    const WIDTH: usize = #width;

                    fn transl(self) -> ::std::vec::Vec<bool> {
                        let value: usize = match self {
                            #(#into_variants)*
                        };
                        (0..#width).map(|idx| ((value >> idx) & 1) != 0).collect()
                    }

                    fn from_bits(bits: &[bool]) -> ::std::option::Option<Self> {
                        if bits.len() != #width {
                            return ::std::option::Option::None;
                        }
                        let value = bits.iter().rev().fold(0usize, |acc, b| (acc << 1) | usize::from(*b));
                        match value {
                            #(#from_variants)*
                            _ => ::std::option::Option::None,
                        }
                    }
                }
            };

            expanded.into()
        }
        _ => todo!("Signal macro is not implemented for union type"),
    }
}
