use syn::{Attribute, Lit, LitInt, Meta, NestedMeta};

/// Returns the literal in `#[<name>(<lit>)]`.
fn get_list_literal(attrs: &[Attribute], name: &str) -> Option<LitInt> {
    attrs.iter().filter(|attr| attr.path.is_ident(name)).find_map(|attr| match attr.parse_meta() {
        Ok(Meta::List(list)) => list.nested.iter().find_map(|nested| match nested {
            NestedMeta::Lit(Lit::Int(lit)) => Some(lit.clone()),
            _ => None,
        }),
        _ => None,
    })
}

pub(super) fn get_enum_width(attrs: &[Attribute]) -> Option<LitInt> { get_list_literal(attrs, "width") }

pub(super) fn get_enum_encode_value(attrs: &[Attribute]) -> Option<LitInt> { get_list_literal(attrs, "encode") }

/// Returns `N` in `#[member(width = N)]`.
pub(super) fn get_member_width(attrs: &[Attribute]) -> Option<LitInt> {
    attrs.iter().filter(|attr| attr.path.is_ident("member")).find_map(|attr| match attr.parse_meta() {
        Ok(Meta::List(list)) => list.nested.iter().find_map(|nested| match nested {
            NestedMeta::Meta(Meta::NameValue(nv)) if nv.path.is_ident("width") => match &nv.lit {
                Lit::Int(lit) => Some(lit.clone()),
                lit => panic!("expected integer width, found {:?}", lit),
            },
            _ => None,
        }),
        _ => None,
    })
}

pub(super) fn clog2(value: usize) -> usize {
    if value == 0 {
        0
    } else {
        (::std::mem::size_of::<usize>() * 8) - (value - 1).leading_zeros() as usize
    }
}
