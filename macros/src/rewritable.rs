//! Implementation of `#[derive(Rewritable)]`

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, LitStr, PathArguments, Type,
    parse_macro_input,
};

pub fn derive_rewritable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Plain,
    Child,
    ChildList,
}

struct FieldInfo {
    /// Field name, `None` for tuple fields
    member: Option<Ident>,
    /// Name the field is bound to in generated patterns
    binding: Ident,
    kind: FieldKind,
}

/// One constructor of the type: the struct itself or an enum variant
struct Shape {
    path: TokenStream2,
    style: Style,
    fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Named,
    Unnamed,
    Unit,
}

/// The handle type children are stored in.
struct Handle {
    ty: Type,
    wrapper: Ident,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let self_ty: Type = syn::parse2(quote!(#name #ty_generics))?;

    let mut handle = match parse_type_attribute(&input.attrs)? {
        Some(node) => match as_handle(&node, name, &self_ty) {
            Some(handle) => Some(require_shared(handle)?),
            None => {
                return Err(syn::Error::new_spanned(
                    &node,
                    "`node` must be a single-argument wrapper of this type, such as `Rc<Self>`",
                ));
            }
        },
        None => None,
    };

    let shapes = match &input.data {
        Data::Struct(data) => vec![collect_shape(
            quote!(Self),
            &data.fields,
            name,
            &self_ty,
            &mut handle,
        )?],
        Data::Enum(data) => data
            .variants
            .iter()
            .map(|variant| {
                let ident = &variant.ident;
                collect_shape(quote!(Self::#ident), &variant.fields, name, &self_ty, &mut handle)
            })
            .collect::<syn::Result<Vec<_>>>()?,
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "Rewritable cannot be derived for unions",
            ));
        }
    };

    let Some(handle) = handle else {
        return Err(syn::Error::new_spanned(
            name,
            "no field holds a child; add #[rewritable(node = \"Rc<Self>\")] to name the handle type",
        ));
    };
    let handle = &handle.ty;

    let count_arms = shapes.iter().map(|shape| {
        let pattern = shape.pattern(|field| field.kind == FieldKind::ChildList);
        let terms = shape.fields.iter().map(|field| {
            let binding = &field.binding;
            match field.kind {
                FieldKind::Plain => quote!(),
                FieldKind::Child => quote!(+ 1usize),
                FieldKind::ChildList => quote!(+ #binding.len()),
            }
        });
        quote!(#pattern => 0usize #(#terms)*,)
    });

    let get_arms = shapes.iter().map(|shape| {
        let pattern = shape.pattern(|field| field.kind != FieldKind::Plain);
        let pushes = shape.fields.iter().map(|field| {
            let binding = &field.binding;
            match field.kind {
                FieldKind::Plain => quote!(),
                FieldKind::Child => quote!(__out.push(::core::clone::Clone::clone(#binding));),
                FieldKind::ChildList => quote!(__out.extend(#binding.iter().cloned());),
            }
        });
        quote!(#pattern => { #(#pushes)* })
    });

    let set_arms = shapes.iter().map(|shape| {
        let pattern = shape.pattern(|field| field.kind != FieldKind::Child);
        let values = shape.fields.iter().map(|field| {
            let binding = &field.binding;
            let value = match field.kind {
                FieldKind::Plain => quote!(::core::clone::Clone::clone(#binding)),
                FieldKind::Child => quote!({
                    let __child = ::core::clone::Clone::clone(&__children[__next]);
                    __next += 1;
                    __child
                }),
                FieldKind::ChildList => quote!({
                    let __len = #binding.len();
                    let __list = __children[__next..__next + __len].to_vec();
                    __next += __len;
                    __list
                }),
            };
            match &field.member {
                Some(member) => quote!(#member: #value),
                None => value,
            }
        });
        let path = &shape.path;
        let construct = match shape.style {
            Style::Named => quote!(#path { #(#values),* }),
            Style::Unnamed => quote!(#path ( #(#values),* )),
            Style::Unit => quote!(#path),
        };
        quote!(#pattern => #construct,)
    });

    // `match self {}` is rejected for a reference to an empty enum.
    let scrutinee = if shapes.is_empty() {
        quote!(*self)
    } else {
        quote!(self)
    };

    Ok(quote! {
        impl #impl_generics ::sawmill::Rewritable<#handle> for #name #ty_generics #where_clause {
            fn count_children(&self) -> usize {
                match #scrutinee {
                    #(#count_arms)*
                }
            }

            fn get_children(&self, __out: &mut ::sawmill::ChildSink<'_, #handle>) {
                match #scrutinee {
                    #(#get_arms)*
                }
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn set_children(&self, __children: &[#handle]) -> Self {
                ::sawmill::check_child_count(
                    ::sawmill::Rewritable::<#handle>::count_children(self),
                    __children.len(),
                );
                let mut __next = 0usize;
                match #scrutinee {
                    #(#set_arms)*
                }
            }
        }
    })
}

impl Shape {
    /// A pattern matching this shape that binds the fields `bind` selects.
    fn pattern(&self, bind: impl Fn(&FieldInfo) -> bool) -> TokenStream2 {
        let path = &self.path;
        let parts = self.fields.iter().map(|field| {
            let binding = if bind(field) {
                let binding = &field.binding;
                quote!(#binding)
            } else {
                quote!(_)
            };
            match &field.member {
                Some(member) => quote!(#member: #binding),
                None => binding,
            }
        });
        match self.style {
            Style::Named => quote!(#path { #(#parts),* }),
            Style::Unnamed => quote!(#path ( #(#parts),* )),
            Style::Unit => quote!(#path),
        }
    }
}

fn collect_shape(
    path: TokenStream2,
    fields: &Fields,
    name: &Ident,
    self_ty: &Type,
    handle: &mut Option<Handle>,
) -> syn::Result<Shape> {
    let style = match fields {
        Fields::Named(_) => Style::Named,
        Fields::Unnamed(_) => Style::Unnamed,
        Fields::Unit => Style::Unit,
    };

    let mut infos = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let skip = parse_field_attribute(&field.attrs)?;
        let (kind, found) = if skip {
            (FieldKind::Plain, None)
        } else if let Some(found) = vec_element(&field.ty).and_then(|e| as_handle(e, name, self_ty))
        {
            (FieldKind::ChildList, Some(found))
        } else if let Some(found) = as_handle(&field.ty, name, self_ty) {
            (FieldKind::Child, Some(found))
        } else {
            (FieldKind::Plain, None)
        };

        if let Some(found) = found {
            let found = require_shared(found)?;
            match handle {
                Some(existing) if existing.wrapper != found.wrapper => {
                    return Err(syn::Error::new_spanned(
                        &field.ty,
                        format!(
                            "conflicting handle types: children are stored in `{}` elsewhere but in `{}` here",
                            existing.wrapper, found.wrapper
                        ),
                    ));
                }
                Some(_) => {}
                None => *handle = Some(found),
            }
        }

        infos.push(FieldInfo {
            member: field.ident.clone(),
            binding: format_ident!("__field{}", index),
            kind,
        });
    }

    Ok(Shape {
        path,
        style,
        fields: infos,
    })
}

/// Rejects handles whose clones are not the same node.
///
/// Unchanged subtrees are detected by handle identity, and a cloned `Box`
/// is always a fresh allocation.
fn require_shared(handle: Handle) -> syn::Result<Handle> {
    if handle.wrapper == "Box" {
        return Err(syn::Error::new_spanned(
            &handle.ty,
            "`Box` handles have no identity to share between a node and its clone; \
             store children in `Rc<Self>` or `Arc<Self>`",
        ));
    }
    Ok(handle)
}

/// The element type of `Vec<X>`.
fn vec_element(ty: &Type) -> Option<&Type> {
    let (wrapper, inner) = single_argument(ty)?;
    (wrapper == "Vec").then_some(inner)
}

/// Recognises `W<Self>` (or `W<Name>`) and returns it with `Self` spelled out.
fn as_handle(ty: &Type, name: &Ident, self_ty: &Type) -> Option<Handle> {
    let (wrapper, inner) = single_argument(ty)?;
    let Type::Path(inner) = inner else {
        return None;
    };
    if inner.qself.is_some() || inner.path.segments.len() != 1 {
        return None;
    }
    let ident = &inner.path.segments[0].ident;
    if ident != "Self" && ident != name {
        return None;
    }

    let mut handle = ty.clone();
    if let Type::Path(path) = &mut handle {
        if let Some(last) = path.path.segments.last_mut() {
            if let PathArguments::AngleBracketed(args) = &mut last.arguments {
                args.args[0] = GenericArgument::Type(self_ty.clone());
            }
        }
    }
    Some(Handle {
        ty: handle,
        wrapper: wrapper.clone(),
    })
}

/// Splits `W<X>` into `W` and `X`.
fn single_argument(ty: &Type) -> Option<(&Ident, &Type)> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let last = path.path.segments.last()?;
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match &args.args[0] {
        GenericArgument::Type(inner) => Some((&last.ident, inner)),
        _ => None,
    }
}

/// Reads `#[rewritable(node = "...")]` from the type's attributes.
fn parse_type_attribute(attrs: &[Attribute]) -> syn::Result<Option<Type>> {
    let mut node = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("rewritable")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("node") {
                let lit: LitStr = meta.value()?.parse()?;
                node = Some(lit.parse::<Type>()?);
                Ok(())
            } else {
                Err(meta.error("expected `node = \"...\"`"))
            }
        })?;
    }
    Ok(node)
}

/// Reads `#[rewritable(skip)]` from a field's attributes.
fn parse_field_attribute(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut skip = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("rewritable")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}
