//! Derive macro for fixture-injector
//!
//! `#[derive(Injectable)]` writes the class descriptor of a struct: its
//! constructor (through `Default`), its ancestor, the contracts it
//! implements, its marked fields and its initialization hooks.
//!
//! # Example
//!
//! ```rust,ignore
//! use fixture_injector::{Context, Inject, Injectable};
//!
//! pub trait UserDao: Send + Sync {}
//! fixture_injector::contract!(dyn UserDao as "IUserDao", substitutable);
//!
//! #[derive(Default, Injectable)]
//! #[injectable(name = "UserDao", implements(dyn UserDao), init = connect)]
//! pub struct PgUserDao {
//!     #[extends]
//!     base: AbstractDao,
//!     #[context]
//!     session: Context<Session>,
//!     #[service]
//!     #[use_substitute(FakeAudit)]
//!     audit: Inject<dyn AuditLog>,
//!     #[fixture]
//!     orders: Inject<OrderGenerator>,
//!     // unmarked fields are not described
//!     calls: u64,
//! }
//!
//! impl PgUserDao {
//!     fn connect(&self) -> Result<(), std::io::Error> {
//!         Ok(())
//!     }
//! }
//! ```
//!
//! # Type attributes
//!
//! - `name = "..."` - simple name used by the naming convention (default:
//!   the struct name)
//! - `implements(dyn A, dyn B)` - contracts, each declared with `contract!`
//! - `init = method` - initialization hook, `&self` and no arguments,
//!   returning `()` or `Result<(), E>`; repeatable
//! - `context = "..."` - name of the shared context this type wants
//! - `nested_in = "Outer"` - declare as a member type of `Outer`
//! - `no_default` - no constructor, for ancestors that are never built alone
//!
//! Structs declared without `pub` are described as restricted and cannot be
//! instantiated by the injector.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Data, DeriveInput, Fields, Ident, LitStr, Token, Type, Visibility,
    parse_macro_input,
};

/// Derive macro generating `fixture_injector::Injectable`.
///
/// # Field attributes
///
/// - `#[service]` - shared service component, field type `Inject<T>`
/// - `#[fixture]` - nested fixture, field type `Inject<T>`
/// - `#[context]` - shared context, field type `Context<C>`
/// - `#[use_substitute(A, B)]` - register substitutes when the field is visited
/// - `#[extends]` - the embedded ancestor struct, at most one
#[proc_macro_derive(
    Injectable,
    attributes(injectable, service, fixture, context, use_substitute, extends)
)]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Options from `#[injectable(...)]`
#[derive(Default)]
struct TypeOptions {
    name: Option<LitStr>,
    contracts: Vec<Type>,
    init_hooks: Vec<Ident>,
    context: Option<LitStr>,
    nested_in: Option<LitStr>,
    no_default: bool,
}

impl TypeOptions {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident("injectable")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    options.name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("implements") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                    options.contracts.extend(types);
                } else if meta.path.is_ident("init") {
                    options.init_hooks.push(meta.value()?.parse()?);
                } else if meta.path.is_ident("context") {
                    options.context = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("nested_in") {
                    options.nested_in = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("no_default") {
                    options.no_default = true;
                } else {
                    return Err(meta.error("unsupported injectable option"));
                }
                Ok(())
            })?;
        }

        Ok(options)
    }
}

/// Markers found on one field
#[derive(Default)]
struct FieldMarkers {
    service: bool,
    fixture: bool,
    context: bool,
    extends: bool,
    substitutes: Vec<Type>,
}

impl FieldMarkers {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut markers = Self::default();

        for attr in attrs {
            let path = attr.path();
            if path.is_ident("service") {
                attr.meta.require_path_only()?;
                markers.service = true;
            } else if path.is_ident("fixture") {
                attr.meta.require_path_only()?;
                markers.fixture = true;
            } else if path.is_ident("context") {
                attr.meta.require_path_only()?;
                markers.context = true;
            } else if path.is_ident("extends") {
                attr.meta.require_path_only()?;
                markers.extends = true;
            } else if path.is_ident("use_substitute") {
                let types =
                    attr.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)?;
                markers.substitutes.extend(types);
            }
        }

        Ok(markers)
    }

    fn is_described(&self) -> bool {
        self.service || self.fixture || self.context || !self.substitutes.is_empty()
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Injectable cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Injectable can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Injectable can only be derived for structs",
            ));
        }
    };

    let options = TypeOptions::parse(&input.attrs)?;
    let krate = quote! { ::fixture_injector };

    let name = options
        .name
        .clone()
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));

    let visibility = match input.vis {
        Visibility::Inherited => quote! { #krate::Visibility::Restricted },
        _ => quote! { #krate::Visibility::Public },
    };

    let mut steps: Vec<TokenStream2> = Vec::new();

    if !options.no_default {
        steps.push(quote! {
            .constructor(#krate::Constructor::public(|| {
                ::std::result::Result::Ok(
                    ::std::sync::Arc::new(<#ident as ::std::default::Default>::default())
                        as #krate::Instance,
                )
            }))
        });
    }

    if let Some(outer) = &options.nested_in {
        steps.push(quote! { .nested_in(#outer, true) });
    }

    let mut superclass: Option<&Ident> = None;

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let markers = FieldMarkers::parse(&field.attrs)?;
        let field_type = &field.ty;

        if markers.extends {
            if superclass.replace(field_ident).is_some() {
                return Err(syn::Error::new_spanned(
                    field_ident,
                    "only one field can be marked #[extends]",
                ));
            }
            steps.push(quote! {
                .extends(<#field_type as #krate::Injectable>::class, |o| {
                    o.downcast_ref::<#ident>()
                        .map(|s| &s.#field_ident as &dyn ::std::any::Any)
                })
            });
            continue;
        }

        if !markers.is_described() {
            continue;
        }

        let field_name = LitStr::new(&field_ident.to_string(), field_ident.span());
        let mut descriptor = quote! {
            #krate::Field::new::<#field_type>(#field_name, |o| {
                o.downcast_ref::<#ident>()
                    .map(|s| &s.#field_ident as &dyn #krate::Slot)
            })
        };
        if markers.service {
            descriptor.extend(quote! { .service() });
        }
        if markers.fixture {
            descriptor.extend(quote! { .fixture() });
        }
        if markers.context {
            descriptor.extend(quote! { .context() });
        }
        for substitute in &markers.substitutes {
            descriptor.extend(quote! {
                .use_substitute(<#substitute as #krate::Injectable>::class)
            });
        }

        steps.push(quote! { .field(#descriptor) });
    }

    for contract in &options.contracts {
        steps.push(quote! {
            .implements(<#contract as #krate::Injectable>::class)
            .upcast(#krate::upcast!(#ident => #contract))
        });
    }

    for hook in &options.init_hooks {
        let hook_name = LitStr::new(&hook.to_string(), hook.span());
        let mismatch = format!("{hook} expects an instance of {ident}");
        steps.push(quote! {
            .init_hook(#hook_name, |o| match o.downcast_ref::<#ident>() {
                ::std::option::Option::Some(s) => {
                    #krate::IntoHookResult::into_hook_result(#ident::#hook(s))
                }
                ::std::option::Option::None => ::std::result::Result::Err(#mismatch.into()),
            })
        });
    }

    if let Some(context) = &options.context {
        steps.push(quote! { .context_name(#context) });
    }

    Ok(quote! {
        impl #krate::Injectable for #ident {
            fn class() -> &'static #krate::Class {
                static CLASS: #krate::Lazy<#krate::Class> = #krate::Lazy::new(|| {
                    #krate::Class::concrete::<#ident>(#name, ::std::module_path!())
                        .visibility(#visibility)
                        #(#steps)*
                        .build()
                });
                &CLASS
            }
        }
    })
}
