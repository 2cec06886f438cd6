//! # 错误派生宏
//!
//! 提供 `#[derive(Error)]` 过程宏，为 caconf 各模块的错误枚举生成
//! `Display`、`ErrorKind` 与 `std::error::Error` 实现。
//!
//! ## 使用方法
//!
//! ```rust,ignore
//! use error::Error;
//!
//! #[derive(Debug, Error)]
//! enum LoadError {
//!     #[error("缺少必需选项: {0}")]
//!     MissingOption(String),
//!
//!     #[error("凭据来源冲突: {first} 与 {second}")]
//!     Conflict { first: String, second: String },
//!
//!     #[error("未知错误")]
//!     Unknown,
//! }
//! ```
//!
//! 变体的错误码按声明顺序从 1 开始编号；需要稳定业务错误码时，
//! 由各模块在转换为 `ErrorInfo` 时自行映射。

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Variant};

/// Error 派生宏
///
/// # 属性
///
/// - `#[error("消息")]` - 指定错误消息，支持格式化占位符
///   - `{0}`, `{1}`, ... - 位置参数（用于元组变体）
///   - `{field}` - 命名字段（用于结构体变体）
///
/// 未标注 `#[error]` 的变体使用 `错误: 变体名` 作为消息。
#[proc_macro_derive(Error, attributes(error))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return syn::Error::new_spanned(&input, "Error 派生宏只能用于枚举类型")
                .to_compile_error()
                .into();
        }
    };

    let display_arms = variants.iter().map(display_arm);

    let error_code_arms = variants.iter().enumerate().map(|(idx, variant)| {
        let variant_name = &variant.ident;
        let code = idx as u32 + 1;
        match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } => #code },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) => #code },
            Fields::Unit => quote! { Self::#variant_name => #code },
        }
    });

    let expanded = quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(#display_arms,)*
                }
            }
        }

        impl #impl_generics ::error::ErrorKind for #name #ty_generics #where_clause {
            fn error_code(&self) -> u32 {
                match self {
                    #(#error_code_arms,)*
                }
            }

            fn error_message(&self) -> String {
                self.to_string()
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}

/// 读取变体上的 `#[error("...")]` 消息
fn error_message(variant: &Variant) -> String {
    variant
        .attrs
        .iter()
        .find_map(|attr| {
            if !attr.path().is_ident("error") {
                return None;
            }
            match attr.parse_args::<Lit>() {
                Ok(Lit::Str(lit_str)) => Some(lit_str.value()),
                _ => None,
            }
        })
        .unwrap_or_else(|| format!("错误: {}", variant.ident))
}

/// 将消息中的 `{name}` 占位符改写为 `{}`，按出现顺序收集对应绑定
///
/// `{{` 与 `}}` 转义原样保留；未知的占位符不做处理，交由编译器报告。
fn rewrite_format<F>(message: &str, lookup: F) -> (String, Vec<syn::Ident>)
where
    F: Fn(&str) -> Option<syn::Ident>,
{
    let mut output = String::with_capacity(message.len());
    let mut args = Vec::new();
    let mut rest = message;

    while let Some(pos) = rest.find(['{', '}']) {
        output.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            output.push_str(&tail[..2]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                if let Some(binding) = lookup(&tail[1..end]) {
                    output.push_str("{}");
                    args.push(binding);
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }
        output.push_str(&tail[..1]);
        rest = &tail[1..];
    }
    output.push_str(rest);

    (output, args)
}

/// 生成单个变体的 Display 匹配分支，只绑定消息中实际引用的字段
fn display_arm(variant: &Variant) -> proc_macro2::TokenStream {
    let variant_name = &variant.ident;
    let message = error_message(variant);

    match &variant.fields {
        Fields::Named(fields) => {
            let names: Vec<syn::Ident> = fields.named.iter().filter_map(|f| f.ident.clone()).collect();
            let (format_str, args) =
                rewrite_format(&message, |key| names.iter().find(|name| *name == key).cloned());
            let mut used: Vec<syn::Ident> = Vec::new();
            for arg in &args {
                if !used.contains(arg) {
                    used.push(arg.clone());
                }
            }
            if used.is_empty() {
                quote! { Self::#variant_name { .. } => write!(f, #format_str) }
            } else {
                quote! {
                    Self::#variant_name { #(#used,)* .. } => write!(f, #format_str, #(#args),*)
                }
            }
        }
        Fields::Unnamed(fields) => {
            let bindings: Vec<syn::Ident> = (0..fields.unnamed.len())
                .map(|i| syn::Ident::new(&format!("_field{}", i), proc_macro2::Span::call_site()))
                .collect();
            let (format_str, args) = rewrite_format(&message, |key| {
                key.parse::<usize>().ok().and_then(|i| bindings.get(i).cloned())
            });
            if args.is_empty() {
                quote! { Self::#variant_name(..) => write!(f, #format_str) }
            } else {
                quote! {
                    Self::#variant_name(#(#bindings),*) => write!(f, #format_str, #(#args),*)
                }
            }
        }
        Fields::Unit => quote! { Self::#variant_name => write!(f, #message) },
    }
}
