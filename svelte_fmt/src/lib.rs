#![doc = include_str!("../README.md")]

pub mod ast;
mod children;
pub mod config;
mod ctx;
pub mod doc;
mod error;
mod helpers;
pub mod layout;
mod printer;
mod sections;
mod state;

use crate::{ast::Root, config::FormatOptions, ctx::Ctx, doc::Doc, state::Suppression};
pub use crate::{
    ctx::{ExprFlags, Hints},
    error::*,
    helpers::has_pragma,
};
use std::borrow::Cow;

/// Format a parsed Svelte component.
///
/// The tree must come from the same `source`, since spans are resolved against it
/// (for ignored nodes, swallowed whitespace and self-closing detection).
///
/// An external formatter is required for formatting code inside `<script>`,
/// `<style>` and `{…}` expressions.
/// If you don't need to format them or you don't have available formatters,
/// you can pass a closure that returns the original code. (see example below)
///
/// ```
/// use svelte_fmt::{
///     ast::{Element, ElementKind, Fragment, Node, Root, Span, TextNode},
///     format_ast,
/// };
///
/// let source = "<p>hi</p>";
/// let root = Root {
///     html: Fragment {
///         children: vec![Node::Element(Element {
///             kind: ElementKind::Element,
///             name: "p",
///             attributes: vec![],
///             children: vec![Node::Text(TextNode {
///                 raw: "hi".into(),
///                 span: Span::new(3, 5),
///             })],
///             expression: None,
///             tag: None,
///             span: Span::new(0, 9),
///         })],
///         span: Span::new(0, 9),
///     },
///     module: None,
///     instance: None,
///     css: None,
/// };
///
/// let formatted = format_ast(
///     &root,
///     source,
///     &Default::default(),
///     |code, _| Ok::<_, std::convert::Infallible>(code.into()),
/// ).unwrap();
/// assert_eq!(formatted, "<p>hi</p>\n");
/// ```
///
/// For the external formatter closure,
///
/// - The first argument is code that needs formatting.
/// - The second argument is hints which contains useful information for external formatters,
///   such as file extension and print width.
pub fn format_ast<'s, E, F>(
    root: &Root<'s>,
    source: &'s str,
    options: &FormatOptions,
    external_formatter: F,
) -> Result<String, FormatError<E>>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let doc = print_doc(root, source, options, external_formatter)?;
    Ok(layout::print(&doc, &options.layout))
}

/// Build the document of a parsed Svelte component without laying it out.
///
/// Use [`layout::print`] to render it, or bring your own layout engine.
pub fn print_doc<'s, E, F>(
    root: &Root<'s>,
    source: &'s str,
    options: &FormatOptions,
    external_formatter: F,
) -> Result<Doc<'s>, FormatError<E>>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let script_ext = match root
        .instance
        .as_ref()
        .map(|script| printer::script_ext(helpers::lang_of(&script.attributes)))
    {
        Some("ts") => "ts",
        _ => "js",
    };
    log::debug!(
        "printing component of {} bytes with {script_ext} expressions",
        source.len()
    );

    let mut ctx = Ctx {
        source,
        indent_width: options.layout.indent_width,
        print_width: options.layout.print_width,
        options: &options.language,
        indent_level: 0,
        script_ext,
        suppression: Suppression::default(),
        options_doc: None,
        external_formatter,
        external_formatter_errors: Default::default(),
        internal_error: None,
    };

    let doc = sections::print_root(root, &mut ctx);
    if let Some(error) = ctx.internal_error {
        log::debug!("printing aborted: {error}");
        return Err(FormatError::Internal(error));
    }
    if !ctx.external_formatter_errors.is_empty() {
        log::debug!(
            "printing finished with {} external formatter errors",
            ctx.external_formatter_errors.len()
        );
        return Err(FormatError::External(ctx.external_formatter_errors));
    }
    log::debug!("printing finished");

    Ok(doc)
}
