use crate::{
    config::LanguageOptions,
    doc::Doc,
    error::{InternalError, InternalErrorKind},
    state::Suppression,
};
use std::borrow::Cow;

/// Flags attached to an embedded expression before it's handed to the external formatter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExprFlags {
    pub force_single_quote: bool,
    pub force_single_line: bool,
    pub remove_parens: bool,
}

/// Useful information for the external formatter.
#[derive(Clone, Debug)]
pub struct Hints<'s> {
    pub print_width: usize,
    pub indent_level: usize,
    /// Fake file extension, such as `ts` or `css`.
    pub ext: &'s str,
    /// The code lives inside an attribute value.
    pub attr: bool,
    pub expr: ExprFlags,
}

/// Everything one print invocation needs. It's created per invocation,
/// so nothing leaks from one formatted tree into the next.
pub(crate) struct Ctx<'b, 's, E, F>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    pub(crate) source: &'s str,
    pub(crate) indent_width: usize,
    pub(crate) print_width: usize,
    pub(crate) options: &'b LanguageOptions,
    pub(crate) indent_level: usize,
    /// Extension of expressions; follows the instance script's language.
    pub(crate) script_ext: &'s str,
    pub(crate) suppression: Suppression,
    /// `<svelte:options>` lifted out of the markup, waiting for the section reorderer.
    pub(crate) options_doc: Option<Doc<'s>>,
    pub(crate) external_formatter: F,
    pub(crate) external_formatter_errors: Vec<E>,
    pub(crate) internal_error: Option<InternalError>,
}

impl<'b, 's, E, F> Ctx<'b, 's, E, F>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    pub(crate) fn is_strict(&self) -> bool {
        self.options.strict_svelte_attr
    }

    pub(crate) fn directive(&self) -> &'b str {
        &self.options.ignore_comment_directive
    }

    pub(crate) fn raise(&mut self, kind: InternalErrorKind, pos: usize) {
        if self.internal_error.is_none() {
            self.internal_error = Some(InternalError { kind, pos });
        }
    }

    /// Builds a document that will be placed one indentation level deeper,
    /// so embedded code gets an accurate remaining width.
    pub(crate) fn nested(&mut self, f: impl FnOnce(&mut Self) -> Doc<'s>) -> Doc<'s> {
        self.indent_level += self.indent_width;
        let doc = f(self);
        self.indent_level -= self.indent_width;
        doc
    }

    pub(crate) fn format_expr(&mut self, code: &str, flags: ExprFlags, attr: bool) -> String {
        if code.trim().is_empty() {
            String::new()
        } else {
            // Trim original code before sending it to the external formatter.
            // This makes sure the code will be trimmed
            // though external formatter isn't available.
            let wrapped = format!("({})", code.trim());
            let ext = self.script_ext;
            let formatted = self.format_with_external_formatter(
                &wrapped,
                Hints {
                    print_width: self
                        .print_width
                        .saturating_sub(self.indent_level)
                        .saturating_sub(2),
                    indent_level: self.indent_level,
                    ext,
                    attr,
                    expr: flags,
                },
            );
            let formatted = formatted.trim().trim_matches(';');
            formatted
                .strip_prefix('(')
                .and_then(|s| s.strip_suffix(')'))
                .unwrap_or(formatted)
                .trim()
                .to_owned()
        }
    }

    pub(crate) fn format_binding(&mut self, code: &str) -> String {
        if code.trim().is_empty() {
            String::new()
        } else {
            let wrapped = format!("let {} = 0", code.trim());
            let ext = self.script_ext;
            let formatted = self.format_with_external_formatter(
                &wrapped,
                Hints {
                    print_width: self
                        .print_width
                        .saturating_sub(self.indent_level)
                        .saturating_sub(2),
                    indent_level: self.indent_level,
                    ext,
                    attr: false,
                    expr: ExprFlags {
                        force_single_line: true,
                        ..Default::default()
                    },
                },
            );
            let formatted = formatted.trim().trim_matches(';');
            formatted
                .strip_prefix("let ")
                .and_then(|s| s.strip_suffix(" = 0"))
                .unwrap_or(formatted)
                .to_owned()
        }
    }

    pub(crate) fn format_script<'a>(&mut self, code: &'a str, ext: &str) -> Cow<'a, str> {
        let print_width = self
            .print_width
            .saturating_sub(self.indent_level)
            .saturating_sub(if self.options.script_indent {
                self.indent_width
            } else {
                0
            });
        self.format_with_external_formatter(
            code,
            Hints {
                print_width,
                indent_level: self.indent_level,
                ext,
                attr: false,
                expr: ExprFlags::default(),
            },
        )
    }

    pub(crate) fn format_style<'a>(&mut self, code: &'a str, ext: &str) -> Cow<'a, str> {
        let print_width = self
            .print_width
            .saturating_sub(self.indent_level)
            .saturating_sub(if self.options.style_indent {
                self.indent_width
            } else {
                0
            });
        self.format_with_external_formatter(
            code,
            Hints {
                print_width,
                indent_level: self.indent_level,
                ext,
                attr: false,
                expr: ExprFlags::default(),
            },
        )
    }

    fn format_with_external_formatter<'a>(&mut self, code: &'a str, hints: Hints) -> Cow<'a, str> {
        let ext = hints.ext.to_owned();
        match (self.external_formatter)(code, hints) {
            Ok(code) => code,
            Err(e) => {
                log::warn!("external formatter failed on `{ext}` code");
                self.external_formatter_errors.push(e);
                code.into()
            }
        }
    }
}
