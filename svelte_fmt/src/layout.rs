//! Renders [`Doc`] through `tiny_pretty`.
//!
//! Indentation is applied directly to each line instead of through nested
//! wrappers, which is what allows [`Doc::Dedent`] to exist. Groups that
//! contain a forced break are emitted as plain lists so they inherit the
//! broken mode of their (also broken) parents.

use crate::{
    config::LayoutOptions,
    doc::{Doc, LineKind},
};
use tiny_pretty::{IndentKind, PrintOptions};

pub fn print(doc: &Doc<'_>, options: &LayoutOptions) -> String {
    let mut lowering = Lowering {
        indent_width: options.indent_width,
        depth: 0,
        in_fill: false,
    };
    let (doc, _) = lowering.lower(doc);
    tiny_pretty::print(
        &doc,
        &PrintOptions {
            indent_kind: if options.use_tabs {
                IndentKind::Tab
            } else {
                IndentKind::Space
            },
            line_break: options.line_break.clone().into(),
            width: options.print_width,
            tab_size: options.indent_width,
        },
    )
}

struct Lowering {
    indent_width: usize,
    depth: usize,
    in_fill: bool,
}

impl Lowering {
    /// Returns the lowered document and whether it forces a break.
    fn lower<'a>(&mut self, doc: &'a Doc<'_>) -> (tiny_pretty::Doc<'a>, bool) {
        match doc {
            Doc::Text(text) => (tiny_pretty::Doc::text(text.as_ref()), false),
            Doc::Concat(docs) => self.lower_seq(docs),
            Doc::Line(kind) => self.lower_line(*kind),
            Doc::Group {
                content,
                should_break,
            } => {
                let in_fill = self.in_fill;
                self.in_fill = false;
                let (content, forced) = self.lower(content);
                self.in_fill = in_fill;
                if forced || *should_break {
                    (content, true)
                } else {
                    (content.group(), false)
                }
            }
            Doc::Indent(content) => {
                self.depth += 1;
                let lowered = self.lower(content);
                self.depth -= 1;
                lowered
            }
            Doc::Dedent(content) => {
                let depth = self.depth;
                self.depth = depth.saturating_sub(1);
                let lowered = self.lower(content);
                self.depth = depth;
                lowered
            }
            Doc::Fill(docs) => {
                let in_fill = self.in_fill;
                self.in_fill = true;
                let lowered = self.lower_seq(docs);
                self.in_fill = in_fill;
                lowered
            }
            Doc::BreakParent => (tiny_pretty::Doc::nil(), true),
        }
    }

    fn lower_seq<'a>(&mut self, docs: &'a [Doc<'_>]) -> (tiny_pretty::Doc<'a>, bool) {
        let mut flat = Vec::with_capacity(docs.len());
        flatten(docs, &mut flat);
        let lonely = flat
            .iter()
            .all(|doc| matches!(doc, Doc::Line(LineKind::KeepIfLonely)) || doc.is_empty());

        let mut forced = false;
        let mut lowered = Vec::with_capacity(flat.len());
        for (i, doc) in flat.iter().enumerate() {
            match doc {
                Doc::Line(LineKind::KeepIfLonely) if lonely => continue,
                // A hard line directly followed by another one would leave
                // indentation on the blank line between them.
                Doc::Line(LineKind::Hard)
                    if matches!(
                        flat[i + 1..].iter().find(|doc| !doc.is_empty()),
                        Some(Doc::Line(LineKind::Hard | LineKind::KeepIfLonely))
                    ) =>
                {
                    forced = true;
                    lowered.push(tiny_pretty::Doc::empty_line());
                }
                doc => {
                    let (doc, doc_forced) = self.lower(doc);
                    forced |= doc_forced;
                    lowered.push(doc);
                }
            }
        }
        (tiny_pretty::Doc::list(lowered), forced)
    }

    fn lower_line<'a>(&self, kind: LineKind) -> (tiny_pretty::Doc<'a>, bool) {
        let (line, forced) = match kind {
            LineKind::Normal if self.in_fill => (tiny_pretty::Doc::soft_line(), false),
            LineKind::Normal => (tiny_pretty::Doc::line_or_space(), false),
            LineKind::Soft => (tiny_pretty::Doc::line_or_nil(), false),
            LineKind::Hard | LineKind::KeepIfLonely => (tiny_pretty::Doc::hard_line(), true),
            LineKind::Literal => return (tiny_pretty::Doc::empty_line(), true),
        };
        if self.depth == 0 {
            (line, forced)
        } else {
            (line.nest(self.depth * self.indent_width), forced)
        }
    }
}

fn flatten<'a, 's>(docs: &'a [Doc<'s>], out: &mut Vec<&'a Doc<'s>>) {
    for doc in docs {
        if let Doc::Concat(inner) = doc {
            flatten(inner, out);
        } else {
            out.push(doc);
        }
    }
}
