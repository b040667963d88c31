//! Joining of sibling nodes.
//!
//! Children are held as [`Cow`]s: untouched nodes stay borrowed from the
//! tree, while trimmed or merged text nodes become owned replacements.

use crate::{
    ast::{Node, Span, TextNode},
    ctx::{Ctx, Hints},
    doc::Doc,
    helpers::*,
    printer::DocGen,
    state::State,
};
use std::borrow::Cow;

/// Prints a list of children, deciding the separator between each pair.
pub(crate) fn print_children<'s, E, F>(
    children: Vec<Cow<'_, Node<'s>>>,
    parent_is_block: bool,
    ctx: &mut Ctx<'_, 's, E, F>,
    state: &State,
) -> Vec<Doc<'s>>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let children = prepare_children(children);
    if children.is_empty() {
        return vec![];
    }

    let outer = ctx.suppression.enter_siblings();
    let docs = print_siblings(children, parent_is_block, ctx, state);
    ctx.suppression.leave_siblings(outer);
    docs
}

fn print_siblings<'s, E, F>(
    mut children: Vec<Cow<'_, Node<'s>>>,
    parent_is_block: bool,
    ctx: &mut Ctx<'_, 's, E, F>,
    state: &State,
) -> Vec<Doc<'s>>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{

    let options = ctx.options;
    let sensitivity = &options.whitespace_sensitivity;
    let is_block = |node: &Node| is_block_element(node, sensitivity);
    let is_inline = |node: &Node| is_inline_element(node, state.in_pre, sensitivity);

    let last_index = children.len() - 1;
    let mut docs = Vec::with_capacity(children.len() * 2);
    // Whitespace trimmed from the end of the previous text, still owed to the next inline child.
    let mut pending_whitespace = false;

    for i in 0..children.len() {
        let child_state = State {
            is_last_in_block: parent_is_block && i == last_index,
            ..*state
        };

        if let Node::Text(..) = &*children[i] {
            pending_whitespace = false;
            if i == 0 || i == last_index {
                docs.push(children[i].doc(ctx, &child_state));
                continue;
            }

            let prev_is_inline = is_inline(&children[i - 1]);
            let prev_is_block = is_block(&children[i - 1]);
            let next_is_inline = is_inline(&children[i + 1]);
            let next_is_block = is_block(&children[i + 1]);

            let text = &children[i];
            if is_text_starting_with_whitespace(text)
                && !is_empty_text(text)
                && !is_text_starting_with_linebreak(text, 1)
            {
                if prev_is_inline {
                    trim_text_start(&mut children[i]);
                    if let Some(last) = docs.pop() {
                        docs.push(Doc::list(vec![last, Doc::line_or_space()]).group());
                    }
                } else if prev_is_block {
                    trim_text_start(&mut children[i]);
                }
            }

            let text = &children[i];
            if is_text_ending_with_whitespace(text)
                && (next_is_inline && !is_text_ending_with_linebreak(text, 1)
                    || next_is_block && !is_text_ending_with_linebreak(text, 2))
            {
                pending_whitespace = !prev_is_block;
                trim_text_end(&mut children[i]);
            }

            docs.push(children[i].doc(ctx, &child_state));
        } else if is_block(&children[i]) {
            if let Some(prev) = i.checked_sub(1).map(|i| &children[i])
                && !is_block(prev)
                && (!matches!(&**prev, Node::Text(..))
                    || pending_whitespace
                    || !is_text_ending_with_whitespace(prev))
            {
                docs.push(Doc::line_or_nil());
            }

            docs.push(children[i].doc(ctx, &child_state));

            if let Some(next) = children.get(i + 1)
                && (!matches!(&**next, Node::Text(..))
                    // Empty text keeps a following inline element on its own line
                    // once the children break.
                    || (!is_empty_text(next)
                        || children.get(i + 2).is_some_and(|node| is_inline(node)))
                        && !is_text_starting_with_linebreak(next, 1))
            {
                docs.push(Doc::line_or_nil());
            }
            pending_whitespace = false;
        } else if is_inline(&children[i]) {
            let doc = children[i].doc(ctx, &child_state);
            if pending_whitespace {
                docs.push(Doc::list(vec![Doc::line_or_space(), doc]).group());
            } else {
                docs.push(doc);
            }
            pending_whitespace = false;
        } else {
            docs.push(children[i].doc(ctx, &child_state));
            pending_whitespace = false;
        }
    }

    if children.len() > 1 && children.iter().any(|child| is_block(child)) {
        docs.push(Doc::break_parent());
    }
    docs
}

/// Drops empty text and merges adjacent text nodes,
/// which are left behind when a node between them was relocated.
fn prepare_children<'a, 's>(children: Vec<Cow<'a, Node<'s>>>) -> Vec<Cow<'a, Node<'s>>> {
    let mut prepared: Vec<Cow<Node>> = Vec::with_capacity(children.len());
    for child in children {
        if let Node::Text(text) = &*child {
            if text.raw.is_empty() {
                continue;
            }
            if let Some(Node::Text(prev)) = prepared.last().map(|prev| &**prev) {
                let merged = Node::Text(TextNode {
                    raw: Cow::Owned(format!("{}{}", prev.raw, text.raw)),
                    span: Span::new(prev.span.start, text.span.end),
                });
                if let Some(last) = prepared.last_mut() {
                    *last = Cow::Owned(merged);
                }
                continue;
            }
        }
        prepared.push(child);
    }
    prepared
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Whitespace {
    None,
    Space,
    Line,
}

/// Body of `{#if}`, `{:else}`, `{#each}`, `{#key}` and the parts of `{#await}`.
pub(crate) fn print_block_children<'s, E, F>(
    children: &[Node<'s>],
    ctx: &mut Ctx<'_, 's, E, F>,
    state: &State,
) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    if children.is_empty() {
        return Doc::nil();
    }

    let at_start = whitespace_at_block_start(children, ctx.source);
    let at_end = whitespace_at_block_end(children, ctx.source);
    let has_line = at_start == Whitespace::Line || at_end == Whitespace::Line;
    let separator = |whitespace| match whitespace {
        Whitespace::None => Doc::nil(),
        _ if has_line => Doc::hard_line(),
        _ => Doc::line_or_space(),
    };
    let start_line = separator(at_start);
    let end_line = separator(at_end);

    let mut children: Vec<Cow<Node<'s>>> = children.iter().map(Cow::Borrowed).collect();
    if let Some(first) = children.first_mut() {
        trim_text_start(first);
    }
    if let Some(last) = children.last_mut() {
        trim_text_end(last);
    }

    let body = ctx.nested(|ctx| Doc::list(print_children(children, false, ctx, state)).group());
    Doc::list(vec![Doc::list(vec![start_line, body]).indent(), end_line])
}

fn whitespace_at_block_start(children: &[Node], source: &str) -> Whitespace {
    let Some(first) = children.first() else {
        return Whitespace::None;
    };
    if is_text_starting_with_linebreak(first, 1) {
        return Whitespace::Line;
    }
    if is_text_starting_with_whitespace(first) {
        return Whitespace::Space;
    }

    // The tree may have swallowed whitespace between `}` and the first child.
    let start = first.span().start;
    source
        .get(..start)
        .and_then(|before| before.rfind('}'))
        .and_then(|brace| source.get(brace + 1..start))
        .filter(|between| !between.is_empty() && is_whitespace_only(between))
        .map_or(Whitespace::None, |between| {
            if starts_with_linebreak(between, 1) {
                Whitespace::Line
            } else {
                Whitespace::Space
            }
        })
}

fn whitespace_at_block_end(children: &[Node], source: &str) -> Whitespace {
    let Some(last) = children.last() else {
        return Whitespace::None;
    };
    if is_text_ending_with_linebreak(last, 1) {
        return Whitespace::Line;
    }
    if is_text_ending_with_whitespace(last) {
        return Whitespace::Space;
    }

    let end = last.span().end;
    source
        .get(end..)
        .and_then(|after| after.find('{'))
        .and_then(|brace| source.get(end..end + brace))
        .filter(|between| !between.is_empty() && is_whitespace_only(between))
        .map_or(Whitespace::None, |between| {
            if ends_with_linebreak(between, 1) {
                Whitespace::Line
            } else {
                Whitespace::Space
            }
        })
}

pub(crate) fn trim_text_start(node: &mut Cow<'_, Node<'_>>) {
    trim_text(node, str::trim_start);
}

pub(crate) fn trim_text_end(node: &mut Cow<'_, Node<'_>>) {
    trim_text(node, str::trim_end);
}

fn trim_text(node: &mut Cow<'_, Node<'_>>, trim: fn(&str) -> &str) {
    let Node::Text(text) = &**node else {
        return;
    };
    if trim(&text.raw).len() == text.raw.len() {
        return;
    }
    let raw = match &text.raw {
        Cow::Borrowed(raw) => Cow::Borrowed(trim(*raw)),
        Cow::Owned(raw) => Cow::Owned(trim(raw).to_owned()),
    };
    let trimmed = Node::Text(TextNode {
        raw,
        span: text.span,
    });
    *node = Cow::Owned(trimmed);
}
