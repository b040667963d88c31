use crate::{
    ast::{Comment, ElementKind, Node, Root, Span},
    children::{print_children, trim_text_end, trim_text_start},
    config::Section,
    ctx::{Ctx, Hints},
    doc::{Doc, trim_docs},
    error::InternalErrorKind,
    helpers::{
        count_line_breaks, has_pragma, is_empty_text, is_ignore_directive, is_range_directive,
        text_of,
    },
    printer::{comment_doc, print_attrs_only_tag, print_script, print_style},
    state::State,
};
use std::borrow::Cow;

/// A comment that documented a section before the section was moved.
struct LeadingComment<'s> {
    comment: Comment<'s>,
    /// A blank line separated the comment from its section.
    blank_line: bool,
}

pub(crate) fn print_root<'s, E, F>(root: &Root<'s>, ctx: &mut Ctx<'_, 's, E, F>) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    ctx.suppression.reset();
    ctx.options_doc = None;

    let options = ctx.options;
    let state = State {
        is_top_level: true,
        ..Default::default()
    };
    let mut children: Vec<Cow<Node<'s>>> = root.html.children.iter().map(Cow::Borrowed).collect();

    let doc = if let Some(order) = options.sort_order.sections() {
        log::debug!("printing sections in order {order:?}");
        let directive = ctx.directive();
        let module_comment = root
            .module
            .as_ref()
            .and_then(|script| take_leading_comment(&mut children, script.span, directive));
        let instance_comment = root
            .instance
            .as_ref()
            .and_then(|script| take_leading_comment(&mut children, script.span, directive));
        let css_comment = root
            .css
            .as_ref()
            .and_then(|style| take_leading_comment(&mut children, style.span, directive));
        relocate_options(&mut children, ctx, &state);

        let markup = print_fragment(children, ctx, &state);

        let mut scripts = Vec::with_capacity(2);
        if let Some(module) = &root.module {
            let ignored = is_ignored(module_comment.as_ref(), directive);
            let doc = print_script(module, ignored, ctx, &state);
            scripts.push(with_leading_comment(doc, module_comment));
        }
        if let Some(instance) = &root.instance {
            let ignored = is_ignored(instance_comment.as_ref(), directive);
            let doc = print_script(instance, ignored, ctx, &state);
            scripts.push(with_leading_comment(doc, instance_comment));
        }
        let mut styles = Vec::with_capacity(1);
        if let Some(css) = &root.css {
            let ignored = is_ignored(css_comment.as_ref(), directive);
            let doc = print_style(css, ignored, ctx, &state);
            styles.push(with_leading_comment(doc, css_comment));
        }

        let mut markup = (!markup.is_empty()).then_some(markup);
        let mut options_doc = ctx.options_doc.take();
        let mut docs = Vec::with_capacity(5);
        for section in order {
            match section {
                Section::Options => docs.extend(options_doc.take()),
                Section::Scripts => docs.append(&mut scripts),
                Section::Markup => docs.extend(markup.take()),
                Section::Styles => docs.append(&mut styles),
            }
        }
        if options.embedded_in_markdown
            && let Some(last) = docs.last_mut()
        {
            last.trim_trailing_line();
        }

        let sections = Doc::list(itertools::intersperse(docs, Doc::hard_line()).collect()).group();
        if options.insert_pragma && !has_pragma(ctx.source) {
            Doc::list(vec![Doc::text("<!-- @format -->"), Doc::hard_line(), sections])
        } else {
            sections
        }
    } else {
        log::debug!("printing sections in source order");
        insert_sections(&mut children, root);
        let mut markup = print_fragment(children, ctx, &state);
        if options.embedded_in_markdown {
            markup.trim_trailing_line();
        }
        if options.insert_pragma && !has_pragma(ctx.source) {
            Doc::list(vec![Doc::text("<!-- @format -->"), Doc::hard_line(), markup])
        } else {
            markup
        }
    };

    ctx.suppression.reset();
    ctx.options_doc = None;
    doc
}

/// Markup of the whole component, terminated by a line break.
fn print_fragment<'s, E, F>(
    mut children: Vec<Cow<'_, Node<'s>>>,
    ctx: &mut Ctx<'_, 's, E, F>,
    state: &State,
) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    if children.iter().all(|child| is_empty_text(child)) {
        return Doc::nil();
    }

    let first = children
        .iter()
        .position(|child| !is_empty_text(child))
        .unwrap_or_default();
    let last = children
        .iter()
        .rposition(|child| !is_empty_text(child))
        .unwrap_or_default();
    children[..=first].iter_mut().for_each(trim_text_start);
    children[last..].iter_mut().for_each(trim_text_end);

    let mut docs = print_children(children, false, ctx, state);
    trim_docs(&mut docs);
    if docs.iter().all(Doc::is_empty) {
        return Doc::nil();
    }
    docs.push(Doc::hard_line());
    Doc::list(docs).group()
}

/// Removes the comment right before a section, together with the whitespace around it.
fn take_leading_comment<'s>(
    children: &mut Vec<Cow<'_, Node<'s>>>,
    section: Span,
    directive: &str,
) -> Option<LeadingComment<'s>> {
    let mut cursor = section.start;
    let mut between = Vec::with_capacity(1);
    let comment = loop {
        let index = children.iter().position(|child| child.span().end == cursor)?;
        match &*children[index] {
            Node::Comment(comment) if !is_range_directive(&children[index], directive) => {
                break Some((index, comment.clone()));
            }
            node if is_empty_text(node) => {
                between.push(index);
                cursor = node.span().start;
            }
            _ => break None,
        }
    };

    let anchor = match &comment {
        Some((_, comment)) => comment.span.start,
        None => section.start,
    };
    let blank_line = between
        .iter()
        .filter_map(|index| text_of(&children[*index]))
        .map(count_line_breaks)
        .sum::<usize>()
        >= 2;

    let mut removed = between;
    if let Some((index, _)) = &comment {
        removed.push(*index);
    }
    // Whitespace that led up to the removed nodes goes as well.
    if let Some(index) = children
        .iter()
        .position(|child| child.span().end == anchor && is_empty_text(child))
    {
        removed.push(index);
    }
    removed.sort_unstable();
    removed.dedup();
    for index in removed.into_iter().rev() {
        children.remove(index);
    }

    comment.map(|(_, comment)| LeadingComment {
        comment,
        blank_line,
    })
}

fn is_ignored(comment: Option<&LeadingComment>, directive: &str) -> bool {
    comment.is_some_and(|leading| is_ignore_directive(&leading.comment, directive))
}

fn with_leading_comment<'s>(doc: Doc<'s>, comment: Option<LeadingComment<'s>>) -> Doc<'s> {
    match comment {
        Some(LeadingComment {
            comment,
            blank_line,
        }) => {
            let mut docs = vec![comment_doc(&comment), Doc::hard_line()];
            if blank_line {
                docs.push(Doc::hard_line());
            }
            docs.push(doc);
            docs.push(Doc::hard_line());
            Doc::list(docs)
        }
        None => Doc::list(vec![doc, Doc::hard_line()]),
    }
}

/// Moves `<svelte:options>` out of the markup into its own section,
/// bringing along a comment written right before it.
fn relocate_options<'s, E, F>(
    children: &mut Vec<Cow<'_, Node<'s>>>,
    ctx: &mut Ctx<'_, 's, E, F>,
    state: &State,
) where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let directive = ctx.directive();
    while let Some(index) = children.iter().position(
        |child| matches!(&**child, Node::Element(element) if element.kind == ElementKind::Options),
    ) {
        if ctx.options_doc.is_some() {
            ctx.raise(InternalErrorKind::UnexpectedOptions, children[index].span().start);
            return;
        }
        let node = children.remove(index);
        let Node::Element(element) = &*node else {
            continue;
        };

        let comment_index = match index.checked_sub(1).map(|i| &*children[i]) {
            Some(Node::Comment(..)) => Some(index - 1),
            Some(node) if is_empty_text(node) => index
                .checked_sub(2)
                .filter(|i| matches!(&*children[*i], Node::Comment(..))),
            _ => None,
        }
        .filter(|i| !is_range_directive(&children[*i], directive));
        let comment = comment_index.and_then(|i| match &*children[i] {
            Node::Comment(comment) => Some(comment_doc(comment)),
            _ => None,
        });
        if let Some(i) = comment_index {
            // The whitespace between comment and options is dropped, too.
            children.drain(i..index);
        }

        let mut doc = Doc::list(vec![print_attrs_only_tag(element, ctx, state), Doc::hard_line()])
            .group();
        if let Some(comment) = comment {
            doc = Doc::list(vec![comment, Doc::hard_line(), doc]).group();
        }
        ctx.options_doc = Some(doc);
    }
}

/// Puts scripts and styles back among the markup children at their source position.
fn insert_sections<'s>(children: &mut Vec<Cow<'_, Node<'s>>>, root: &Root<'s>) {
    let mut sections: Vec<Node<'s>> = root
        .module
        .iter()
        .chain(&root.instance)
        .cloned()
        .map(Node::Script)
        .chain(root.css.iter().cloned().map(Node::Style))
        .collect();
    sections.sort_by_key(|section| section.span().start);
    for section in sections {
        let end = section.span().end;
        let index = children
            .iter()
            .position(|child| child.span().start >= end)
            .unwrap_or(children.len());
        children.insert(index, Cow::Owned(section));
    }
}
