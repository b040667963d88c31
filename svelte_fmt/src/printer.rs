use crate::{
    ast::*,
    children::{print_block_children, print_children, trim_text_end, trim_text_start},
    config::{SortOrder, WhitespaceSensitivity},
    ctx::{Ctx, ExprFlags, Hints},
    doc::Doc,
    error::InternalErrorKind,
    helpers::{self, *},
    state::State,
};
use std::borrow::Cow;

pub(crate) trait DocGen<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>;
}

impl<'s> DocGen<'s> for Attribute<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        match self {
            Attribute::Attribute(native_attribute) => native_attribute.doc(ctx, state),
            Attribute::Directive(directive) => directive.doc(ctx, state),
            Attribute::Spread(spread) => Doc::text("{...")
                .append(expr_doc(ctx, &spread.expression, ExprFlags::default(), true))
                .append(Doc::text("}")),
            Attribute::StyleDirective(style_directive) => style_directive.doc(ctx, state),
        }
    }
}

impl<'s> DocGen<'s> for AwaitBlock<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        let has_pending = has_content(&self.pending.children);
        let has_then = has_content(&self.then.children);
        let has_catch = has_content(&self.catch.children);
        let state = state.nested();
        let head = block_expr_doc(ctx, &self.expression);

        let mut docs = Vec::with_capacity(8);
        if !has_pending && has_then {
            docs.push(
                Doc::list(vec![
                    Doc::text("{#await "),
                    head,
                    Doc::text(" then"),
                    binding_doc(ctx, self.value.as_ref()),
                    Doc::text("}"),
                ])
                .group(),
            );
            docs.push(print_block_children(&self.then.children, ctx, &state));
        } else if !has_pending && has_catch {
            docs.push(
                Doc::list(vec![
                    Doc::text("{#await "),
                    head,
                    Doc::text(" catch"),
                    binding_doc(ctx, self.error.as_ref()),
                    Doc::text("}"),
                ])
                .group(),
            );
            docs.push(print_block_children(&self.catch.children, ctx, &state));
        } else {
            docs.push(
                Doc::list(vec![Doc::text("{#await "), head, Doc::text("}")]).group(),
            );
            if has_pending {
                docs.push(print_block_children(&self.pending.children, ctx, &state));
            }
            if has_then {
                docs.push(
                    Doc::list(vec![
                        Doc::text("{:then"),
                        binding_doc(ctx, self.value.as_ref()),
                        Doc::text("}"),
                    ])
                    .group(),
                );
                docs.push(print_block_children(&self.then.children, ctx, &state));
            }
        }
        if (has_pending || has_then) && has_catch {
            docs.push(
                Doc::list(vec![
                    Doc::text("{:catch"),
                    binding_doc(ctx, self.error.as_ref()),
                    Doc::text("}"),
                ])
                .group(),
            );
            docs.push(print_block_children(&self.catch.children, ctx, &state));
        }
        docs.push(Doc::text("{/await}"));
        Doc::list(docs).group()
    }
}

impl<'s> DocGen<'s> for Comment<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        let directive = ctx.directive();
        if state.is_top_level && is_ignore_start_directive(self, directive) {
            ctx.suppression.start_range();
        } else if state.is_top_level && is_ignore_end_directive(self, directive) {
            ctx.suppression.end_range();
        } else if is_ignore_directive(self, directive) {
            ctx.suppression.ignore_next();
        }
        comment_doc(self)
    }
}

impl<'s> DocGen<'s> for Directive<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, _: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        let prefix = match self.kind {
            DirectiveKind::Action => "use:",
            DirectiveKind::Animation => "animate:",
            DirectiveKind::Binding => "bind:",
            DirectiveKind::Class => "class:",
            DirectiveKind::EventHandler => "on:",
            DirectiveKind::Let => "let:",
            DirectiveKind::Transition {
                intro: true,
                outro: true,
            } => "transition:",
            DirectiveKind::Transition { intro: true, .. } => "in:",
            DirectiveKind::Transition { .. } => "out:",
        };
        let mut docs = vec![Doc::text(prefix), Doc::text(self.name)];
        docs.extend(modifiers_doc(&self.modifiers));

        // Dropping the value of `on:`, `use:`, `transition:` or `animate:` changes meaning.
        let allows_shorthand = matches!(
            self.kind,
            DirectiveKind::Binding | DirectiveKind::Class | DirectiveKind::Let
        );
        match &self.expression {
            Some(expr) if allows_shorthand && expr.as_identifier() == Some(self.name) => {
                docs.push(shorthand_value_doc(ctx, self.name));
            }
            Some(expr) => {
                docs.push(Doc::text("="));
                docs.push(attr_expr_doc(ctx, expr));
            }
            None => {}
        }
        Doc::list(docs)
    }
}

impl<'s> DocGen<'s> for EachBlock<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        let state = state.nested();
        let mut docs = vec![
            Doc::text("{#each "),
            block_expr_doc(ctx, &self.expression),
            Doc::text(" as"),
            binding_doc(ctx, Some(&self.context)),
        ];
        if let Some(index) = self.index {
            docs.push(Doc::text(", "));
            docs.push(Doc::text(index));
        }
        if let Some(key) = &self.key {
            docs.push(Doc::text(" ("));
            docs.push(block_expr_doc(ctx, key));
            docs.push(Doc::text(")"));
        }
        docs.push(Doc::text("}"));
        docs.push(print_block_children(&self.children, ctx, &state));
        if let Some(else_block) = &self.else_block {
            docs.push(else_block.doc(
                ctx,
                &State {
                    in_each: true,
                    ..state
                },
            ));
        }
        docs.push(Doc::text("{/each}"));
        Doc::list(vec![Doc::list(docs), Doc::break_parent()]).group()
    }
}

impl<'s> DocGen<'s> for Element<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        match self.kind {
            ElementKind::Body | ElementKind::Document => return print_attrs_only_tag(self, ctx, state),
            ElementKind::Options => {
                if ctx.options.sort_order != SortOrder::None {
                    ctx.raise(InternalErrorKind::UnexpectedOptions, self.span.start);
                }
                return print_attrs_only_tag(self, ctx, state);
            }
            _ => {}
        }

        let options = ctx.options;
        let same_line = options.closing_bracket_same_line;
        let sensitivity = &options.whitespace_sensitivity;
        let is_empty = self.children.iter().all(is_empty_text);
        let is_doctype = self.name.eq_ignore_ascii_case("!doctype");
        let did_self_close = self
            .span
            .end
            .checked_sub(2)
            .and_then(|i| ctx.source.as_bytes().get(i))
            == Some(&b'/');
        let keeps_self_closing = match self.kind {
            ElementKind::Element => !options.strict_svelte_attr,
            ElementKind::Head
            | ElementKind::InlineComponent
            | ElementKind::Slot
            | ElementKind::SlotTemplate
            | ElementKind::Title => true,
            _ => false,
        };
        let is_self_closing = is_empty
            && (did_self_close && keeps_self_closing
                || self.kind == ElementKind::Window
                || is_void_element(self.name)
                || is_doctype);

        let attr_line = attr_line(ctx, self.attributes.len());
        let attr_state = state.nested();
        let mut head = vec![this_binding_doc(self, ctx, attr_line.clone())];
        head.extend(attrs_doc(&self.attributes, attr_line, ctx, &attr_state));

        if is_self_closing {
            head.push(if same_line || is_doctype {
                Doc::nil()
            } else {
                Doc::line_or_space().dedent()
            });
            return Doc::text("<")
                .append(Doc::text(self.name))
                .append(Doc::list(head).group().indent())
                .append(Doc::text(if same_line && !is_doctype { " " } else { "" }))
                .append(Doc::text(if is_doctype { ">" } else { "/>" }))
                .group();
        }

        let is_supported = !(self.name == "template" && !is_supported_language(&self.attributes));
        let in_pre = state.in_pre || self.name.eq_ignore_ascii_case("pre");
        let is_inline = is_inline_tag(self, in_pre, sensitivity);
        let hug_start = should_hug_start(self, is_supported, sensitivity);
        let hug_end = should_hug_end(self, is_supported, sensitivity);

        let mut children: Vec<Cow<Node<'s>>> = self.children.iter().map(Cow::Borrowed).collect();
        let mut start_sep = Doc::line_or_nil();
        let mut end_sep = Doc::line_or_nil();
        if in_pre {
            start_sep = Doc::nil();
            end_sep = Doc::nil();
        } else {
            let mut did_set_end_sep = false;
            if !hug_start && let Some(first @ Node::Text(..)) = self.children.first() {
                let last = self.children.last().unwrap_or(first);
                if is_text_starting_with_linebreak(first, 1)
                    && self.children.len() > 1
                    && (!is_inline || is_text_ending_with_whitespace(last))
                {
                    start_sep = Doc::hard_line();
                    end_sep = Doc::hard_line();
                    did_set_end_sep = true;
                } else if is_text_starting_with_whitespace(first)
                    && *sensitivity != WhitespaceSensitivity::Ignore
                {
                    start_sep = Doc::line_or_space();
                }
                trim_text_start(&mut children[0]);
            }
            if !hug_end && let Some(last @ Node::Text(..)) = self.children.last() {
                if !did_set_end_sep
                    && is_text_ending_with_whitespace(last)
                    && *sensitivity != WhitespaceSensitivity::Ignore
                {
                    end_sep = Doc::line_or_space();
                }
                if let Some(last) = children.last_mut() {
                    trim_text_end(last);
                }
            }
        }

        let child_state = State {
            in_pre,
            ..state.nested()
        };
        let is_block = is_block_tag(self, sensitivity);
        let mut print_body = |ctx: &mut Ctx<'_, 's, E, F>| {
            if is_empty {
                if is_inline
                    && self
                        .children
                        .first()
                        .is_some_and(is_text_starting_with_whitespace)
                {
                    Doc::line_or_space()
                } else if same_line {
                    Doc::line_or_nil()
                } else {
                    Doc::nil()
                }
            } else if in_pre {
                print_pre(&self.children, ctx, &child_state)
            } else if !is_supported {
                print_raw(&self.children, ctx.source)
            } else {
                Doc::list(print_children(
                    std::mem::take(&mut children),
                    is_block,
                    ctx,
                    &child_state,
                ))
            }
        };

        head.push(
            if (!hug_start || is_empty) && !same_line && !is_void_element(self.name) {
                Doc::line_or_nil().dedent()
            } else {
                Doc::nil()
            },
        );
        let opening = Doc::text("<")
            .append(Doc::text(self.name))
            .append(Doc::list(head).group().indent());
        let closing = format!("</{}", self.name);

        if !is_supported && !is_empty {
            let body = print_body(ctx);
            return opening
                .append(Doc::text(">"))
                .append(Doc::list(vec![Doc::hard_line(), body, Doc::hard_line()]).group())
                .append(Doc::text(closing + ">"))
                .group();
        }

        let can_omit = can_omit_softline_before_closing_tag(self, ctx, state);
        if hug_start && hug_end {
            let body = ctx.nested(|ctx| print_body(ctx));
            let hugged = Doc::list(vec![
                Doc::line_or_nil(),
                Doc::list(vec![Doc::text(">"), body, Doc::text(closing)]).group(),
            ]);
            return opening
                .append(if is_empty {
                    hugged.group()
                } else {
                    hugged.indent().group()
                })
                .append(if (is_empty && !same_line) || can_omit {
                    Doc::nil()
                } else {
                    Doc::line_or_nil()
                })
                .append(Doc::text(">"))
                .group();
        }

        if hug_start {
            let body = ctx.nested(|ctx| print_body(ctx));
            return opening
                .append(
                    Doc::list(vec![
                        Doc::line_or_nil(),
                        Doc::list(vec![Doc::text(">"), body]).group(),
                    ])
                    .indent(),
                )
                .append(end_sep)
                .append(Doc::text(closing + ">"))
                .group();
        }

        if hug_end {
            let body = ctx.nested(|ctx| print_body(ctx));
            return opening
                .append(Doc::text(">"))
                .append(
                    Doc::list(vec![
                        start_sep,
                        Doc::list(vec![body, Doc::text(closing)]).group(),
                    ])
                    .indent(),
                )
                .append(if can_omit {
                    Doc::nil()
                } else {
                    Doc::line_or_nil()
                })
                .append(Doc::text(">"))
                .group();
        }

        if is_empty {
            let body = print_body(ctx);
            return opening
                .append(Doc::text(">"))
                .append(body)
                .append(Doc::text(closing + ">"))
                .group();
        }

        let body = ctx.nested(|ctx| print_body(ctx));
        opening
            .append(Doc::text(">"))
            .append(Doc::list(vec![start_sep, body]).indent())
            .append(end_sep)
            .append(Doc::text(closing + ">"))
            .group()
    }
}

impl<'s> DocGen<'s> for ElseBlock<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        // Inside `{#each}` a nested `{#if}` keeps its own delimiters.
        if !state.in_each
            && let [Node::IfBlock(if_block)] = &self.children[..]
        {
            let mut docs = vec![
                Doc::text("{:else if "),
                block_expr_doc(ctx, &if_block.expression),
                Doc::text("}"),
                print_block_children(&if_block.children, ctx, &state.nested()),
            ];
            if let Some(else_block) = &if_block.else_block {
                docs.push(else_block.doc(ctx, &state.nested()));
            }
            return Doc::list(docs);
        }
        Doc::list(vec![
            Doc::text("{:else}"),
            print_block_children(&self.children, ctx, &state.nested()),
        ])
    }
}

impl<'s> DocGen<'s> for IfBlock<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        let state = state.nested();
        let mut docs = vec![
            Doc::text("{#if "),
            block_expr_doc(ctx, &self.expression),
            Doc::text("}"),
            print_block_children(&self.children, ctx, &state),
        ];
        if let Some(else_block) = &self.else_block {
            docs.push(else_block.doc(ctx, &state));
        }
        docs.push(Doc::text("{/if}"));
        Doc::list(vec![Doc::list(docs), Doc::break_parent()]).group()
    }
}

impl<'s> DocGen<'s> for KeyBlock<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        let docs = vec![
            Doc::text("{#key "),
            block_expr_doc(ctx, &self.expression),
            Doc::text("}"),
            print_block_children(&self.children, ctx, &state.nested()),
            Doc::text("{/key}"),
        ];
        Doc::list(vec![Doc::list(docs), Doc::break_parent()]).group()
    }
}

impl<'s> DocGen<'s> for NativeAttribute<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        match &self.value {
            AttrValue::True => Doc::text(self.name),
            AttrValue::Shorthand(..) => shorthand_attr_doc(ctx, self.name),
            AttrValue::Nodes(nodes) if is_shorthand_value(nodes, self.name) => {
                shorthand_attr_doc(ctx, self.name)
            }
            AttrValue::Nodes(nodes) => Doc::text(self.name)
                .append(Doc::text("="))
                .append(attr_value_doc(nodes, ctx, state)),
        }
    }
}

impl<'s> DocGen<'s> for Node<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        let directive = ctx.directive();
        if ctx.suppression.enter(self, directive) {
            return verbatim(ctx.source, self.span());
        }

        match self {
            Node::AwaitBlock(await_block) => await_block.doc(ctx, state),
            Node::Comment(comment) => comment.doc(ctx, state),
            Node::ConstTag(tag) => Doc::text("{@const ")
                .append(expr_doc(ctx, &tag.expression, ExprFlags::default(), false))
                .append(Doc::text("}")),
            Node::DebugTag(tag) => {
                let mut docs = vec![Doc::text("{@debug")];
                if !tag.identifiers.is_empty() {
                    docs.push(Doc::text(" "));
                    docs.extend(itertools::intersperse(
                        tag.identifiers
                            .iter()
                            .map(|identifier| Doc::text(identifier.raw.trim())),
                        Doc::text(", "),
                    ));
                }
                docs.push(Doc::text("}"));
                Doc::list(docs)
            }
            Node::EachBlock(each_block) => each_block.doc(ctx, state),
            Node::Element(element) => element.doc(ctx, state),
            Node::IfBlock(if_block) => if_block.doc(ctx, state),
            Node::KeyBlock(key_block) => key_block.doc(ctx, state),
            Node::MustacheTag(tag) => {
                let flags = ExprFlags {
                    force_single_quote: state.in_quoted_attr,
                    ..Default::default()
                };
                Doc::text("{")
                    .append(expr_doc(ctx, &tag.expression, flags, state.in_attr))
                    .append(Doc::text("}"))
            }
            Node::RawMustacheTag(tag) => Doc::text("{@html ")
                .append(expr_doc(ctx, &tag.expression, ExprFlags::default(), false))
                .append(Doc::text("}")),
            Node::Script(script) => print_script(script, false, ctx, state),
            Node::Style(style) => print_style(style, false, ctx, state),
            Node::Text(text_node) => text_node.doc(ctx, state),
        }
    }
}

impl<'s> DocGen<'s> for StyleDirective<'s> {
    fn doc<E, F>(&self, ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        let mut docs = vec![Doc::text("style:"), Doc::text(self.name)];
        docs.extend(modifiers_doc(&self.modifiers));
        match &self.value {
            AttrValue::True => {}
            AttrValue::Shorthand(..) => docs.push(shorthand_value_doc(ctx, self.name)),
            AttrValue::Nodes(nodes) if is_shorthand_value(nodes, self.name) => {
                docs.push(shorthand_value_doc(ctx, self.name));
            }
            AttrValue::Nodes(nodes) => {
                docs.push(Doc::text("="));
                docs.push(attr_value_doc(nodes, ctx, state));
            }
        }
        Doc::list(docs)
    }
}

impl<'s> DocGen<'s> for TextNode<'s> {
    fn doc<E, F>(&self, _: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
    where
        F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
    {
        if state.in_pre || state.in_attr {
            return Doc::list(match &self.raw {
                Cow::Borrowed(raw) => reflow_raw(*raw).collect(),
                Cow::Owned(raw) => reflow_raw_owned(raw).collect(),
            });
        }

        let raw = self.raw.as_ref();
        if is_whitespace_only(raw) {
            return match count_line_breaks(raw) {
                0 if raw.is_empty() => Doc::nil(),
                0 => Doc::line_or_space(),
                1 => Doc::hard_line(),
                _ => Doc::list(vec![Doc::hard_line(), Doc::hard_line()]),
            };
        }

        let words: Vec<Doc<'s>> = match &self.raw {
            Cow::Borrowed(raw) => split_words(*raw).map(Doc::text).collect(),
            Cow::Owned(raw) => split_words(raw)
                .map(|word| Doc::text(word.to_owned()))
                .collect(),
        };
        let mut docs = Vec::with_capacity(words.len() * 2 + 4);
        if starts_with_linebreak(raw, 2) {
            docs.push(Doc::hard_line());
        }
        if starts_with_linebreak(raw, 1) {
            docs.push(Doc::hard_line());
        } else if raw.starts_with(|c: char| c.is_ascii_whitespace()) {
            docs.push(Doc::line_or_space());
        }
        docs.extend(itertools::intersperse(words, Doc::line_or_space()));
        if ends_with_linebreak(raw, 1) {
            docs.push(Doc::hard_line());
        } else if raw.ends_with(|c: char| c.is_ascii_whitespace()) {
            docs.push(Doc::line_or_space());
        }
        if ends_with_linebreak(raw, 2) {
            docs.push(Doc::hard_line());
        }
        Doc::fill(docs)
    }
}

/// Renders `<svelte:body>`, `<svelte:document>` and `<svelte:options>`,
/// which never have children.
pub(crate) fn print_attrs_only_tag<'s, E, F>(
    element: &Element<'s>,
    ctx: &mut Ctx<'_, 's, E, F>,
    state: &State,
) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let same_line = ctx.options.closing_bracket_same_line;
    let attr_line = attr_line(ctx, element.attributes.len());
    let mut docs = attrs_doc(&element.attributes, attr_line, ctx, &state.nested());
    if !same_line {
        docs.push(Doc::line_or_space().dedent());
    }
    Doc::text("<")
        .append(Doc::text(element.name))
        .append(Doc::list(docs).group().indent())
        .append(Doc::text(if same_line { " />" } else { "/>" }))
        .group()
}

pub(crate) fn print_script<'s, E, F>(
    script: &Script<'s>,
    ignored: bool,
    ctx: &mut Ctx<'_, 's, E, F>,
    state: &State,
) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    print_embedded(Embedded::Script, &script.attributes, script.content, ignored, ctx, state)
}

pub(crate) fn print_style<'s, E, F>(
    style: &Style<'s>,
    ignored: bool,
    ctx: &mut Ctx<'_, 's, E, F>,
    state: &State,
) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    print_embedded(Embedded::Style, &style.attributes, style.content, ignored, ctx, state)
}

#[derive(Clone, Copy)]
enum Embedded {
    Script,
    Style,
}

fn print_embedded<'s, E, F>(
    kind: Embedded,
    attributes: &[Attribute<'s>],
    content: &'s str,
    ignored: bool,
    ctx: &mut Ctx<'_, 's, E, F>,
    state: &State,
) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let tag = match kind {
        Embedded::Script => "script",
        Embedded::Style => "style",
    };
    let attr_line = attr_line(ctx, attributes.len());
    let mut attrs = attrs_doc(attributes, attr_line, ctx, &state.nested());
    if !ctx.options.closing_bracket_same_line {
        attrs.push(Doc::line_or_nil().dedent());
    }
    let opening = Doc::text("<")
        .append(Doc::text(tag))
        .append(Doc::list(attrs).group().indent())
        .append(Doc::text(">"))
        .group();

    let body = if ignored || !is_supported_language(attributes) {
        preformatted_body(content)
    } else if content.trim().is_empty() {
        if content.is_empty() {
            Doc::nil()
        } else {
            Doc::hard_line()
        }
    } else {
        let (formatted, indent) = match kind {
            Embedded::Script => {
                let ext = script_ext(lang_of(attributes));
                (ctx.format_script(content, ext), ctx.options.script_indent)
            }
            Embedded::Style => (
                ctx.format_style(content, lang_of(attributes).unwrap_or("css")),
                ctx.options.style_indent,
            ),
        };
        let doc = Doc::hard_line().concat(reflow_with_indent(formatted.trim()));
        if indent { doc.indent() } else { doc }.append(Doc::hard_line())
    };

    Doc::list(vec![opening, body, Doc::text(format!("</{tag}>"))]).group()
}

pub(crate) fn script_ext(lang: Option<&str>) -> &str {
    match lang {
        Some("ts" | "typescript") => "ts",
        Some("js" | "javascript" | "babel") | None => "js",
        Some(lang) => lang,
    }
}

/// Code printed as-is, starting at the very beginning of a line.
fn preformatted_body(content: &str) -> Doc<'_> {
    let content = content.trim_start_matches(['\t', '\x0C', '\r', ' ']);
    let content = content.strip_prefix('\n').unwrap_or(content);
    let trimmed = content.trim_end_matches(['\t', '\x0C', '\r', ' ']);
    let content = trimmed.strip_suffix('\n').unwrap_or(content);
    let content = content.strip_suffix('\r').unwrap_or(content);
    Doc::literal_line()
        .concat(reflow_raw(content))
        .append(Doc::hard_line())
}

pub(crate) fn comment_doc<'s>(comment: &Comment<'s>) -> Doc<'s> {
    Doc::text("<!--")
        .concat(reflow_raw(comment.data))
        .append(Doc::text("-->"))
}

fn verbatim(source: &str, span: Span) -> Doc<'_> {
    Doc::list(
        reflow_raw(source.get(span.start..span.end).unwrap_or_default()).collect(),
    )
}

/// Content of `<pre>`: text comes straight from the source.
fn print_pre<'s, E, F>(children: &[Node<'s>], ctx: &mut Ctx<'_, 's, E, F>, state: &State) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let outer = ctx.suppression.enter_siblings();
    let mut docs = Vec::with_capacity(children.len());
    for child in children {
        if let Node::Text(text) = child {
            let source = ctx.source;
            docs.extend(reflow_raw(
                source.get(text.span.start..text.span.end).unwrap_or_default(),
            ));
        } else {
            docs.push(child.doc(ctx, state));
        }
    }
    ctx.suppression.leave_siblings(outer);
    Doc::list(docs)
}

/// Content of an element in a foreign language, without its edge line breaks.
fn print_raw<'s>(children: &[Node<'s>], source: &'s str) -> Doc<'s> {
    let (Some(first), Some(last)) = (children.first(), children.last()) else {
        return Doc::nil();
    };
    let raw = source
        .get(first.span().start..last.span().end)
        .unwrap_or_default();
    let raw = raw
        .strip_prefix("\r\n")
        .or_else(|| raw.strip_prefix('\n'))
        .unwrap_or(raw);
    let raw = raw
        .strip_suffix("\r\n")
        .or_else(|| raw.strip_suffix('\n'))
        .unwrap_or(raw);
    Doc::list(reflow_raw(raw).collect())
}

fn should_hug_start(element: &Element, is_supported: bool, sensitivity: &WhitespaceSensitivity) -> bool {
    should_hug(element, is_supported, sensitivity, element.children.first(), is_text_starting_with_whitespace)
}

fn should_hug_end(element: &Element, is_supported: bool, sensitivity: &WhitespaceSensitivity) -> bool {
    should_hug(element, is_supported, sensitivity, element.children.last(), is_text_ending_with_whitespace)
}

fn should_hug(
    element: &Element,
    is_supported: bool,
    sensitivity: &WhitespaceSensitivity,
    edge: Option<&Node>,
    has_whitespace: fn(&Node) -> bool,
) -> bool {
    if !is_supported {
        return false;
    }
    if let [Node::MustacheTag(..)] = &element.children[..] {
        return true;
    }
    if is_block_tag(element, sensitivity) {
        return false;
    }
    let Some(edge) = edge else {
        return true;
    };
    if element.kind == ElementKind::Element && is_always_hug_tag(element.name) {
        return true;
    }
    if *sensitivity == WhitespaceSensitivity::Ignore {
        return false;
    }
    !has_whitespace(edge)
}

fn can_omit_softline_before_closing_tag<E, F>(
    element: &Element,
    ctx: &Ctx<'_, '_, E, F>,
    state: &State,
) -> bool
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let hugs_next_node = ctx
        .source
        .get(element.span.end..)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| !c.is_whitespace());
    ctx.options.closing_bracket_same_line && (!hugs_next_node || state.is_last_in_block)
}

fn attr_line<E, F>(ctx: &Ctx<'_, '_, E, F>, count: usize) -> Doc<'static>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    if ctx.options.single_attribute_per_line && count > 1 {
        Doc::hard_line()
    } else {
        Doc::line_or_space()
    }
}

fn attrs_doc<'s, E, F>(
    attributes: &[Attribute<'s>],
    attr_line: Doc<'s>,
    ctx: &mut Ctx<'_, 's, E, F>,
    state: &State,
) -> Vec<Doc<'s>>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    attributes
        .iter()
        .flat_map(|attr| [attr_line.clone(), attr.doc(ctx, state)])
        .collect()
}

fn this_binding_doc<'s, E, F>(
    element: &Element<'s>,
    ctx: &mut Ctx<'_, 's, E, F>,
    attr_line: Doc<'s>,
) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let value = match (element.kind, &element.expression, &element.tag) {
        (ElementKind::InlineComponent, Some(expr), _)
        | (ElementKind::Element, _, Some(TagName::Expr(expr))) => attr_expr_doc(ctx, expr),
        (ElementKind::Element, _, Some(TagName::Literal(tag))) => Doc::text("\"")
            .append(Doc::text(*tag))
            .append(Doc::text("\"")),
        _ => return Doc::nil(),
    };
    Doc::list(vec![attr_line, Doc::text("this="), value])
}

fn modifiers_doc<'a, 's>(modifiers: &'a [&'s str]) -> impl Iterator<Item = Doc<'s>> + 'a {
    modifiers
        .iter()
        .flat_map(|modifier| [Doc::text("|"), Doc::text(*modifier)])
}

/// `{foo}` as the whole value of an attribute named `foo`.
fn is_shorthand_value(nodes: &[Node], name: &str) -> bool {
    matches!(nodes, [Node::MustacheTag(tag)] if tag.expression.as_identifier() == Some(name))
}

fn shorthand_attr_doc<'s, E, F>(ctx: &Ctx<'_, 's, E, F>, name: &'s str) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    if ctx.is_strict() {
        Doc::list(vec![Doc::text(name), Doc::text("=\"{"), Doc::text(name), Doc::text("}\"")])
    } else if ctx.options.svelte_attr_shorthand {
        Doc::list(vec![Doc::text("{"), Doc::text(name), Doc::text("}")])
    } else {
        Doc::list(vec![Doc::text(name), Doc::text("={"), Doc::text(name), Doc::text("}")])
    }
}

/// Value part of a directive whose expression repeats its name.
fn shorthand_value_doc<'s, E, F>(ctx: &Ctx<'_, 's, E, F>, name: &'s str) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    if ctx.is_strict() {
        Doc::list(vec![Doc::text("=\"{"), Doc::text(name), Doc::text("}\"")])
    } else if ctx.options.svelte_attr_shorthand {
        Doc::nil()
    } else {
        Doc::list(vec![Doc::text("={"), Doc::text(name), Doc::text("}")])
    }
}

fn attr_value_doc<'s, E, F>(
    nodes: &[Node<'s>],
    ctx: &mut Ctx<'_, 's, E, F>,
    state: &State,
) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let quoted = !matches!(nodes, [Node::MustacheTag(..)]) || ctx.is_strict();
    let value_state = State {
        in_attr: true,
        in_quoted_attr: quoted,
        ..state.nested()
    };
    let outer = ctx.suppression.enter_siblings();
    let value = Doc::list(nodes.iter().map(|node| node.doc(ctx, &value_state)).collect());
    ctx.suppression.leave_siblings(outer);
    if quoted {
        let quote = if nodes
            .iter()
            .any(|node| helpers::text_of(node).is_some_and(|text| text.contains('"')))
        {
            "'"
        } else {
            "\""
        };
        Doc::text(quote).append(value).append(Doc::text(quote))
    } else {
        value
    }
}

fn expr_doc<'s, E, F>(
    ctx: &mut Ctx<'_, 's, E, F>,
    expr: &Expression<'s>,
    flags: ExprFlags,
    attr: bool,
) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let formatted = ctx.format_expr(expr.raw, flags, attr);
    Doc::list(reflow_with_indent(&formatted).collect())
}

/// Expression of a directive or `this`, with braces.
fn attr_expr_doc<'s, E, F>(ctx: &mut Ctx<'_, 's, E, F>, expr: &Expression<'s>) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let (open, close) = if ctx.is_strict() {
        ("\"{", "}\"")
    } else {
        ("{", "}")
    };
    let flags = ExprFlags {
        remove_parens: true,
        ..Default::default()
    };
    Doc::text(open)
        .append(expr_doc(ctx, expr, flags, true))
        .append(Doc::text(close))
}

fn block_expr_doc<'s, E, F>(ctx: &mut Ctx<'_, 's, E, F>, expr: &Expression<'s>) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    let flags = ExprFlags {
        force_single_line: true,
        ..Default::default()
    };
    expr_doc(ctx, expr, flags, false)
}

/// Binding pattern with its leading space, or nothing.
fn binding_doc<'s, E, F>(ctx: &mut Ctx<'_, 's, E, F>, pattern: Option<&Expression<'s>>) -> Doc<'s>
where
    F: for<'a> FnMut(&'a str, Hints) -> Result<Cow<'a, str>, E>,
{
    match pattern {
        Some(pattern) if !pattern.raw.trim().is_empty() => {
            Doc::text(" ").append(Doc::text(ctx.format_binding(pattern.raw)))
        }
        _ => Doc::nil(),
    }
}

fn has_content(children: &[Node]) -> bool {
    children.iter().any(|child| !is_empty_text(child))
}

fn split_words(s: &str) -> impl Iterator<Item = &str> {
    s.split(['\t', '\n', '\x0C', '\r', ' '])
        .filter(|word| !word.is_empty())
}

fn reflow_raw(s: &str) -> impl Iterator<Item = Doc<'_>> {
    itertools::intersperse(
        s.split('\n')
            .map(|s| Doc::text(s.strip_suffix('\r').unwrap_or(s))),
        Doc::literal_line(),
    )
}

fn reflow_raw_owned(s: &str) -> impl Iterator<Item = Doc<'static>> + '_ {
    itertools::intersperse(
        s.split('\n')
            .map(|s| Doc::text(s.strip_suffix('\r').unwrap_or(s).to_owned())),
        Doc::literal_line(),
    )
}

/// Lines of formatted code, re-indented at the current level.
/// Blank lines carry no text so they stay free of indentation.
fn reflow_with_indent(s: &str) -> impl Iterator<Item = Doc<'static>> + '_ {
    s.split('\n').enumerate().flat_map(|(i, line)| {
        let line = line.strip_suffix('\r').unwrap_or(line);
        [
            if i == 0 { Doc::nil() } else { Doc::hard_line() },
            if line.is_empty() {
                Doc::nil()
            } else {
                Doc::text(line.to_owned())
            },
        ]
    })
}
