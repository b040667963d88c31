//! Syntax tree consumed by the printer.
//!
//! Trees are built by an external parser. Every node keeps the byte range it
//! occupies in the original source, which is used for verbatim fallbacks
//! and adjacency checks.

use std::borrow::Cow;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Clone, Debug)]
pub enum Attribute<'s> {
    Attribute(NativeAttribute<'s>),
    Directive(Directive<'s>),
    Spread(Spread<'s>),
    StyleDirective(StyleDirective<'s>),
}

impl Attribute<'_> {
    pub fn span(&self) -> Span {
        match self {
            Attribute::Attribute(attr) => attr.span,
            Attribute::Directive(directive) => directive.span,
            Attribute::Spread(spread) => spread.span,
            Attribute::StyleDirective(directive) => directive.span,
        }
    }
}

#[derive(Clone, Debug)]
pub enum AttrValue<'s> {
    /// Valueless attribute, such as `disabled`.
    True,
    /// `{name}` written without the attribute name.
    Shorthand(Expression<'s>),
    /// Sequence of [`Node::Text`] and [`Node::MustacheTag`].
    Nodes(Vec<Node<'s>>),
}

#[derive(Clone, Debug)]
pub struct AwaitBlock<'s> {
    pub expression: Expression<'s>,
    pub value: Option<Expression<'s>>,
    pub error: Option<Expression<'s>>,
    pub pending: BlockBody<'s>,
    pub then: BlockBody<'s>,
    pub catch: BlockBody<'s>,
    pub span: Span,
}

/// Child container of `{:then}`, `{:catch}` and the pending part of `{#await}`.
#[derive(Clone, Debug)]
pub struct BlockBody<'s> {
    pub children: Vec<Node<'s>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Comment<'s> {
    pub data: &'s str,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct DebugTag<'s> {
    pub identifiers: Vec<Expression<'s>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Directive<'s> {
    pub kind: DirectiveKind,
    pub name: &'s str,
    pub modifiers: Vec<&'s str>,
    pub expression: Option<Expression<'s>>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectiveKind {
    Action,
    Animation,
    Binding,
    Class,
    EventHandler,
    Let,
    Transition { intro: bool, outro: bool },
}

#[derive(Clone, Debug)]
pub struct EachBlock<'s> {
    pub expression: Expression<'s>,
    pub context: Expression<'s>,
    pub index: Option<&'s str>,
    pub key: Option<Expression<'s>>,
    pub children: Vec<Node<'s>>,
    pub else_block: Option<ElseBlock<'s>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Element<'s> {
    pub kind: ElementKind,
    pub name: &'s str,
    pub attributes: Vec<Attribute<'s>>,
    pub children: Vec<Node<'s>>,
    /// `this={...}` of `svelte:component`.
    pub expression: Option<Expression<'s>>,
    /// `this` of `svelte:element`.
    pub tag: Option<TagName<'s>>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Body,
    Document,
    Element,
    Head,
    InlineComponent,
    Options,
    Slot,
    SlotTemplate,
    Title,
    Window,
}

#[derive(Clone, Debug)]
pub struct ElseBlock<'s> {
    pub children: Vec<Node<'s>>,
    pub span: Span,
}

/// Embedded script code, kept as the source slice it was parsed from.
#[derive(Clone, Copy, Debug)]
pub struct Expression<'s> {
    pub raw: &'s str,
    pub span: Span,
}

impl<'s> Expression<'s> {
    /// Returns the identifier name if the expression is nothing but an identifier.
    pub fn as_identifier(&self) -> Option<&'s str> {
        let trimmed = self.raw.trim();
        let mut chars = trimmed.chars();
        let first = chars.next()?;
        if (first.is_alphabetic() || first == '_' || first == '$')
            && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            Some(trimmed)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug)]
pub struct Fragment<'s> {
    pub children: Vec<Node<'s>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct IfBlock<'s> {
    pub expression: Expression<'s>,
    pub children: Vec<Node<'s>>,
    pub else_block: Option<ElseBlock<'s>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct KeyBlock<'s> {
    pub expression: Expression<'s>,
    pub children: Vec<Node<'s>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct MustacheTag<'s> {
    pub expression: Expression<'s>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct NativeAttribute<'s> {
    pub name: &'s str,
    pub value: AttrValue<'s>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Node<'s> {
    AwaitBlock(Box<AwaitBlock<'s>>),
    Comment(Comment<'s>),
    ConstTag(MustacheTag<'s>),
    DebugTag(DebugTag<'s>),
    EachBlock(EachBlock<'s>),
    Element(Element<'s>),
    IfBlock(IfBlock<'s>),
    KeyBlock(KeyBlock<'s>),
    MustacheTag(MustacheTag<'s>),
    RawMustacheTag(MustacheTag<'s>),
    /// Only present among markup children when sections keep their source order.
    Script(Script<'s>),
    /// Only present among markup children when sections keep their source order.
    Style(Style<'s>),
    Text(TextNode<'s>),
}

impl Node<'_> {
    pub fn span(&self) -> Span {
        match self {
            Node::AwaitBlock(block) => block.span,
            Node::Comment(comment) => comment.span,
            Node::ConstTag(tag) | Node::MustacheTag(tag) | Node::RawMustacheTag(tag) => tag.span,
            Node::DebugTag(tag) => tag.span,
            Node::EachBlock(block) => block.span,
            Node::Element(element) => element.span,
            Node::IfBlock(block) => block.span,
            Node::KeyBlock(block) => block.span,
            Node::Script(script) => script.span,
            Node::Style(style) => style.span,
            Node::Text(text) => text.span,
        }
    }
}

/// A whole component: the markup fragment plus the sections cut out of it.
#[derive(Clone, Debug)]
pub struct Root<'s> {
    pub html: Fragment<'s>,
    pub module: Option<Script<'s>>,
    pub instance: Option<Script<'s>>,
    pub css: Option<Style<'s>>,
}

#[derive(Clone, Debug)]
pub struct Script<'s> {
    pub attributes: Vec<Attribute<'s>>,
    pub content: &'s str,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Spread<'s> {
    pub expression: Expression<'s>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Style<'s> {
    pub attributes: Vec<Attribute<'s>>,
    pub content: &'s str,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct StyleDirective<'s> {
    pub name: &'s str,
    pub modifiers: Vec<&'s str>,
    pub value: AttrValue<'s>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum TagName<'s> {
    Literal(&'s str),
    Expr(Expression<'s>),
}

#[derive(Clone, Debug)]
pub struct TextNode<'s> {
    pub raw: Cow<'s, str>,
    pub span: Span,
}
