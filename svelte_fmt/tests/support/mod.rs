//! Minimal Svelte parser for building trees from test fixtures.
//!
//! It only understands what the fixtures use and reports anything else as an error.
//! Scripts and styles at the top level are cut out of the markup,
//! leaving the text around them as separate nodes.

#![allow(dead_code)]

use anyhow::{Result, bail};
use std::borrow::Cow;
use svelte_fmt::ast::*;

pub fn parse(source: &str) -> Result<Root<'_>> {
    let mut parser = Parser {
        source,
        pos: 0,
        in_head: false,
        module: None,
        instance: None,
        css: None,
    };
    let children = parser.parse_children(true)?;
    if parser.pos < source.len() {
        bail!("unexpected `{}` at {}", parser.rest().lines().next().unwrap_or_default(), parser.pos);
    }
    Ok(Root {
        html: Fragment {
            children,
            span: Span::new(0, source.len()),
        },
        module: parser.module,
        instance: parser.instance,
        css: parser.css,
    })
}

/// External formatter that leaves code alone apart from removing common indentation,
/// as a real formatter would before the code is re-indented.
pub fn identity<'a>(code: &'a str, _: svelte_fmt::Hints) -> Result<Cow<'a, str>, ()> {
    Ok(dedent(code))
}

pub fn dedent(code: &str) -> Cow<'_, str> {
    let indent = code
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or_default();
    if indent == 0 {
        return code.into();
    }
    code.lines()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
        .into()
}

struct Parser<'s> {
    source: &'s str,
    pos: usize,
    in_head: bool,
    module: Option<Script<'s>>,
    instance: Option<Script<'s>>,
    css: Option<Style<'s>>,
}

impl<'s> Parser<'s> {
    fn rest(&self) -> &'s str {
        let source = self.source;
        &source[self.pos..]
    }

    fn slice(&self, start: usize, end: usize) -> &'s str {
        let source = self.source;
        &source[start..end]
    }

    fn peek(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.peek(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, s: &str) -> Result<()> {
        if self.eat(s) {
            Ok(())
        } else {
            bail!("expected `{s}` at {}", self.pos)
        }
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'s str {
        let rest = self.rest();
        let len = rest.find(|c| !f(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn parse_children(&mut self, top_level: bool) -> Result<Vec<Node<'s>>> {
        let mut children = vec![];
        while self.pos < self.source.len()
            && !self.peek("</")
            && !self.peek("{:")
            && !self.peek("{/")
        {
            if let Some(node) = self.parse_node(top_level)? {
                children.push(node);
            }
        }
        Ok(children)
    }

    fn parse_node(&mut self, top_level: bool) -> Result<Option<Node<'s>>> {
        let start = self.pos;
        let node = if self.eat("<!--") {
            let Some(len) = self.rest().find("-->") else {
                bail!("unclosed comment at {start}");
            };
            let data = self.slice(self.pos, self.pos + len);
            self.pos += len + 3;
            Node::Comment(Comment {
                data,
                span: Span::new(start, self.pos),
            })
        } else if self.peek("<") {
            return self.parse_element(top_level);
        } else if self.eat("{#if") {
            Node::IfBlock(self.parse_if(start, false)?)
        } else if self.eat("{#each") {
            Node::EachBlock(self.parse_each(start)?)
        } else if self.eat("{#await") {
            Node::AwaitBlock(Box::new(self.parse_await(start)?))
        } else if self.eat("{#key") {
            let expression = self.parse_expression()?;
            let children = self.parse_children(false)?;
            self.expect("{/key}")?;
            Node::KeyBlock(KeyBlock {
                expression,
                children,
                span: Span::new(start, self.pos),
            })
        } else if self.eat("{@html") {
            let expression = self.parse_expression()?;
            Node::RawMustacheTag(MustacheTag {
                expression,
                span: Span::new(start, self.pos),
            })
        } else if self.eat("{@const") {
            let expression = self.parse_expression()?;
            Node::ConstTag(MustacheTag {
                expression,
                span: Span::new(start, self.pos),
            })
        } else if self.eat("{@debug") {
            let expression = self.parse_expression()?;
            let mut identifiers = vec![];
            if !expression.raw.is_empty() {
                let mut offset = expression.span.start;
                for part in expression.raw.split(',') {
                    identifiers.push(self.expression_at(offset, offset + part.len()));
                    offset += part.len() + 1;
                }
            }
            Node::DebugTag(DebugTag {
                identifiers,
                span: Span::new(start, self.pos),
            })
        } else if self.eat("{") {
            let expression = self.parse_expression()?;
            Node::MustacheTag(MustacheTag {
                expression,
                span: Span::new(start, self.pos),
            })
        } else {
            let raw = self.take_while(|c| c != '<' && c != '{');
            Node::Text(TextNode {
                raw: Cow::Borrowed(raw),
                span: Span::new(start, self.pos),
            })
        };
        Ok(Some(node))
    }

    fn parse_element(&mut self, top_level: bool) -> Result<Option<Node<'s>>> {
        let start = self.pos;
        self.expect("<")?;
        let name = self.take_while(|c| !c.is_ascii_whitespace() && c != '/' && c != '>');
        if name.is_empty() {
            bail!("expected tag name at {}", self.pos);
        }

        let mut attributes = vec![];
        let self_closing = loop {
            self.skip_ws();
            if self.eat("/>") {
                break true;
            }
            if self.eat(">") {
                break false;
            }
            if self.pos >= self.source.len() {
                bail!("unclosed tag `{name}` at {start}");
            }
            attributes.push(self.parse_attribute()?);
        };

        if matches!(name, "script" | "style") {
            if !top_level {
                bail!("`<{name}>` must be at the top level, found at {start}");
            }
            let content = if self_closing {
                ""
            } else {
                let close = format!("</{name}>");
                let Some(len) = self.rest().find(&close) else {
                    bail!("unclosed `<{name}>` at {start}");
                };
                let content = self.slice(self.pos, self.pos + len);
                self.pos += len + close.len();
                content
            };
            let span = Span::new(start, self.pos);
            if name == "style" {
                self.css = Some(Style {
                    attributes,
                    content,
                    span,
                });
            } else {
                let is_module = attributes.iter().any(|attr| match attr {
                    Attribute::Attribute(attr) => {
                        attr.name == "module"
                            || attr.name == "context"
                                && matches!(&attr.value, AttrValue::Nodes(nodes)
                                    if matches!(&nodes[..], [Node::Text(text)] if text.raw == "module"))
                    }
                    _ => false,
                });
                let script = Script {
                    attributes,
                    content,
                    span,
                };
                if is_module {
                    self.module = Some(script);
                } else {
                    self.instance = Some(script);
                }
            }
            return Ok(None);
        }

        let kind = match name {
            "svelte:body" => ElementKind::Body,
            "svelte:document" => ElementKind::Document,
            "svelte:head" => ElementKind::Head,
            "svelte:options" => ElementKind::Options,
            "svelte:window" => ElementKind::Window,
            "svelte:component" | "svelte:self" => ElementKind::InlineComponent,
            "svelte:fragment" => ElementKind::SlotTemplate,
            "slot" => ElementKind::Slot,
            "title" if self.in_head => ElementKind::Title,
            _ if name.starts_with(|c: char| c.is_ascii_uppercase()) || name.contains('.') => {
                ElementKind::InlineComponent
            }
            _ => ElementKind::Element,
        };

        let is_void = name.starts_with('!')
            || matches!(
                &*name.to_ascii_lowercase(),
                "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link"
                    | "meta" | "param" | "source" | "track" | "wbr"
            );
        let children = if self_closing || is_void {
            vec![]
        } else {
            let in_head = self.in_head;
            self.in_head = kind == ElementKind::Head;
            let children = self.parse_children(false)?;
            self.in_head = in_head;
            self.expect("</")?;
            self.expect(name)?;
            self.skip_ws();
            self.expect(">")?;
            children
        };

        let mut expression = None;
        let mut tag = None;
        if matches!(name, "svelte:component" | "svelte:element")
            && let Some(index) = attributes.iter().position(
                |attr| matches!(attr, Attribute::Attribute(attr) if attr.name == "this"),
            )
            && let Attribute::Attribute(this) = attributes.remove(index)
        {
            match (name, this.value) {
                ("svelte:component", AttrValue::Nodes(nodes)) => match &nodes[..] {
                    [Node::MustacheTag(mustache)] => expression = Some(mustache.expression),
                    _ => bail!("`this` of `svelte:component` must be an expression"),
                },
                ("svelte:element", AttrValue::Nodes(nodes)) => match &nodes[..] {
                    [Node::MustacheTag(mustache)] => {
                        tag = Some(TagName::Expr(mustache.expression));
                    }
                    [Node::Text(TextNode {
                        raw: Cow::Borrowed(raw),
                        ..
                    })] => tag = Some(TagName::Literal(*raw)),
                    _ => bail!("unsupported `this` of `svelte:element`"),
                },
                _ => bail!("`this` needs a value"),
            }
        }

        Ok(Some(Node::Element(Element {
            kind,
            name,
            attributes,
            children,
            expression,
            tag,
            span: Span::new(start, self.pos),
        })))
    }

    fn parse_attribute(&mut self) -> Result<Attribute<'s>> {
        let start = self.pos;
        if self.eat("{") {
            self.skip_ws();
            if self.eat("...") {
                let expression = self.parse_expression()?;
                return Ok(Attribute::Spread(Spread {
                    expression,
                    span: Span::new(start, self.pos),
                }));
            }
            let expression = self.parse_expression()?;
            return Ok(Attribute::Attribute(NativeAttribute {
                name: expression.raw,
                value: AttrValue::Shorthand(expression),
                span: Span::new(start, self.pos),
            }));
        }

        let name = self.take_while(|c| {
            !c.is_ascii_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\'')
        });
        if name.is_empty() {
            bail!("expected attribute name at {}", self.pos);
        }
        let value = if self.eat("=") {
            self.parse_attr_value()?
        } else {
            AttrValue::True
        };
        let span = Span::new(start, self.pos);

        let Some((prefix, rest)) = name.split_once(':') else {
            return Ok(Attribute::Attribute(NativeAttribute { name, value, span }));
        };
        let mut parts = rest.split('|');
        let directive_name = parts.next().unwrap_or_default();
        let modifiers = parts.collect();
        let kind = match prefix {
            "use" => DirectiveKind::Action,
            "animate" => DirectiveKind::Animation,
            "bind" => DirectiveKind::Binding,
            "class" => DirectiveKind::Class,
            "on" => DirectiveKind::EventHandler,
            "let" => DirectiveKind::Let,
            "transition" => DirectiveKind::Transition {
                intro: true,
                outro: true,
            },
            "in" => DirectiveKind::Transition {
                intro: true,
                outro: false,
            },
            "out" => DirectiveKind::Transition {
                intro: false,
                outro: true,
            },
            "style" => {
                return Ok(Attribute::StyleDirective(StyleDirective {
                    name: directive_name,
                    modifiers,
                    value,
                    span,
                }));
            }
            _ => return Ok(Attribute::Attribute(NativeAttribute { name, value, span })),
        };
        let expression = match value {
            AttrValue::Nodes(nodes) => match &nodes[..] {
                [Node::MustacheTag(mustache)] => Some(mustache.expression),
                _ => bail!("value of `{name}` must be an expression"),
            },
            // `bind:value` and `class:active` refer to the variable of the same name.
            _ if matches!(kind, DirectiveKind::Binding | DirectiveKind::Class) => {
                let name_start = start + prefix.len() + 1;
                Some(Expression {
                    raw: directive_name,
                    span: Span::new(name_start, name_start + directive_name.len()),
                })
            }
            _ => None,
        };
        Ok(Attribute::Directive(Directive {
            kind,
            name: directive_name,
            modifiers,
            expression,
            span,
        }))
    }

    fn parse_attr_value(&mut self) -> Result<AttrValue<'s>> {
        let quote = self.rest().chars().next().filter(|c| matches!(c, '"' | '\''));
        if let Some(quote) = quote {
            self.pos += 1;
            let mut nodes = vec![];
            loop {
                let start = self.pos;
                if self.rest().starts_with(quote) {
                    self.pos += 1;
                    break;
                }
                if self.pos >= self.source.len() {
                    bail!("unclosed attribute value");
                }
                if self.eat("{") {
                    let expression = self.parse_expression()?;
                    nodes.push(Node::MustacheTag(MustacheTag {
                        expression,
                        span: Span::new(start, self.pos),
                    }));
                } else {
                    let raw = self.take_while(|c| c != quote && c != '{');
                    nodes.push(Node::Text(TextNode {
                        raw: Cow::Borrowed(raw),
                        span: Span::new(start, self.pos),
                    }));
                }
            }
            Ok(AttrValue::Nodes(nodes))
        } else if self.peek("{") {
            let start = self.pos;
            self.pos += 1;
            let expression = self.parse_expression()?;
            Ok(AttrValue::Nodes(vec![Node::MustacheTag(MustacheTag {
                expression,
                span: Span::new(start, self.pos),
            })]))
        } else {
            let start = self.pos;
            let raw = self.take_while(|c| !c.is_ascii_whitespace() && c != '>');
            if raw.is_empty() {
                bail!("expected attribute value at {start}");
            }
            Ok(AttrValue::Nodes(vec![Node::Text(TextNode {
                raw: Cow::Borrowed(raw),
                span: Span::new(start, self.pos),
            })]))
        }
    }

    fn parse_if(&mut self, start: usize, elseif: bool) -> Result<IfBlock<'s>> {
        let expression = self.parse_expression()?;
        let children = self.parse_children(false)?;
        let else_block = if self.peek("{:else") {
            let else_start = self.pos;
            self.pos += "{:else".len();
            self.skip_ws();
            if self.eat("if ") {
                let nested = self.parse_if(else_start, true)?;
                Some(ElseBlock {
                    span: nested.span,
                    children: vec![Node::IfBlock(nested)],
                })
            } else {
                self.expect("}")?;
                let children = self.parse_children(false)?;
                Some(ElseBlock {
                    children,
                    span: Span::new(else_start, self.pos),
                })
            }
        } else {
            None
        };
        // The outermost block of an else-if chain owns `{/if}`.
        if !elseif {
            self.expect("{/if}")?;
        }
        Ok(IfBlock {
            expression,
            children,
            else_block,
            span: Span::new(start, self.pos),
        })
    }

    fn parse_each(&mut self, start: usize) -> Result<EachBlock<'s>> {
        let header_start = self.pos;
        let header_end = self.find_closing_brace()?;
        let header = self.slice(header_start, header_end);
        self.pos = header_end + 1;

        let Some(&as_pos) = top_level_matches(header, " as ").first() else {
            bail!("expected `as` in `{{#each}}` at {start}");
        };
        let expression = self.expression_at(header_start, header_start + as_pos);
        let rest_start = header_start + as_pos + " as ".len();
        let mut rest_end = header_end;
        let rest = self.slice(rest_start, rest_end);
        let mut key = None;
        if rest.trim_end().ends_with(')')
            && let Some(&open) = top_level_matches(rest, "(").last()
        {
            key = Some(self.expression_at(rest_start + open + 1, rest_start + rest.trim_end().len() - 1));
            rest_end = rest_start + open;
        }
        let rest = self.slice(rest_start, rest_end);
        let (context, index) = match top_level_matches(rest, ",").first() {
            Some(&comma) => (
                self.expression_at(rest_start, rest_start + comma),
                Some(rest[comma + 1..].trim()),
            ),
            None => (self.expression_at(rest_start, rest_end), None),
        };

        let children = self.parse_children(false)?;
        let else_block = if self.peek("{:else") {
            let else_start = self.pos;
            self.pos += "{:else".len();
            self.skip_ws();
            self.expect("}")?;
            let children = self.parse_children(false)?;
            Some(ElseBlock {
                children,
                span: Span::new(else_start, self.pos),
            })
        } else {
            None
        };
        self.expect("{/each}")?;
        Ok(EachBlock {
            expression,
            context,
            index,
            key,
            children,
            else_block,
            span: Span::new(start, self.pos),
        })
    }

    fn parse_await(&mut self, start: usize) -> Result<AwaitBlock<'s>> {
        let header_start = self.pos;
        let header_end = self.find_closing_brace()?;
        let header = self.slice(header_start, header_end);
        self.pos = header_end + 1;

        let keyword = |keyword: &str| {
            top_level_matches(header, keyword).into_iter().find(|&i| {
                header[i + keyword.len()..]
                    .chars()
                    .next()
                    .is_none_or(char::is_whitespace)
            })
        };
        let empty = |pos| BlockBody {
            children: vec![],
            span: Span::new(pos, pos),
        };

        let mut value = None;
        let mut error = None;
        let mut pending = empty(self.pos);
        let mut then = empty(self.pos);
        let mut catch = empty(self.pos);
        let expression = if let Some(pos) = keyword(" then") {
            value = self.binding_at(header_start + pos + " then".len(), header_end);
            then = self.parse_body()?;
            self.expression_at(header_start, header_start + pos)
        } else if let Some(pos) = keyword(" catch") {
            error = self.binding_at(header_start + pos + " catch".len(), header_end);
            catch = self.parse_body()?;
            self.expression_at(header_start, header_start + pos)
        } else {
            pending = self.parse_body()?;
            self.expression_at(header_start, header_end)
        };

        loop {
            if self.eat("{:then") {
                let binding = self.parse_expression()?;
                value = (!binding.raw.is_empty()).then_some(binding);
                then = self.parse_body()?;
            } else if self.eat("{:catch") {
                let binding = self.parse_expression()?;
                error = (!binding.raw.is_empty()).then_some(binding);
                catch = self.parse_body()?;
            } else {
                break;
            }
        }
        self.expect("{/await}")?;

        Ok(AwaitBlock {
            expression,
            value,
            error,
            pending,
            then,
            catch,
            span: Span::new(start, self.pos),
        })
    }

    fn parse_body(&mut self) -> Result<BlockBody<'s>> {
        let start = self.pos;
        let children = self.parse_children(false)?;
        Ok(BlockBody {
            children,
            span: Span::new(start, self.pos),
        })
    }

    fn binding_at(&self, start: usize, end: usize) -> Option<Expression<'s>> {
        let binding = self.expression_at(start, end);
        (!binding.raw.is_empty()).then_some(binding)
    }

    /// Reads an expression up to its closing `}`, which is consumed as well.
    fn parse_expression(&mut self) -> Result<Expression<'s>> {
        let start = self.pos;
        let end = self.find_closing_brace()?;
        self.pos = end + 1;
        Ok(self.expression_at(start, end))
    }

    fn expression_at(&self, start: usize, end: usize) -> Expression<'s> {
        let raw = self.slice(start, end);
        let start = start + raw.len() - raw.trim_start().len();
        let raw = raw.trim();
        Expression {
            raw,
            span: Span::new(start, start + raw.len()),
        }
    }

    fn find_closing_brace(&self) -> Result<usize> {
        match top_level_matches(self.rest(), "}").first() {
            Some(i) => Ok(self.pos + i),
            None => bail!("unclosed expression at {}", self.pos),
        }
    }
}

/// Offsets of `pat` outside of strings and brackets.
fn top_level_matches(s: &str, pat: &str) -> Vec<usize> {
    let mut matches = vec![];
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if depth == 0 && s[i..].starts_with(pat) {
            matches.push(i);
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' | '(' | '[' => depth += 1,
            '}' | ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    matches
}

#[test]
fn parses_blocks_and_sections() {
    let source = "<script>let a;</script>\n{#if a}<b>{a}</b>{:else if c}x{/if}";
    let root = parse(source).unwrap();
    assert!(root.instance.is_some());
    let [Node::Text(..), Node::IfBlock(block)] = &root.html.children[..] else {
        panic!("unexpected children {:?}", root.html.children);
    };
    assert_eq!(block.expression.raw, "a");
    let else_block = block.else_block.as_ref().unwrap();
    assert!(matches!(&else_block.children[..], [Node::IfBlock(nested)] if nested.expression.raw == "c"));
}

#[test]
fn parses_each_header() {
    let root = parse("{#each items as { id, name }, i (id)}{name}{/each}").unwrap();
    let [Node::EachBlock(block)] = &root.html.children[..] else {
        panic!("unexpected children {:?}", root.html.children);
    };
    assert_eq!(block.expression.raw, "items");
    assert_eq!(block.context.raw, "{ id, name }");
    assert_eq!(block.index, Some("i"));
    assert_eq!(block.key.map(|key| key.raw), Some("id"));
}
