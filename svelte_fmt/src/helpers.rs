use crate::{
    ast::{AttrValue, Attribute, Comment, Element, ElementKind, Node},
    config::WhitespaceSensitivity,
};
use aho_corasick::AhoCorasick;
use std::sync::LazyLock;

const LINE_SPACE: [char; 4] = ['\t', '\x0C', '\r', ' '];

pub(crate) fn is_whitespace_only(s: &str) -> bool {
    s.bytes().all(|byte| byte.is_ascii_whitespace())
}

pub(crate) fn count_line_breaks(s: &str) -> usize {
    memchr::memchr_iter(b'\n', s.as_bytes()).count()
}

/// Whether `s` starts with `count` line breaks, allowing spaces around them.
pub(crate) fn starts_with_linebreak(s: &str, count: usize) -> bool {
    let mut rest = s;
    for _ in 0..count {
        match rest.trim_start_matches(LINE_SPACE).strip_prefix('\n') {
            Some(r) => rest = r,
            None => return false,
        }
    }
    true
}

/// Whether `s` ends with `count` line breaks, allowing spaces around them.
pub(crate) fn ends_with_linebreak(s: &str, count: usize) -> bool {
    let mut rest = s;
    for _ in 0..count {
        match rest.trim_end_matches(LINE_SPACE).strip_suffix('\n') {
            Some(r) => rest = r,
            None => return false,
        }
    }
    true
}

pub(crate) fn text_of<'a>(node: &'a Node) -> Option<&'a str> {
    if let Node::Text(text) = node {
        Some(text.raw.as_ref())
    } else {
        None
    }
}

pub(crate) fn is_empty_text(node: &Node) -> bool {
    text_of(node).is_some_and(is_whitespace_only)
}

pub(crate) fn is_text_starting_with_whitespace(node: &Node) -> bool {
    text_of(node).is_some_and(|raw| raw.starts_with(|c: char| c.is_ascii_whitespace()))
}

pub(crate) fn is_text_ending_with_whitespace(node: &Node) -> bool {
    text_of(node).is_some_and(|raw| raw.ends_with(|c: char| c.is_ascii_whitespace()))
}

pub(crate) fn is_text_starting_with_linebreak(node: &Node, count: usize) -> bool {
    text_of(node).is_some_and(|raw| starts_with_linebreak(raw, count))
}

pub(crate) fn is_text_ending_with_linebreak(node: &Node, count: usize) -> bool {
    text_of(node).is_some_and(|raw| ends_with_linebreak(raw, count))
}

static BLOCK_ELEMENTS: [&str; 33] = [
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "dialog",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

static VOID_ELEMENTS: [&str; 16] = [
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Elements whose boundaries hug their content even when it starts or ends with whitespace.
static ALWAYS_HUG_TAGS: [&str; 3] = ["option", "textarea", "title"];

pub(crate) fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub(crate) fn is_always_hug_tag(name: &str) -> bool {
    ALWAYS_HUG_TAGS.contains(&name)
}

pub(crate) fn is_block_tag(element: &Element, sensitivity: &WhitespaceSensitivity) -> bool {
    element.kind == ElementKind::Element
        && match sensitivity {
            WhitespaceSensitivity::Strict => false,
            WhitespaceSensitivity::Ignore => true,
            WhitespaceSensitivity::Css => BLOCK_ELEMENTS.contains(&element.name),
        }
}

pub(crate) fn is_inline_tag(
    element: &Element,
    in_pre: bool,
    sensitivity: &WhitespaceSensitivity,
) -> bool {
    element.kind == ElementKind::Element && !in_pre && !is_block_tag(element, sensitivity)
}

pub(crate) fn is_block_element(node: &Node, sensitivity: &WhitespaceSensitivity) -> bool {
    matches!(node, Node::Element(element) if is_block_tag(element, sensitivity))
}

pub(crate) fn is_inline_element(
    node: &Node,
    in_pre: bool,
    sensitivity: &WhitespaceSensitivity,
) -> bool {
    matches!(node, Node::Element(element) if is_inline_tag(element, in_pre, sensitivity))
}

/// Static text of an attribute like `lang="ts"`.
pub(crate) fn attr_text<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs.iter().find_map(|attr| match attr {
        Attribute::Attribute(attr) if attr.name == name => match &attr.value {
            AttrValue::Nodes(nodes) => match &nodes[..] {
                [node] => text_of(node),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    })
}

/// Language from `lang="..."`, or from `type="text/..."` as a fallback.
pub(crate) fn lang_of<'a>(attrs: &'a [Attribute]) -> Option<&'a str> {
    attr_text(attrs, "lang").or_else(|| {
        attr_text(attrs, "type").map(|ty| {
            ty.strip_prefix("text/")
                .or_else(|| ty.strip_prefix("application/"))
                .unwrap_or(ty)
        })
    })
}

static SUPPORTED_LANGUAGES: [&str; 8] = [
    "css",
    "scss",
    "less",
    "js",
    "javascript",
    "ts",
    "typescript",
    "babel",
];

pub(crate) fn is_supported_language(attrs: &[Attribute]) -> bool {
    lang_of(attrs).is_none_or(|lang| SUPPORTED_LANGUAGES.contains(&lang))
}

pub(crate) fn is_ignore_directive(comment: &Comment, directive: &str) -> bool {
    comment.data.trim() == directive
}

pub(crate) fn is_ignore_start_directive(comment: &Comment, directive: &str) -> bool {
    comment.data.trim().strip_prefix(directive) == Some("-start")
}

pub(crate) fn is_ignore_end_directive(comment: &Comment, directive: &str) -> bool {
    comment.data.trim().strip_prefix(directive) == Some("-end")
}

pub(crate) fn is_range_directive(node: &Node, directive: &str) -> bool {
    matches!(node, Node::Comment(comment)
        if is_ignore_start_directive(comment, directive) || is_ignore_end_directive(comment, directive))
}

static PRAGMA_AC: LazyLock<AhoCorasick> =
    LazyLock::new(|| AhoCorasick::new(["@format", "@prettier"]).unwrap());

/// Whether the source starts with `<!-- @format -->` or `<!-- @prettier -->`.
pub fn has_pragma(source: &str) -> bool {
    let Some(body) = source
        .trim_start()
        .strip_prefix("<!--")
        .map(|rest| rest.trim_start())
    else {
        return false;
    };
    PRAGMA_AC
        .find(body)
        .filter(|found| found.start() == 0)
        .is_some_and(|found| {
            !body[found.end()..].starts_with(|c: char| c.is_alphanumeric() || c == '_')
        })
}
