//! Document IR built by the printer and rendered by [`crate::layout`].

use std::borrow::Cow;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Doc<'s> {
    Text(Cow<'s, str>),
    Concat(Vec<Doc<'s>>),
    Line(LineKind),
    /// Contained lines are either all flat or all broken.
    Group {
        content: Box<Doc<'s>>,
        should_break: bool,
    },
    Indent(Box<Doc<'s>>),
    Dedent(Box<Doc<'s>>),
    /// Alternating contents and separators; only separators that don't fit are broken.
    Fill(Vec<Doc<'s>>),
    /// Forces every enclosing group to break.
    BreakParent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// A space when flat.
    Normal,
    /// Nothing when flat.
    Soft,
    Hard,
    /// Breaks without indentation.
    Literal,
    /// Hard line, dropped when it's the only content of its sequence.
    KeepIfLonely,
}

impl<'s> Doc<'s> {
    pub fn nil() -> Self {
        Doc::Concat(Vec::new())
    }

    pub fn text(s: impl Into<Cow<'s, str>>) -> Self {
        Doc::Text(s.into())
    }

    pub fn list(docs: Vec<Doc<'s>>) -> Self {
        Doc::Concat(docs)
    }

    pub fn line_or_space() -> Self {
        Doc::Line(LineKind::Normal)
    }

    pub fn line_or_nil() -> Self {
        Doc::Line(LineKind::Soft)
    }

    pub fn hard_line() -> Self {
        Doc::Line(LineKind::Hard)
    }

    pub fn literal_line() -> Self {
        Doc::Line(LineKind::Literal)
    }

    pub fn keep_if_lonely_line() -> Self {
        Doc::Line(LineKind::KeepIfLonely)
    }

    pub fn break_parent() -> Self {
        Doc::BreakParent
    }

    pub fn fill(docs: Vec<Doc<'s>>) -> Self {
        Doc::Fill(docs)
    }

    pub fn group(self) -> Self {
        Doc::Group {
            content: Box::new(self),
            should_break: false,
        }
    }

    pub fn indent(self) -> Self {
        Doc::Indent(Box::new(self))
    }

    pub fn dedent(self) -> Self {
        Doc::Dedent(Box::new(self))
    }

    pub fn append(self, other: Doc<'s>) -> Self {
        match self {
            Doc::Concat(mut docs) => {
                docs.push(other);
                Doc::Concat(docs)
            }
            doc => Doc::Concat(vec![doc, other]),
        }
    }

    pub fn concat(self, iter: impl Iterator<Item = Doc<'s>>) -> Self {
        match self {
            Doc::Concat(mut docs) => {
                docs.extend(iter);
                Doc::Concat(docs)
            }
            doc => {
                let mut docs = vec![doc];
                docs.extend(iter);
                Doc::Concat(docs)
            }
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Doc::Line(..))
    }

    /// Whether the document renders to nothing at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Doc::Text(text) => text.is_empty(),
            Doc::Concat(docs) | Doc::Fill(docs) => docs.iter().all(Doc::is_empty),
            Doc::Group { content, .. } | Doc::Indent(content) | Doc::Dedent(content) => {
                content.is_empty()
            }
            Doc::Line(..) | Doc::BreakParent => false,
        }
    }

    /// Removes one trailing line, looking through wrappers and sequences.
    pub fn trim_trailing_line(&mut self) -> bool {
        match self {
            Doc::Concat(docs) | Doc::Fill(docs) => {
                while let Some(last) = docs.last_mut() {
                    if last.is_line() {
                        docs.pop();
                        return true;
                    } else if last.is_empty() || matches!(last, Doc::BreakParent) {
                        docs.pop();
                    } else {
                        return last.trim_trailing_line();
                    }
                }
                false
            }
            Doc::Group { content, .. } | Doc::Indent(content) | Doc::Dedent(content) => {
                content.trim_trailing_line()
            }
            Doc::Text(..) | Doc::Line(..) | Doc::BreakParent => false,
        }
    }
}

/// Drops lines, whitespace-only text and break markers from both ends,
/// looking into the outermost sequences.
pub(crate) fn trim_docs(docs: &mut Vec<Doc<'_>>) {
    trim_docs_end(docs);
    trim_docs_start(docs);
}

fn is_trimmable(doc: &Doc) -> bool {
    match doc {
        Doc::Line(..) | Doc::BreakParent => true,
        Doc::Text(text) => text.trim().is_empty(),
        Doc::Concat(docs) => docs.iter().all(is_trimmable),
        _ => false,
    }
}

fn trim_docs_start(docs: &mut Vec<Doc<'_>>) {
    let leading = docs.iter().take_while(|doc| is_trimmable(doc)).count();
    docs.drain(..leading);
    if let Some(Doc::Concat(inner) | Doc::Fill(inner)) = docs.first_mut() {
        trim_docs_start(inner);
    }
}

fn trim_docs_end(docs: &mut Vec<Doc<'_>>) {
    while docs.last().is_some_and(is_trimmable) {
        docs.pop();
    }
    if let Some(Doc::Concat(inner) | Doc::Fill(inner)) = docs.last_mut() {
        trim_docs_end(inner);
    }
}
