use crate::{
    ast::Node,
    helpers::{self, is_empty_text},
};

#[derive(Clone, Copy, Default)]
pub(crate) struct State {
    /// The node is a direct child of the root fragment.
    pub(crate) is_top_level: bool,
    /// Inside `<pre>`, where text is printed verbatim.
    pub(crate) in_pre: bool,
    /// Inside an attribute value. Text is printed verbatim here, too.
    pub(crate) in_attr: bool,
    /// Inside a quoted attribute value.
    pub(crate) in_quoted_attr: bool,
    /// The node is the last child of a block-like element.
    pub(crate) is_last_in_block: bool,
    /// The parent node is an `{#each}` block.
    pub(crate) in_each: bool,
}

impl State {
    pub(crate) fn nested(&self) -> Self {
        Self {
            is_top_level: false,
            is_last_in_block: false,
            in_each: false,
            ..*self
        }
    }
}

/// Format-suppression machine driven by ignore directive comments.
///
/// Flags are read when a node is entered, so a directive affects the very
/// next sibling that gets printed.
#[derive(Default, Debug)]
pub(crate) struct Suppression {
    ignore_next: bool,
    ignore_range: bool,
}

impl Suppression {
    pub(crate) fn reset(&mut self) {
        self.ignore_next = false;
        self.ignore_range = false;
    }

    pub(crate) fn ignore_next(&mut self) {
        log::trace!("ignoring formatting of next node");
        self.ignore_next = true;
    }

    /// Starts a new sibling list, returning the ignore-next flag of the enclosing one.
    pub(crate) fn enter_siblings(&mut self) -> bool {
        std::mem::take(&mut self.ignore_next)
    }

    /// Ends a sibling list. A directive left without a following sibling is dropped.
    pub(crate) fn leave_siblings(&mut self, outer: bool) {
        if self.ignore_next {
            log::trace!("ignore directive has no following sibling");
        }
        self.ignore_next = outer;
    }

    pub(crate) fn start_range(&mut self) {
        log::debug!("ignored range started");
        self.ignore_range = true;
    }

    pub(crate) fn end_range(&mut self) {
        log::debug!("ignored range ended");
        self.ignore_range = false;
    }

    /// Decides whether `node` must be printed verbatim, consuming a pending
    /// ignore-next directive if so.
    ///
    /// Whitespace-only text is never suppressed.
    pub(crate) fn enter(&mut self, node: &Node, directive: &str) -> bool {
        if is_empty_text(node) {
            return false;
        }
        let suppressed = self.ignore_next
            || self.ignore_range
                && !matches!(node, Node::Comment(comment)
                    if helpers::is_ignore_end_directive(comment, directive));
        if suppressed {
            self.ignore_next = false;
        }
        suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Comment, Span, TextNode};

    fn comment(data: &str) -> Node<'_> {
        Node::Comment(Comment {
            data,
            span: Span::default(),
        })
    }

    fn text(raw: &str) -> Node<'_> {
        Node::Text(TextNode {
            raw: raw.into(),
            span: Span::default(),
        })
    }

    #[test]
    fn ignore_next_is_consumed_once() {
        let mut suppression = Suppression::default();
        suppression.ignore_next();
        assert!(!suppression.enter(&text("\n  "), "prettier-ignore"));
        assert!(suppression.enter(&text("a"), "prettier-ignore"));
        assert!(!suppression.enter(&text("b"), "prettier-ignore"));
    }

    #[test]
    fn ignore_next_stays_in_its_sibling_list() {
        let mut suppression = Suppression::default();
        let outer = suppression.enter_siblings();
        suppression.ignore_next();
        suppression.leave_siblings(outer);
        assert!(!suppression.enter(&text("a"), "prettier-ignore"));

        suppression.ignore_next();
        let outer = suppression.enter_siblings();
        assert!(!suppression.enter(&text("b"), "prettier-ignore"));
        suppression.leave_siblings(outer);
        assert!(suppression.enter(&text("c"), "prettier-ignore"));
    }

    #[test]
    fn range_covers_until_end_directive() {
        let mut suppression = Suppression::default();
        suppression.start_range();
        assert!(suppression.enter(&text("a"), "prettier-ignore"));
        assert!(!suppression.enter(&text(" "), "prettier-ignore"));
        assert!(suppression.enter(&comment("note"), "prettier-ignore"));
        assert!(!suppression.enter(&comment(" prettier-ignore-end "), "prettier-ignore"));
        suppression.end_range();
        assert!(!suppression.enter(&text("b"), "prettier-ignore"));
    }

    #[test]
    fn reset_clears_everything() {
        let mut suppression = Suppression::default();
        suppression.ignore_next();
        suppression.start_range();
        suppression.reset();
        assert!(!suppression.enter(&text("a"), "prettier-ignore"));
    }
}
