//! Parse-tree adaptor.
//!
//! The upstream parser (out of scope here) hands the core an opaque
//! tree of untyped nodes. This module is the thin wrapper over it: tag
//! inspection, child navigation, source position — nothing else. AST
//! construction (`talus_ast::expr`/`stmt`/`ty`) borrows from these nodes
//! but never outlives them — borrowed references with an explicit
//! parse-tree lifetime, not the raw pointers the original source used.

use talus_diagnostics::Position;

/// A node in the external parse tree. Implemented by whatever the upstream
/// parser produces; `talus-ast` only ever depends on this trait, never on
/// a concrete parser.
pub trait ParseNode {
    /// Raw tag string, e.g. `"stmt|if_stmt|regex('if')"` in the combinator
    /// convention the original source's parser uses: rule names joined by
    /// `|`, with trailing decorations for literal/regex matches.
    fn tag(&self) -> &str;

    fn contents(&self) -> &str;

    fn child_count(&self) -> usize;

    fn child(&self, index: usize) -> &dyn ParseNode;

    fn source_position(&self) -> Position;
}

/// First `|`-separated segment of a node's tag: the outermost grammar rule
/// that produced it.
#[must_use]
pub fn outermost_tag(node: &dyn ParseNode) -> &str {
    node.tag().split('|').next().unwrap_or("")
}

/// Last `|`-separated segment, with trailing regex/alternation decorations
/// stripped — the innermost (most specific) rule that matched.
#[must_use]
pub fn innermost_tag(node: &dyn ParseNode) -> &str {
    let last = node.tag().rsplit('|').next().unwrap_or("");
    last.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_')
}

#[must_use]
pub fn split_tags(node: &dyn ParseNode) -> Vec<&str> {
    node.tag().split('|').collect()
}

#[must_use]
pub fn is_reserved(name: &str) -> bool {
    crate::reserved::is_reserved(name)
}

/// Harvest comma-separated identifier leaves directly beneath `node`.
#[must_use]
pub fn ident_list(node: &dyn ParseNode) -> Vec<String> {
    (0..node.child_count())
        .map(|i| node.child(i))
        .filter(|c| innermost_tag(*c) == "ident")
        .map(|c| c.contents().to_owned())
        .collect()
}

#[cfg(test)]
pub mod fixture {
    //! Minimal owned parse tree, used only by this workspace's tests to
    //! drive the adaptor and downstream lowering without a real parser.

    use super::ParseNode;
    use talus_diagnostics::Position;

    #[derive(Debug, Clone)]
    pub struct FixtureNode {
        pub tag: String,
        pub contents: String,
        pub pos: Position,
        pub children: Vec<FixtureNode>,
    }

    impl FixtureNode {
        #[must_use]
        pub fn leaf(tag: &str, contents: &str, pos: Position) -> Self {
            Self { tag: tag.to_owned(), contents: contents.to_owned(), pos, children: Vec::new() }
        }

        #[must_use]
        pub fn branch(tag: &str, pos: Position, children: Vec<FixtureNode>) -> Self {
            Self { tag: tag.to_owned(), contents: String::new(), pos, children }
        }
    }

    impl ParseNode for FixtureNode {
        fn tag(&self) -> &str {
            &self.tag
        }

        fn contents(&self) -> &str {
            &self.contents
        }

        fn child_count(&self) -> usize {
            self.children.len()
        }

        fn child(&self, index: usize) -> &dyn ParseNode {
            &self.children[index]
        }

        fn source_position(&self) -> Position {
            self.pos
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixture::FixtureNode;
    use super::*;
    use talus_diagnostics::Position;

    #[test]
    fn outermost_and_innermost_tag_split_on_pipe() {
        let node = FixtureNode::leaf("stmt|if_stmt|regex('if')", "if", Position::default());
        assert_eq!(outermost_tag(&node), "stmt");
        assert_eq!(innermost_tag(&node), "if_stmt");
    }

    #[test]
    fn ident_list_collects_only_ident_children() {
        let a = FixtureNode::leaf("ident", "a", Position::default());
        let comma = FixtureNode::leaf("punct", ",", Position::default());
        let b = FixtureNode::leaf("ident", "b", Position::default());
        let node = FixtureNode::branch("args", Position::default(), vec![a, comma, b]);
        assert_eq!(ident_list(&node), vec!["a".to_owned(), "b".to_owned()]);
    }
}
