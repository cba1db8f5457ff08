//! Java syntax provider using tree-sitter
//!
//! The parser is a consumed collaborator: it supplies node kinds, byte
//! ranges, ordered children, and declared names. Everything downstream
//! (scope classification, line mapping) lives in `scope` and `span`.

use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::error::ReadabilityError;

/// One file's parse result: the syntax tree plus the text it was built from
pub struct ParsedFile {
    pub(crate) tree: Tree,
    pub source: String,
}

/// Parse Java source into a syntax tree.
///
/// Failure is `ParseUnavailable`; callers must not build a scope tree
/// without a parse.
pub fn parse_java(source: &str, file: &Path) -> Result<ParsedFile, ReadabilityError> {
    let mut parser = Parser::new();
    let language = tree_sitter_java::LANGUAGE;
    parser
        .set_language(&language.into())
        .map_err(|e| ReadabilityError::ParseUnavailable {
            file: file.to_path_buf(),
            reason: format!("failed to set Java grammar: {e}"),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ReadabilityError::ParseUnavailable {
            file: file.to_path_buf(),
            reason: "parser returned no tree".to_string(),
        })?;

    Ok(ParsedFile {
        tree,
        source: source.to_string(),
    })
}

impl ParsedFile {
    pub(crate) fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }
}

/// Closed catalog of syntax node kinds this crate classifies.
///
/// Everything the grammar produces outside this catalog is `Other`; the
/// mapping is total over tree-sitter kind strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Method,
    Class,
    For,
    ForEach,
    While,
    DoWhile,
    If,
    Switch,
    Try,
    Catch,
    File,
    CodeBlock,
    DocComment,
    Other,
}

impl NodeKind {
    /// Classify one tree-sitter node.
    ///
    /// tree-sitter has no dedicated javadoc node, so a block comment counts
    /// as a doc comment only when its text opens with `/**`.
    pub fn of(node: &Node, source: &str) -> NodeKind {
        match node.kind() {
            "program" => NodeKind::File,
            "method_declaration" | "constructor_declaration" => NodeKind::Method,
            "class_declaration" | "interface_declaration" | "enum_declaration"
            | "record_declaration" => NodeKind::Class,
            "for_statement" => NodeKind::For,
            "enhanced_for_statement" => NodeKind::ForEach,
            "while_statement" => NodeKind::While,
            "do_statement" => NodeKind::DoWhile,
            "if_statement" => NodeKind::If,
            "switch_expression" | "switch_statement" => NodeKind::Switch,
            "try_statement" | "try_with_resources_statement" => NodeKind::Try,
            "catch_clause" => NodeKind::Catch,
            "block" | "constructor_body" => NodeKind::CodeBlock,
            "block_comment" | "comment"
                if node
                    .utf8_text(source.as_bytes())
                    .is_ok_and(|text| text.starts_with("/**")) =>
            {
                NodeKind::DocComment
            }
            _ => NodeKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_a_minimal_class() {
        let parsed = parse_java("class A { void f() {} }", &PathBuf::from("A.java")).unwrap();
        assert_eq!(parsed.root().kind(), "program");
    }

    #[test]
    fn classifies_root_as_file() {
        let source = "class A {}";
        let parsed = parse_java(source, &PathBuf::from("A.java")).unwrap();
        assert_eq!(NodeKind::of(&parsed.root(), source), NodeKind::File);
    }

    #[test]
    fn javadoc_requires_double_star_opener() {
        let source = "/** doc */\n/* plain */\nclass A {}";
        let parsed = parse_java(source, &PathBuf::from("A.java")).unwrap();
        let root = parsed.root();
        let mut cursor = root.walk();
        let kinds: Vec<NodeKind> = root
            .named_children(&mut cursor)
            .map(|child| NodeKind::of(&child, source))
            .collect();
        assert_eq!(
            kinds,
            vec![NodeKind::DocComment, NodeKind::Other, NodeKind::Class]
        );
    }
}
