//! Scope tree construction and queries
//!
//! Global invariants enforced:
//! - Every child's line range nests within its parent's
//! - The root spans the whole file, has no parent, and is always a scope
//! - The tree is rebuilt wholesale per parse, never patched incrementally

use crate::parser::{NodeKind, ParsedFile};
use crate::span::{LineIndex, SourceSpan};

/// Scope classification of a node.
///
/// A node is a scope iff its kind is in this catalog, or it is a code block
/// whose immediate parent is a method (`MethodBody`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Method,
    Class,
    For,
    While,
    DoWhile,
    If,
    Switch,
    Try,
    Catch,
    ForEach,
    File,
    MethodBody,
}

/// Handle into the scope tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Immutable wrapper for one syntax node: line range, classification,
/// cached code text, and ordered children.
#[derive(Debug, Clone)]
pub struct ScopeNode {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
    method_body: bool,
    span: SourceSpan,
    name: String,
    identifier: Option<String>,
    code: String,
}

impl ScopeNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn span(&self) -> SourceSpan {
        self.span
    }

    /// Start line, 0-indexed
    pub fn start_line(&self) -> usize {
        self.span.start_line
    }

    /// End line, 0-indexed, inclusive
    pub fn end_line(&self) -> usize {
        self.span.end_line
    }

    /// Cached exact text slice of the node
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human label: lower-cased kind label, declared identifier appended for
    /// methods and classes, `"method body"` special-cased.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared identifier, present for methods and classes
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_code_block(&self) -> bool {
        self.kind == NodeKind::CodeBlock
    }

    pub fn is_method_body(&self) -> bool {
        self.method_body
    }

    pub fn is_doc_comment(&self) -> bool {
        self.kind == NodeKind::DocComment
    }

    pub fn is_scope(&self) -> bool {
        self.scope_kind().is_some()
    }

    /// Total classification over kind plus the one structural check
    /// (a code block directly under a method is the method body).
    pub fn scope_kind(&self) -> Option<ScopeKind> {
        if self.method_body {
            return Some(ScopeKind::MethodBody);
        }
        match self.kind {
            NodeKind::Method => Some(ScopeKind::Method),
            NodeKind::Class => Some(ScopeKind::Class),
            NodeKind::For => Some(ScopeKind::For),
            NodeKind::ForEach => Some(ScopeKind::ForEach),
            NodeKind::While => Some(ScopeKind::While),
            NodeKind::DoWhile => Some(ScopeKind::DoWhile),
            NodeKind::If => Some(ScopeKind::If),
            NodeKind::Switch => Some(ScopeKind::Switch),
            NodeKind::Try => Some(ScopeKind::Try),
            NodeKind::Catch => Some(ScopeKind::Catch),
            NodeKind::File => Some(ScopeKind::File),
            NodeKind::CodeBlock | NodeKind::DocComment | NodeKind::Other => None,
        }
    }
}

/// Navigable hierarchy over one file's parse result.
///
/// Wraps every named syntax node (not only scopes) so the tree mirrors the
/// full syntax tree. Nodes live in an arena; children are ordered id lists
/// and the parent link is a non-owning id.
pub struct ScopeTree {
    nodes: Vec<ScopeNode>,
    root: NodeId,
    lines: LineIndex,
}

impl ScopeTree {
    /// Build the tree from a parse result. Construction never fails given a
    /// valid parse; O(nodes).
    pub fn build(parsed: &ParsedFile) -> ScopeTree {
        let lines = LineIndex::new(&parsed.source);
        let mut nodes = Vec::new();
        let root = wrap_node(&mut nodes, parsed.root(), None, &parsed.source, &lines);
        ScopeTree { nodes, root, lines }
    }

    pub fn root(&self) -> &ScopeNode {
        &self.nodes[self.root.0]
    }

    pub fn node(&self, id: NodeId) -> &ScopeNode {
        &self.nodes[id.0]
    }

    pub fn parent(&self, node: &ScopeNode) -> Option<&ScopeNode> {
        node.parent.map(|id| &self.nodes[id.0])
    }

    pub fn children<'a>(&'a self, node: &'a ScopeNode) -> impl Iterator<Item = &'a ScopeNode> {
        node.children.iter().map(|id| &self.nodes[id.0])
    }

    /// All nodes in construction (pre-)order
    pub fn nodes(&self) -> impl Iterator<Item = &ScopeNode> {
        self.nodes.iter()
    }

    /// Smallest-by-containment scope whose own line range fully contains
    /// `[start_line, end_line]`.
    ///
    /// Descent passes through non-scope nodes, so a scope nested below an
    /// unclassified statement is still found. At the root this is never
    /// `None` for an in-range query (the file is always a scope); on a
    /// non-containing subtree it is `None`.
    pub fn surrounding_scope(&self, start_line: usize, end_line: usize) -> Option<&ScopeNode> {
        self.surrounding_from(self.root, start_line, end_line)
            .map(|id| &self.nodes[id.0])
    }

    /// Offset variant of [`surrounding_scope`](Self::surrounding_scope):
    /// maps the byte offsets through the memoized line index first.
    pub fn surrounding_scope_for_offsets(&self, start: usize, end: usize) -> Option<&ScopeNode> {
        let end = end.max(start);
        let start_line = self.lines.line_of(start);
        let end_line = self.lines.line_of(end.saturating_sub(1).max(start));
        self.surrounding_scope(start_line, end_line)
    }

    fn surrounding_from(&self, id: NodeId, start_line: usize, end_line: usize) -> Option<NodeId> {
        let node = &self.nodes[id.0];
        if !node.span.contains_lines(start_line, end_line) {
            return None;
        }
        let mut found = None;
        for &child in &node.children {
            if let Some(hit) = self.surrounding_from(child, start_line, end_line) {
                found = Some(hit);
            }
        }
        found.or_else(|| node.is_scope().then_some(id))
    }

    /// Pre-order descendants of the root (not the root itself) whose kind
    /// matches any of `kinds`.
    pub fn search(&self, kinds: &[NodeKind]) -> Vec<&ScopeNode> {
        self.search_within(self.root(), kinds)
    }

    /// Pre-order descendants of `node` (not `node` itself) whose kind
    /// matches any of `kinds`. Matching nodes are still descended into.
    pub fn search_within<'a>(&'a self, node: &ScopeNode, kinds: &[NodeKind]) -> Vec<&'a ScopeNode> {
        let mut result = Vec::new();
        self.collect_matching(node, kinds, &mut result);
        result
    }

    fn collect_matching<'a>(
        &'a self,
        node: &ScopeNode,
        kinds: &[NodeKind],
        out: &mut Vec<&'a ScopeNode>,
    ) {
        for &child_id in &node.children {
            let child = &self.nodes[child_id.0];
            if kinds.contains(&child.kind) {
                out.push(child);
            }
            self.collect_matching(child, kinds, out);
        }
    }

    /// True if the node's subtree holds a doc comment, or the node's
    /// immediately preceding named sibling is one. The sibling check matters
    /// because tree-sitter attaches javadoc before a declaration as a
    /// sibling, not a child.
    pub fn has_doc_comment(&self, node: &ScopeNode) -> bool {
        if !self.search_within(node, &[NodeKind::DocComment]).is_empty() {
            return true;
        }
        let Some(parent) = node.parent.map(|id| &self.nodes[id.0]) else {
            return false;
        };
        let position = parent.children.iter().position(|&id| id == node.id);
        match position {
            Some(i) if i > 0 => self.nodes[parent.children[i - 1].0].is_doc_comment(),
            _ => false,
        }
    }
}

fn wrap_node(
    nodes: &mut Vec<ScopeNode>,
    node: tree_sitter::Node,
    parent: Option<NodeId>,
    source: &str,
    lines: &LineIndex,
) -> NodeId {
    let kind = NodeKind::of(&node, source);
    let parent_is_method =
        parent.is_some_and(|id| nodes[id.0].kind == NodeKind::Method);
    let method_body = kind == NodeKind::CodeBlock && parent_is_method;

    let start = node.start_byte();
    let end = node.end_byte();
    let span = SourceSpan::new(
        start,
        end,
        lines.line_of(start),
        lines.line_of(end.saturating_sub(1).max(start)),
    );

    let code = node
        .utf8_text(source.as_bytes())
        .unwrap_or_default()
        .to_string();
    let identifier = match kind {
        NodeKind::Method | NodeKind::Class => node
            .child_by_field_name("name")
            .and_then(|name| name.utf8_text(source.as_bytes()).ok())
            .map(str::to_string),
        _ => None,
    };
    let name = scope_name(kind, node.kind(), identifier.as_deref(), method_body);

    let id = NodeId(nodes.len());
    nodes.push(ScopeNode {
        id,
        parent,
        children: Vec::new(),
        kind,
        method_body,
        span,
        name,
        identifier,
        code,
    });

    let mut cursor = node.walk();
    let named: Vec<tree_sitter::Node> = node.named_children(&mut cursor).collect();
    for child in named {
        let child_id = wrap_node(nodes, child, Some(id), source, lines);
        nodes[id.0].children.push(child_id);
    }
    id
}

/// Lower-cased kind label with structural suffixes stripped; the declared
/// identifier is appended for methods and classes.
fn scope_name(kind: NodeKind, raw: &str, identifier: Option<&str>, method_body: bool) -> String {
    if method_body {
        return "method body".to_string();
    }
    let label = match kind {
        NodeKind::Method => "method",
        NodeKind::Class => "class",
        NodeKind::For => "for statement",
        NodeKind::ForEach => "foreach statement",
        NodeKind::While => "while statement",
        NodeKind::DoWhile => "do while statement",
        NodeKind::If => "if statement",
        NodeKind::Switch => "switch statement",
        NodeKind::Try => "try statement",
        NodeKind::Catch => "catch clause",
        NodeKind::File => "file",
        NodeKind::CodeBlock => "code block",
        NodeKind::DocComment => "doc comment",
        NodeKind::Other => return raw.replace('_', " "),
    };
    match identifier {
        Some(name) => format!("{label} {name}"),
        None => label.to_string(),
    }
}
