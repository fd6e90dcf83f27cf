//! Structural outline of a tree, as shown in the editor's side panel.
//!
//! Collapsed nodes are rendered with a child count but without their
//! children: the renderer returns `SkipChildren` for them, so hidden
//! subtrees are never walked.

use std::collections::HashSet;
use std::fmt::Write as _;

use duet_core::ast::{NodeData, NodeRef};
use duet_core::visitor::{walk, TraversalSummary, VisitOutcome, VisitResult, Visitor};
use duet_core::{NodeId, NodeKind, TraversalError};
use serde::Serialize;

/// One line of the outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    /// True if the node has children that were not rendered.
    pub collapsed: bool,
    /// Number of direct children, rendered or not.
    pub child_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Indented text form, two spaces per level.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out, 0);
        out
    }

    fn write_text(&self, out: &mut String, level: usize) {
        let _ = write!(out, "{:indent$}{} [{}]", "", self.label, self.id, indent = level * 2);
        if self.collapsed {
            let _ = write!(out, " (+{})", self.child_count);
        }
        out.push('\n');
        for child in &self.children {
            child.write_text(out, level + 1);
        }
    }
}

/// Short human label for a node.
pub fn label(node: NodeRef<'_>) -> String {
    match node.data() {
        NodeData::CompilationUnit(unit) => match unit.package() {
            Some(package) => format!("package {package}"),
            None => "unit".to_string(),
        },
        NodeData::Function(f) => {
            let params = f
                .params()
                .iter()
                .map(|p| format!("{} {}", p.type_name(), p.name()))
                .collect::<Vec<_>>()
                .join(", ");
            if f.return_types().is_empty() {
                format!("function {}({})", f.name(), params)
            } else {
                format!("function {}({}) ({})", f.name(), params, f.return_types().join(", "))
            }
        }
        NodeData::Block(_) => "block".to_string(),
        NodeData::If(_) | NodeData::ElseIf(_) | NodeData::While(_) => {
            let keyword = match node.kind() {
                NodeKind::If => "if",
                NodeKind::ElseIf => "else if",
                _ => "while",
            };
            match node.condition() {
                Some(condition) => format!("{keyword} ({condition})"),
                None => keyword.to_string(),
            }
        }
        NodeData::Else(_) => "else".to_string(),
        NodeData::Assignment(a) => format!("{} = {}", a.target(), a.value()),
        NodeData::VariableDefinition(v) => match v.initializer() {
            Some(init) => format!("{} {} = {}", v.type_name(), v.name(), init),
            None => format!("{} {}", v.type_name(), v.name()),
        },
        NodeData::ExpressionStatement(e) => e.expression().to_string(),
        NodeData::Return(r) if r.values().is_empty() => "return".to_string(),
        NodeData::Return(r) => {
            let values = r
                .values()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("return {values}")
        }
        NodeData::Reply(r) => format!("reply {}", r.value()),
        NodeData::Break(_) => "break".to_string(),
        NodeData::Continue(_) => "continue".to_string(),
        NodeData::Throw(t) => format!("throw {}", t.value()),
        NodeData::TryCatch(_) => "try".to_string(),
        NodeData::Catch(c) => format!("catch ({} {})", c.type_name(), c.variable()),
        NodeData::Comment(c) if c.text().is_empty() => "//".to_string(),
        NodeData::Comment(c) => format!("// {}", c.text()),
    }
}

fn entry(node: NodeRef<'_>, collapsed: bool) -> OutlineNode {
    OutlineNode {
        id: node.id(),
        kind: node.kind(),
        label: label(node),
        collapsed,
        child_count: node.child_count(),
        children: Vec::new(),
    }
}

/// Visitor that builds an [`OutlineNode`] tree.
#[derive(Debug, Default)]
pub struct OutlineRenderer {
    collapse_kinds: HashSet<NodeKind>,
    collapse_ids: HashSet<NodeId>,
    stack: Vec<OutlineNode>,
    root: Option<OutlineNode>,
}

/// Result of rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Outline {
    pub root: OutlineNode,
    pub summary: TraversalSummary,
}

impl OutlineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapse every node of these kinds.
    pub fn collapse_kinds(mut self, kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        self.collapse_kinds.extend(kinds);
        self
    }

    /// Collapse these particular nodes.
    pub fn collapse_ids(mut self, ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.collapse_ids.extend(ids);
        self
    }

    /// Render the subtree rooted at `node`.
    pub fn render(mut self, node: NodeRef<'_>) -> Result<Outline, TraversalError> {
        let summary = walk(&mut self, node)?;
        let root = self.root.unwrap_or_else(|| entry(node, false));
        Ok(Outline { root, summary })
    }

    fn is_collapsed(&self, node: NodeRef<'_>) -> bool {
        node.child_count() > 0
            && (self.collapse_kinds.contains(&node.kind()) || self.collapse_ids.contains(&node.id()))
    }
}

impl<'a> Visitor<'a> for OutlineRenderer {
    fn visit_other(&mut self, node: NodeRef<'a>) -> VisitOutcome {
        let collapsed = self.is_collapsed(node);
        self.stack.push(entry(node, collapsed));
        Ok(VisitResult::from(!collapsed))
    }

    fn leave_other(&mut self, _node: NodeRef<'a>) {
        let Some(done) = self.stack.pop() else {
            return;
        };
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(done),
            None => self.root = Some(done),
        }
    }
}
