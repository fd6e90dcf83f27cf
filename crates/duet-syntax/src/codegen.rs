//! Canonical source text from a tree.
//!
//! [`SourceGenerator`] is an ordinary [`Visitor`]: headers are written on the
//! way down and closing braces from the `leave_*` hooks on the way up.
//! Clause nodes (`else if`, `else`, `catch`) close the block opened by their
//! parent before opening their own, so the parent only closes once.
//!
//! Top-level items are separated by a blank line, except that a comment stays
//! glued to the item after it.

use duet_core::ast::{
    Assignment, Block, Break, Catch, Comment, CompilationUnit, ConditionalStatement, Continue,
    Else, ElseIf, ExpressionStatement, Function, If, NodeKind, NodeRef, Reply, Return, Throw, TryCatch,
    VariableDefinition, While,
};
use duet_core::visitor::{walk, VisitOutcome, VisitResult, Visitor};
use duet_core::TraversalError;

const INDENT: &str = "    ";

/// Writes source text for every node it visits.
#[derive(Debug, Default)]
pub struct SourceGenerator {
    out: String,
    depth: usize,
    after_comment: bool,
}

impl SourceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text generated so far.
    pub fn source(&self) -> &str {
        &self.out
    }

    pub fn into_source(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Blank line before a top-level item.
    fn separate(&mut self, node: NodeRef<'_>) {
        let top_level = node.parent().map(|p| p.kind()) == Some(NodeKind::CompilationUnit);
        if !top_level {
            return;
        }
        if !self.out.is_empty() && !self.after_comment {
            self.out.push('\n');
        }
        self.after_comment = node.kind() == NodeKind::Comment;
    }

    fn open(&mut self, header: &str) {
        self.line(header);
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    /// Close the parent's block and open a clause block on the same line.
    fn clause(&mut self, header: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.open(&format!("}} {header} {{"));
    }

    fn statement(&mut self, text: &str) -> VisitOutcome {
        self.line(text);
        Ok(VisitResult::Continue)
    }
}

impl<'a> Visitor<'a> for SourceGenerator {
    fn visit_compilation_unit(&mut self, _node: NodeRef<'a>, data: &'a CompilationUnit) -> VisitOutcome {
        if let Some(package) = data.package() {
            self.line(&format!("package {package};"));
        }
        Ok(VisitResult::Continue)
    }

    fn visit_function_def(&mut self, node: NodeRef<'a>, data: &'a Function) -> VisitOutcome {
        self.separate(node);
        let params = data
            .params()
            .iter()
            .map(|p| format!("{} {}", p.type_name(), p.name()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut header = format!("function {}({})", data.name(), params);
        if !data.return_types().is_empty() {
            header.push_str(&format!(" ({})", data.return_types().join(", ")));
        }
        header.push_str(" {");
        self.open(&header);
        Ok(VisitResult::Continue)
    }

    fn leave_function_def(&mut self, _node: NodeRef<'a>, _data: &'a Function) {
        self.close();
    }

    fn visit_block(&mut self, _node: NodeRef<'a>, _data: &'a Block) -> VisitOutcome {
        self.open("{");
        Ok(VisitResult::Continue)
    }

    fn leave_block(&mut self, _node: NodeRef<'a>, _data: &'a Block) {
        self.close();
    }

    fn visit_if_stmt(&mut self, _node: NodeRef<'a>, data: &'a If) -> VisitOutcome {
        self.open(&format!("if ({}) {{", data.condition()));
        Ok(VisitResult::Continue)
    }

    fn leave_if_stmt(&mut self, _node: NodeRef<'a>, _data: &'a If) {
        self.close();
    }

    fn visit_else_if(&mut self, _node: NodeRef<'a>, data: &'a ElseIf) -> VisitOutcome {
        self.clause(&format!("else if ({})", data.condition()));
        Ok(VisitResult::Continue)
    }

    fn visit_else_clause(&mut self, _node: NodeRef<'a>, _data: &'a Else) -> VisitOutcome {
        self.clause("else");
        Ok(VisitResult::Continue)
    }

    fn visit_while_stmt(&mut self, _node: NodeRef<'a>, data: &'a While) -> VisitOutcome {
        self.open(&format!("while ({}) {{", data.condition()));
        Ok(VisitResult::Continue)
    }

    fn leave_while_stmt(&mut self, _node: NodeRef<'a>, _data: &'a While) {
        self.close();
    }

    fn visit_try_catch(&mut self, _node: NodeRef<'a>, _data: &'a TryCatch) -> VisitOutcome {
        self.open("try {");
        Ok(VisitResult::Continue)
    }

    fn leave_try_catch(&mut self, _node: NodeRef<'a>, _data: &'a TryCatch) {
        self.close();
    }

    fn visit_catch_clause(&mut self, _node: NodeRef<'a>, data: &'a Catch) -> VisitOutcome {
        self.clause(&format!("catch ({} {})", data.type_name(), data.variable()));
        Ok(VisitResult::Continue)
    }

    fn visit_assignment(&mut self, _node: NodeRef<'a>, data: &'a Assignment) -> VisitOutcome {
        self.statement(&format!("{} = {};", data.target(), data.value()))
    }

    fn visit_variable_def(&mut self, _node: NodeRef<'a>, data: &'a VariableDefinition) -> VisitOutcome {
        match data.initializer() {
            Some(init) => self.statement(&format!("{} {} = {};", data.type_name(), data.name(), init)),
            None => self.statement(&format!("{} {};", data.type_name(), data.name())),
        }
    }

    fn visit_expr_stmt(&mut self, _node: NodeRef<'a>, data: &'a ExpressionStatement) -> VisitOutcome {
        self.statement(&format!("{};", data.expression()))
    }

    fn visit_return_stmt(&mut self, _node: NodeRef<'a>, data: &'a Return) -> VisitOutcome {
        if data.values().is_empty() {
            return self.statement("return;");
        }
        let values = data
            .values()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.statement(&format!("return {values};"))
    }

    fn visit_reply_stmt(&mut self, _node: NodeRef<'a>, data: &'a Reply) -> VisitOutcome {
        self.statement(&format!("reply {};", data.value()))
    }

    fn visit_break_stmt(&mut self, _node: NodeRef<'a>, _data: &'a Break) -> VisitOutcome {
        self.statement("break;")
    }

    fn visit_continue_stmt(&mut self, _node: NodeRef<'a>, _data: &'a Continue) -> VisitOutcome {
        self.statement("continue;")
    }

    fn visit_throw_stmt(&mut self, _node: NodeRef<'a>, data: &'a Throw) -> VisitOutcome {
        self.statement(&format!("throw {};", data.value()))
    }

    fn visit_comment(&mut self, node: NodeRef<'a>, data: &'a Comment) -> VisitOutcome {
        self.separate(node);
        if data.text().is_empty() {
            self.statement("//")
        } else {
            self.statement(&format!("// {}", data.text()))
        }
    }
}

/// Generate source text for the subtree rooted at `node`.
///
/// # Examples
///
/// ```
/// use duet_syntax::{build_tree, generate_source};
///
/// let tree = build_tree("function main(){while(x<3){x=x+1;}}").unwrap();
/// let text = generate_source(tree.root()).unwrap();
/// assert_eq!(text, "function main() {\n    while (x < 3) {\n        x = x + 1;\n    }\n}\n");
/// ```
pub fn generate_source(node: NodeRef<'_>) -> Result<String, TraversalError> {
    let mut generator = SourceGenerator::new();
    walk(&mut generator, node)?;
    Ok(generator.into_source())
}
