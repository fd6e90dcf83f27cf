//! Lint rules run as a single visitor pass.
//!
//! The [`Linter`] keeps two counters that the `visit_*`/`leave_*` pairs move
//! up and down: the number of enclosing loops and the statement nesting
//! level. Everything else is read off the node's siblings and children.

use std::fmt;
use std::str::FromStr;

use duet_core::ast::{Block, Break, Continue, If, NodeRef, TryCatch, While};
use duet_core::visitor::{walk, TraversalSummary, VisitOutcome, VisitResult, Visitor};
use duet_core::{NodeId, NodeKind, TraversalError};
use serde::{Deserialize, Serialize};

use crate::config::LintConfig;

/// A lint rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// A statement after `return`, `reply`, `break`, `continue` or `throw`
    /// in the same body.
    UnreachableCode,
    /// `break` or `continue` with no enclosing `while`.
    LoopControlOutsideLoop,
    /// A body with no statements other than comments.
    EmptyBody,
    /// Statements nested deeper than the configured limit.
    MaxDepth,
}

impl Rule {
    pub const ALL: [Rule; 4] = [
        Rule::UnreachableCode,
        Rule::LoopControlOutsideLoop,
        Rule::EmptyBody,
        Rule::MaxDepth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::UnreachableCode => "unreachable-code",
            Rule::LoopControlOutsideLoop => "loop-control-outside-loop",
            Rule::EmptyBody => "empty-body",
            Rule::MaxDepth => "max-depth",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rule::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| format!("unknown lint rule '{}'", s))
    }
}

/// One problem found by the linter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: Rule,
    pub node: NodeId,
    pub kind: NodeKind,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}: {}", self.node, self.rule, self.kind, self.message)
    }
}

/// Result of a lint pass.
#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    pub findings: Vec<Finding>,
    pub summary: TraversalSummary,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Kinds that add a nesting level for the statements inside them.
fn nests(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::While | NodeKind::If | NodeKind::Block | NodeKind::TryCatch
    )
}

/// Visitor that collects [`Finding`]s.
pub struct Linter<'c> {
    config: &'c LintConfig,
    loops: usize,
    nesting: usize,
    findings: Vec<Finding>,
}

impl<'c> Linter<'c> {
    pub fn new(config: &'c LintConfig) -> Self {
        Self {
            config,
            loops: 0,
            nesting: 0,
            findings: Vec::new(),
        }
    }

    /// Lint the subtree rooted at `node`.
    ///
    /// Loops and nesting levels above `node` count, so linting a single
    /// statement gives the same findings as linting its whole function.
    pub fn check(mut self, node: NodeRef<'_>) -> Result<LintReport, TraversalError> {
        self.loops = node
            .ancestors()
            .filter(|a| a.kind() == NodeKind::While)
            .count();
        self.nesting = node.ancestors().filter(|a| nests(a.kind())).count();
        let summary = walk(&mut self, node)?;
        Ok(LintReport {
            findings: self.findings,
            summary,
        })
    }

    fn report(&mut self, rule: Rule, node: NodeRef<'_>, message: String) {
        if self.config.is_enabled(rule) {
            self.findings.push(Finding {
                rule,
                node: node.id(),
                kind: node.kind(),
                message,
            });
        }
    }

    /// Rules that apply to every node.
    fn check_node(&mut self, node: NodeRef<'_>) {
        let kind = node.kind();

        if kind.is_statement() && kind != NodeKind::Comment {
            let previous = std::iter::successors(node.previous_sibling(), |n| n.previous_sibling())
                .find(|n| n.kind() != NodeKind::Comment);
            if let Some(previous) = previous.filter(|p| p.kind().is_terminator()) {
                self.report(
                    Rule::UnreachableCode,
                    node,
                    format!("unreachable {} after {}", kind, previous.kind()),
                );
            }
        }

        let checks_body = matches!(
            kind,
            NodeKind::Function
                | NodeKind::While
                | NodeKind::If
                | NodeKind::ElseIf
                | NodeKind::Else
                | NodeKind::Catch
        );
        if checks_body
            && node
                .statements()
                .iter()
                .all(|s| s.kind() == NodeKind::Comment)
        {
            self.report(Rule::EmptyBody, node, format!("{} has an empty body", kind));
        }
    }

    fn enter_nested(&mut self, node: NodeRef<'_>) {
        self.nesting += 1;
        if self.nesting == self.config.max_depth + 1 {
            let message = format!(
                "nesting level {} exceeds the limit of {}",
                self.nesting, self.config.max_depth
            );
            self.report(Rule::MaxDepth, node, message);
        }
    }

    fn leave_nested(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    fn loop_control(&mut self, node: NodeRef<'_>) -> VisitOutcome {
        self.check_node(node);
        if self.loops == 0 {
            self.report(
                Rule::LoopControlOutsideLoop,
                node,
                format!("{} outside of a while loop", node.kind()),
            );
        }
        Ok(VisitResult::Continue)
    }
}

impl<'a> Visitor<'a> for Linter<'_> {
    fn visit_other(&mut self, node: NodeRef<'a>) -> VisitOutcome {
        self.check_node(node);
        Ok(VisitResult::Continue)
    }

    fn visit_while_stmt(&mut self, node: NodeRef<'a>, _data: &'a While) -> VisitOutcome {
        self.check_node(node);
        self.enter_nested(node);
        self.loops += 1;
        Ok(VisitResult::Continue)
    }

    fn leave_while_stmt(&mut self, _node: NodeRef<'a>, _data: &'a While) {
        self.loops = self.loops.saturating_sub(1);
        self.leave_nested();
    }

    fn visit_if_stmt(&mut self, node: NodeRef<'a>, _data: &'a If) -> VisitOutcome {
        self.check_node(node);
        self.enter_nested(node);
        Ok(VisitResult::Continue)
    }

    fn leave_if_stmt(&mut self, _node: NodeRef<'a>, _data: &'a If) {
        self.leave_nested();
    }

    fn visit_block(&mut self, node: NodeRef<'a>, _data: &'a Block) -> VisitOutcome {
        self.check_node(node);
        self.enter_nested(node);
        Ok(VisitResult::Continue)
    }

    fn leave_block(&mut self, _node: NodeRef<'a>, _data: &'a Block) {
        self.leave_nested();
    }

    fn visit_try_catch(&mut self, node: NodeRef<'a>, _data: &'a TryCatch) -> VisitOutcome {
        self.check_node(node);
        self.enter_nested(node);
        Ok(VisitResult::Continue)
    }

    fn leave_try_catch(&mut self, _node: NodeRef<'a>, _data: &'a TryCatch) {
        self.leave_nested();
    }

    fn visit_break_stmt(&mut self, node: NodeRef<'a>, _data: &'a Break) -> VisitOutcome {
        self.loop_control(node)
    }

    fn visit_continue_stmt(&mut self, node: NodeRef<'a>, _data: &'a Continue) -> VisitOutcome {
        self.loop_control(node)
    }
}
