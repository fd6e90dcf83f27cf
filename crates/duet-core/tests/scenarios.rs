//! End-to-end scenarios over the public API: building, editing, observing and
//! traversing a small program.

use std::cell::RefCell;
use std::rc::Rc;

use duet_core::ast::{
    Assignment, BinaryOp, Break, Catch, CompilationUnit, Else, Expression, ExpressionStatement,
    Function, If, NodeRef, Parameter, Return, Throw, TryCatch, While,
};
use duet_core::visitor::{VisitOutcome, VisitResult, Visitor};
use duet_core::{
    ChangeKind, MalformedNodeError, NodeId, NodeKind, StructuralChange, StructuralEditError,
    Tree, TraversalError,
};

/// Counts visited nodes per kind and accepts everything.
#[derive(Default)]
struct KindCounter {
    counts: std::collections::BTreeMap<NodeKind, usize>,
}

impl<'a> Visitor<'a> for KindCounter {
    fn visit_other(&mut self, node: NodeRef<'a>) -> VisitOutcome {
        *self.counts.entry(node.kind()).or_default() += 1;
        Ok(VisitResult::Continue)
    }
}

/// Collects assignment targets and never descends into try blocks.
#[derive(Default)]
struct AssignedNames {
    names: Vec<String>,
}

impl<'a> Visitor<'a> for AssignedNames {
    fn visit_other(&mut self, _node: NodeRef<'a>) -> VisitOutcome {
        Ok(VisitResult::Continue)
    }

    fn visit_assignment(&mut self, _node: NodeRef<'a>, data: &'a Assignment) -> VisitOutcome {
        self.names.push(data.target().to_string());
        Ok(VisitResult::Continue)
    }

    fn visit_try_catch(&mut self, _node: NodeRef<'a>, _data: &'a TryCatch) -> VisitOutcome {
        Ok(VisitResult::SkipChildren)
    }
}

struct Program {
    tree: Tree,
    main: NodeId,
    loop_: NodeId,
    guard: NodeId,
    attempt: NodeId,
}

/// ```text
/// package demo;
/// function main(int n) (int) {
///     while (n > 0) {
///         n = n - 1;
///         if (n == 3) { break; } else { total = n; }
///     }
///     try { throw n; } catch (error e) { log:print(e); }
///     return n;
/// }
/// ```
fn program() -> Program {
    let n = || Expression::ident("n");
    let mut tree = Tree::new(CompilationUnit::new(Some("demo".into())).unwrap());
    let main = tree.create(
        Function::new(
            "main",
            vec![Parameter::new("int", "n").unwrap()],
            vec!["int".into()],
        )
        .unwrap(),
    );
    let loop_ = tree.create(
        While::new(Expression::binary(BinaryOp::Gt, n(), Expression::int(0))).unwrap(),
    );
    let dec = tree.create(
        Assignment::new(n(), Expression::binary(BinaryOp::Sub, n(), Expression::int(1))).unwrap(),
    );
    let guard = tree.create(
        If::new(Expression::binary(BinaryOp::Eq, n(), Expression::int(3))).unwrap(),
    );
    let stop = tree.create(Break);
    let otherwise = tree.create(Else);
    let total = tree.create(Assignment::new(Expression::ident("total"), n()).unwrap());
    let attempt = tree.create(TryCatch);
    let throw = tree.create(Throw::new(n()).unwrap());
    let catch = tree.create(Catch::new("error", "e").unwrap());
    let log = tree.create(
        ExpressionStatement::new(Expression::call("log:print", vec![Expression::ident("e")]))
            .unwrap(),
    );
    let ret = tree.create(Return::new(vec![n()]).unwrap());

    let root = tree.root_id();
    tree.append_child(root, main).unwrap();
    tree.append_child(main, loop_).unwrap();
    tree.append_child(loop_, dec).unwrap();
    tree.append_child(loop_, guard).unwrap();
    tree.append_child(guard, stop).unwrap();
    tree.append_child(guard, otherwise).unwrap();
    tree.append_child(otherwise, total).unwrap();
    tree.append_child(main, attempt).unwrap();
    tree.append_child(attempt, throw).unwrap();
    tree.append_child(attempt, catch).unwrap();
    tree.append_child(catch, log).unwrap();
    tree.append_child(main, ret).unwrap();

    Program {
        tree,
        main,
        loop_,
        guard,
        attempt,
    }
}

#[test]
fn full_traversal_counts_every_node() {
    let program = program();
    let mut counter = KindCounter::default();
    let summary = program.tree.root().accept(&mut counter).unwrap();
    assert_eq!(summary.visited, program.tree.len());
    assert_eq!(summary.skipped, 0);
    assert_eq!(counter.counts[&NodeKind::Assignment], 2);
    assert_eq!(counter.counts[&NodeKind::Catch], 1);
}

#[test]
fn skipped_subtree_is_invisible_to_the_visitor() {
    let program = program();
    let mut names = AssignedNames::default();
    let summary = program.tree.root().accept(&mut names).unwrap();
    assert_eq!(names.names, vec!["n", "total"]);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn two_visitors_keep_independent_state() {
    let program = program();
    let mut first = KindCounter::default();
    let mut second = KindCounter::default();
    program.tree.accept(program.loop_, &mut first).unwrap();
    program.tree.root().accept(&mut second).unwrap();
    assert_eq!(first.counts[&NodeKind::While], 1);
    assert_eq!(first.counts.get(&NodeKind::TryCatch), None);
    assert_eq!(second.counts[&NodeKind::TryCatch], 1);
}

#[test]
fn accessors_read_the_child_list() {
    let program = program();
    let tree = &program.tree;
    let main = tree.node(program.main).unwrap();
    let kinds: Vec<NodeKind> = main.statements().iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, vec![NodeKind::While, NodeKind::TryCatch, NodeKind::Return]);

    let guard = tree.node(program.guard).unwrap();
    assert_eq!(guard.statements().len(), 1);
    assert!(guard.else_clause().is_some());
    assert_eq!(guard.condition().map(|c| c.to_string()).as_deref(), Some("n == 3"));
    assert_eq!(guard.depth(), 3);

    let attempt = tree.node(program.attempt).unwrap();
    assert_eq!(attempt.statements().len(), 1);
    assert_eq!(attempt.catch_clause().map(|c| c.kind()), Some(NodeKind::Catch));
}

#[test]
fn malformed_conditional_never_reaches_the_tree() {
    let mut program = program();
    let before = program.tree.len();
    let result = While::new(None);
    assert!(matches!(result, Err(MalformedNodeError::MissingField { .. })));
    assert_eq!(program.tree.len(), before);

    // The rejected payload cannot be inserted because it was never built.
    let ok = program.tree.create(While::new(Expression::boolean(true)).unwrap());
    program.tree.append_child(program.main, ok).unwrap();
}

#[test]
fn every_successful_edit_notifies_once() {
    let mut program = program();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let handle = program
        .tree
        .on_structural_change(move |_, change| sink.borrow_mut().push(change.kind()));

    let tree = &mut program.tree;
    tree.move_child(program.main, 1, program.main, 0).unwrap();
    let removed = tree.remove_child(program.main, 2).unwrap();
    let replacement = tree.create(Return::default());
    tree.replace_child(program.main, 1, replacement).unwrap();
    tree.append_child(program.main, removed).unwrap();
    tree.update(replacement, Return::new(vec![Expression::int(0)]).unwrap().into())
        .unwrap();

    // Rejected: a second else on the guard.
    let extra = tree.create(Else);
    assert!(matches!(
        tree.append_child(program.guard, extra),
        Err(StructuralEditError::ChildOrder { .. })
    ));

    assert_eq!(
        *log.borrow(),
        vec![
            ChangeKind::Moved,
            ChangeKind::Removed,
            ChangeKind::Replaced,
            ChangeKind::Inserted,
            ChangeKind::Updated,
        ]
    );
    assert!(program.tree.unsubscribe(handle));
}

#[test]
fn notification_payload_describes_the_edit() {
    let mut program = program();
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    program
        .tree
        .on_structural_change(move |_, change| sink.borrow_mut().push(change.clone()));

    let removed = program.tree.remove_child(program.main, 0).unwrap();
    assert_eq!(removed, program.loop_);
    assert_eq!(
        changes.borrow().as_slice(),
        &[StructuralChange::Removed {
            parent: program.main,
            index: 0,
            node: program.loop_,
        }]
    );
}

#[test]
fn discarded_subtree_ids_are_dead() {
    let mut program = program();
    let removed = program.tree.remove_child(program.main, 0).unwrap();
    let guard = program.guard;
    assert!(program.tree.contains(guard));

    let freed = program.tree.discard(removed).unwrap();
    assert_eq!(freed, 6);
    assert!(!program.tree.contains(guard));
    assert!(matches!(
        program.tree.accept(guard, &mut KindCounter::default()),
        Err(TraversalError::UnknownNode(_))
    ));
    assert!(matches!(
        program.tree.remove_child(guard, 0),
        Err(StructuralEditError::UnknownNode(_))
    ));
}
