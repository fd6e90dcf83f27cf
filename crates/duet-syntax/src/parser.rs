//! Source builder: statement-language text to [`Tree`].
//!
//! Parsing happens in two steps. The winnow grammar produces drafts (payloads
//! plus the position they came from), then the drafts are lowered into a tree
//! through the ordinary mutation API, so a built tree obeys exactly the same
//! layout rules as an edited one.
//!
//! ## Grammar
//!
//! ```text
//! unit       := ("package" qualified ";")? (comment | function)*
//! function   := "function" ident "(" params? ")" returns? block
//! returns    := "(" type ("," type)* ")"
//! params     := type ident ("," type ident)*
//! block      := "{" statement* "}"
//! statement  := comment | if | while | try | block
//!             | "break" ";" | "continue" ";"
//!             | "return" (expr ("," expr)*)? ";"
//!             | "reply" expr ";" | "throw" expr ";"
//!             | type ident ("=" expr)? ";"
//!             | expr "=" expr ";" | expr ";"
//! if         := "if" "(" expr ")" block ("else" "if" "(" expr ")" block)* ("else" block)?
//! while      := "while" "(" expr ")" block
//! try        := "try" block "catch" "(" type ident ")" block
//! comment    := "//" <rest of line>
//! ```
//!
//! ## Expressions
//!
//! ```text
//! expr       := or
//! or         := and ("||" and)*
//! and        := equality ("&&" equality)*
//! equality   := comparison (("==" | "!=") comparison)*
//! comparison := additive (("<=" | ">=" | "<" | ">") additive)*
//! additive   := term (("+" | "-") term)*
//! term       := unary (("*" | "/" | "%") unary)*
//! unary      := ("!" | "-") unary | postfix
//! postfix    := primary ("." ident | "[" expr "]")*
//! primary    := "(" expr ")" | string | number | "true" | "false" | "null"
//!             | qualified "(" (expr ("," expr)*)? ")" | ident
//! ```
//!
//! A minus sign written directly before digits belongs to the number, so
//! `-1` is the literal `-1`, while `-(1)` and `- 1` negate the literal `1`.
//! Number literals take postfix suffixes like any other primary.

use duet_core::ast::{
    Assignment, BinaryOp, Block, Break, Catch, Comment, CompilationUnit, Continue, Else, ElseIf,
    Expression, ExpressionStatement, Function, If, Parameter, Reply, Return, Throw, TryCatch,
    UnaryOp, VariableDefinition, While, KEYWORDS,
};
use duet_core::{MalformedNodeError, NodeData, NodeId, Tree};
use tracing::debug;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{
    alt, cut_err, delimited, eof, fail, opt, preceded, repeat, separated, terminated,
};
use winnow::error::{ContextError, ErrMode, ParserError, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_till, take_while};
use winnow::ModalResult;

use crate::error::ParseError;

/// A parsed node, not yet placed in a tree.
struct Draft {
    /// Length of the input remaining where the node starts.
    rest: usize,
    data: Result<NodeData, MalformedNodeError>,
    children: Vec<Draft>,
}

impl Draft {
    fn new(
        rest: usize,
        data: Result<impl Into<NodeData>, MalformedNodeError>,
        children: Vec<Draft>,
    ) -> Self {
        Self {
            rest,
            data: data.map(Into::into),
            children,
        }
    }

    fn leaf(rest: usize, data: Result<impl Into<NodeData>, MalformedNodeError>) -> Self {
        Self::new(rest, data, Vec::new())
    }
}

struct UnitDraft {
    rest: usize,
    unit: Result<CompilationUnit, MalformedNodeError>,
    items: Vec<Draft>,
}

/// Parse `source` into a tree.
///
/// # Examples
///
/// ```
/// use duet_syntax::build_tree;
/// use duet_core::NodeKind;
///
/// let tree = build_tree("function main() { while (true) { break; } }").unwrap();
/// let main = tree.root().child(0).unwrap();
/// assert_eq!(main.kind(), NodeKind::Function);
/// assert_eq!(main.child(0).unwrap().kind(), NodeKind::While);
/// ```
pub fn build_tree(source: &str) -> Result<Tree, ParseError> {
    let draft = unit
        .parse(source)
        .map_err(|e| ParseError::at(source, e.offset(), describe(e.inner())))?;

    let offset = source.len() - draft.rest;
    let unit = draft
        .unit
        .map_err(|err| ParseError::at(source, offset, err.to_string()))?;
    let mut tree = Tree::new(unit);
    let root = tree.root_id();
    for item in draft.items {
        attach(&mut tree, source, root, item)?;
    }

    debug!(nodes = tree.len(), "built tree from source");
    Ok(tree)
}

/// Parse a standalone expression.
pub fn parse_expression(source: &str) -> Result<Expression, ParseError> {
    terminated(expression, ws)
        .parse(source)
        .map_err(|e| ParseError::at(source, e.offset(), describe(e.inner())))
}

fn attach(
    tree: &mut Tree,
    source: &str,
    parent: NodeId,
    draft: Draft,
) -> Result<NodeId, ParseError> {
    let offset = source.len() - draft.rest;
    let data = draft
        .data
        .map_err(|err| ParseError::at(source, offset, err.to_string()))?;
    let id = tree.create(data);
    tree.append_child(parent, id)
        .map_err(|err| ParseError::at(source, offset, err.to_string()))?;
    for child in draft.children {
        attach(tree, source, id, child)?;
    }
    Ok(id)
}

/// Flatten a winnow context error into one line.
fn describe(error: &ContextError) -> String {
    let text = error.to_string();
    let message = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ");
    if message.is_empty() {
        "unexpected input".to_string()
    } else {
        message
    }
}

// ============================================================================
// Tokens
// ============================================================================

fn ws<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    multispace0.parse_next(input)
}

/// `text`, after optional whitespace.
fn symbol<'s>(text: &'static str) -> impl FnMut(&mut &'s str) -> ModalResult<&'s str> {
    move |input: &mut &'s str| preceded(ws, text).parse_next(input)
}

/// The character `c`, after optional whitespace, reported as expected on failure.
fn expect<'s>(c: char) -> impl FnMut(&mut &'s str) -> ModalResult<char> {
    move |input: &mut &'s str| {
        preceded(ws, c)
            .context(StrContext::Expected(StrContextValue::CharLiteral(c)))
            .parse_next(input)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn word<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_while(1.., is_word_char).parse_next(input)
}

/// A whole word equal to `expected` (so `if` never matches `iffy`).
fn keyword<'s>(expected: &'static str) -> impl FnMut(&mut &'s str) -> ModalResult<()> {
    move |input: &mut &'s str| {
        let checkpoint = *input;
        let found = word(input)?;
        if found == expected {
            Ok(())
        } else {
            *input = checkpoint;
            Err(ErrMode::from_input(input))
        }
    }
}

fn identifier<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let checkpoint = *input;
    let found = word(input)?;
    let leading_digit = found.starts_with(|c: char| c.is_ascii_digit());
    if leading_digit || KEYWORDS.contains(&found) {
        *input = checkpoint;
        return Err(ErrMode::from_input(input));
    }
    Ok(found)
}

/// `name` or `pkg:name`.
fn qualified_name<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (identifier, opt((':', identifier)))
        .take()
        .parse_next(input)
}

fn array_suffixes(input: &mut &str) -> ModalResult<()> {
    repeat(0.., "[]").parse_next(input)
}

/// A qualified name with optional `[]` suffixes.
fn type_name<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (qualified_name, array_suffixes).take().parse_next(input)
}

fn package_name<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    take_while(1.., |c: char| is_word_char(c) || c == '.').parse_next(input)
}

fn comment_text<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    preceded("//", take_till(0.., ['\n', '\r'])).parse_next(input)
}

fn end_of_input(input: &mut &str) -> ModalResult<()> {
    eof.void()
        .context(StrContext::Expected(StrContextValue::Description(
            "function or comment",
        )))
        .parse_next(input)
}

// ============================================================================
// Expressions
// ============================================================================

type OperatorTable = &'static [(&'static str, BinaryOp)];

const OR: OperatorTable = &[("||", BinaryOp::Or)];
const AND: OperatorTable = &[("&&", BinaryOp::And)];
const EQUALITY: OperatorTable = &[("==", BinaryOp::Eq), ("!=", BinaryOp::Ne)];
// two-character operators first
const COMPARISON: OperatorTable = &[
    ("<=", BinaryOp::Le),
    (">=", BinaryOp::Ge),
    ("<", BinaryOp::Lt),
    (">", BinaryOp::Gt),
];
const ADDITIVE: OperatorTable = &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)];
const MULTIPLICATIVE: OperatorTable = &[
    ("*", BinaryOp::Mul),
    ("/", BinaryOp::Div),
    ("%", BinaryOp::Mod),
];

fn operator<'s>(table: OperatorTable) -> impl FnMut(&mut &'s str) -> ModalResult<BinaryOp> {
    move |input: &mut &'s str| {
        let checkpoint = *input;
        ws(input)?;
        let current: &'s str = *input;
        for &(text, op) in table {
            if let Some(rest) = current.strip_prefix(text) {
                *input = rest;
                return Ok(op);
            }
        }
        *input = checkpoint;
        Err(ErrMode::from_input(input))
    }
}

/// One left-associative precedence level.
fn binary_level<'s>(
    input: &mut &'s str,
    table: OperatorTable,
    operand: fn(&mut &'s str) -> ModalResult<Expression>,
) -> ModalResult<Expression> {
    let first = operand(input)?;
    let rest: Vec<(BinaryOp, Expression)> =
        repeat(0.., (operator(table), cut_err(operand))).parse_next(input)?;
    Ok(rest
        .into_iter()
        .fold(first, |lhs, (op, rhs)| Expression::binary(op, lhs, rhs)))
}

pub(crate) fn expression(input: &mut &str) -> ModalResult<Expression> {
    binary_level(input, OR, and_expr)
}

fn and_expr(input: &mut &str) -> ModalResult<Expression> {
    binary_level(input, AND, equality)
}

fn equality(input: &mut &str) -> ModalResult<Expression> {
    binary_level(input, EQUALITY, comparison)
}

fn comparison(input: &mut &str) -> ModalResult<Expression> {
    binary_level(input, COMPARISON, additive)
}

fn additive(input: &mut &str) -> ModalResult<Expression> {
    binary_level(input, ADDITIVE, term)
}

fn term(input: &mut &str) -> ModalResult<Expression> {
    binary_level(input, MULTIPLICATIVE, unary)
}

fn unary(input: &mut &str) -> ModalResult<Expression> {
    ws(input)?;
    alt((
        preceded('!', cut_err(unary)).map(|operand| Expression::unary(UnaryOp::Not, operand)),
        postfix,
        preceded('-', cut_err(unary)).map(|operand| Expression::unary(UnaryOp::Neg, operand)),
    ))
    .parse_next(input)
}

enum Suffix {
    Field(String),
    Index(Expression),
}

fn postfix(input: &mut &str) -> ModalResult<Expression> {
    let target = primary(input)?;
    let suffixes: Vec<Suffix> = repeat(
        0..,
        alt((
            preceded(symbol("."), cut_err(identifier))
                .map(|name: &str| Suffix::Field(name.to_string())),
            preceded(symbol("["), cut_err(terminated(expression, expect(']'))))
                .map(Suffix::Index),
        )),
    )
    .parse_next(input)?;
    Ok(suffixes
        .into_iter()
        .fold(target, |target, suffix| match suffix {
            Suffix::Field(name) => Expression::field(target, name),
            Suffix::Index(index) => Expression::index(target, index),
        }))
}

fn primary(input: &mut &str) -> ModalResult<Expression> {
    ws(input)?;
    alt((
        delimited('(', cut_err(expression), cut_err(expect(')'))),
        string_literal,
        number,
        keyword("true").value(Expression::boolean(true)),
        keyword("false").value(Expression::boolean(false)),
        keyword("null").value(Expression::null()),
        call,
        identifier.map(Expression::ident),
        fail.context(StrContext::Expected(StrContextValue::Description(
            "expression",
        ))),
    ))
    .parse_next(input)
}

fn call(input: &mut &str) -> ModalResult<Expression> {
    let target = qualified_name(input)?;
    symbol("(").parse_next(input)?;
    let args: Vec<Expression> = separated(0.., expression, symbol(",")).parse_next(input)?;
    cut_err(expect(')')).parse_next(input)?;
    Ok(Expression::call(target, args))
}

fn number(input: &mut &str) -> ModalResult<Expression> {
    alt((
        float_literal,
        int_literal.context(StrContext::Label("integer literal")),
    ))
    .parse_next(input)
}

fn exponent(input: &mut &str) -> ModalResult<()> {
    (one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)
        .void()
        .parse_next(input)
}

fn float_literal(input: &mut &str) -> ModalResult<Expression> {
    (
        opt('-'),
        digit1,
        alt(((('.', digit1), opt(exponent)).void(), exponent)),
    )
        .take()
        .try_map(|text: &str| text.parse::<f64>())
        .map(Expression::float)
        .parse_next(input)
}

fn int_literal(input: &mut &str) -> ModalResult<Expression> {
    (opt('-'), digit1)
        .take()
        .try_map(|text: &str| text.parse::<i64>())
        .map(Expression::int)
        .parse_next(input)
}

fn string_literal(input: &mut &str) -> ModalResult<Expression> {
    preceded(
        '"',
        cut_err(string_body.context(StrContext::Label("string literal"))),
    )
    .map(Expression::string)
    .parse_next(input)
}

fn next_char(input: &mut &str) -> ModalResult<char> {
    any.parse_next(input)
}

/// Characters up to the closing quote, with `\" \\ \n \t` escapes.
fn string_body(input: &mut &str) -> ModalResult<String> {
    let mut text = String::new();
    loop {
        match next_char(input)? {
            '"' => return Ok(text),
            '\\' => {
                let escaped = match next_char(input)? {
                    'n' => '\n',
                    't' => '\t',
                    '"' => '"',
                    '\\' => '\\',
                    _ => return Err(ErrMode::from_input(input)),
                };
                text.push(escaped);
            }
            '\n' => return Err(ErrMode::from_input(input)),
            c => text.push(c),
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

fn statement(input: &mut &str) -> ModalResult<Draft> {
    ws(input)?;
    alt((
        comment,
        if_stmt,
        while_stmt,
        try_stmt,
        block_stmt,
        jump_stmt,
        return_stmt,
        reply_stmt,
        throw_stmt,
        variable_def,
        expression_stmt,
    ))
    .parse_next(input)
}

fn comment(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    let text = comment_text(input)?;
    Ok(Draft::leaf(rest, Comment::new(text)))
}

fn body(input: &mut &str) -> ModalResult<Vec<Draft>> {
    symbol("{").parse_next(input)?;
    block_contents(input)
}

/// A block that must be present.
fn required_body(input: &mut &str) -> ModalResult<Vec<Draft>> {
    cut_err(expect('{')).parse_next(input)?;
    block_contents(input)
}

/// Statements up to and including the closing brace.
fn block_contents(input: &mut &str) -> ModalResult<Vec<Draft>> {
    let statements: Vec<Draft> = repeat(0.., statement).parse_next(input)?;
    cut_err(expect('}')).parse_next(input)?;
    Ok(statements)
}

/// `( expr )` after a keyword.
fn condition(input: &mut &str) -> ModalResult<Expression> {
    cut_err(delimited(expect('('), expression, expect(')'))).parse_next(input)
}

fn block_stmt(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    let statements = body(input)?;
    Ok(Draft::new(rest, Ok(Block), statements))
}

fn if_stmt(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    keyword("if").parse_next(input)?;
    let test = condition(input)?;
    let mut children = required_body(input)?;

    loop {
        let checkpoint = *input;
        ws(input)?;
        let clause_rest = input.len();
        if opt(keyword("else")).parse_next(input)?.is_none() {
            *input = checkpoint;
            break;
        }
        if opt(preceded(ws, keyword("if"))).parse_next(input)?.is_some() {
            let clause_test = condition(input)?;
            let statements = required_body(input)?;
            children.push(Draft::new(clause_rest, ElseIf::new(clause_test), statements));
        } else {
            let statements = required_body(input)?;
            children.push(Draft::new(clause_rest, Ok(Else), statements));
            break;
        }
    }

    Ok(Draft::new(rest, If::new(test), children))
}

fn while_stmt(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    keyword("while").parse_next(input)?;
    let test = condition(input)?;
    let statements = required_body(input)?;
    Ok(Draft::new(rest, While::new(test), statements))
}

fn try_stmt(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    keyword("try").parse_next(input)?;
    let mut children = required_body(input)?;

    ws(input)?;
    let catch_rest = input.len();
    cut_err(keyword("catch").context(StrContext::Expected(StrContextValue::StringLiteral("catch"))))
        .parse_next(input)?;
    let (_, catch_type, variable, _) = cut_err((
        expect('('),
        preceded(ws, type_name),
        preceded(ws, identifier),
        expect(')'),
    ))
    .parse_next(input)?;
    let statements = required_body(input)?;
    children.push(Draft::new(catch_rest, Catch::new(catch_type, variable), statements));

    Ok(Draft::new(rest, Ok(TryCatch), children))
}

fn jump_stmt(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    let data = alt((
        keyword("break").value(NodeData::from(Break)),
        keyword("continue").value(NodeData::from(Continue)),
    ))
    .parse_next(input)?;
    cut_err(expect(';')).parse_next(input)?;
    Ok(Draft::leaf(rest, Ok(data)))
}

fn return_stmt(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    keyword("return").parse_next(input)?;
    let values: Vec<Expression> = separated(0.., expression, symbol(",")).parse_next(input)?;
    cut_err(expect(';')).parse_next(input)?;
    Ok(Draft::leaf(rest, Return::new(values)))
}

fn reply_stmt(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    keyword("reply").parse_next(input)?;
    let value = cut_err(terminated(expression, expect(';'))).parse_next(input)?;
    Ok(Draft::leaf(rest, Reply::new(value)))
}

fn throw_stmt(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    keyword("throw").parse_next(input)?;
    let value = cut_err(terminated(expression, expect(';'))).parse_next(input)?;
    Ok(Draft::leaf(rest, Throw::new(value)))
}

fn variable_def(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    let (var_type, name) = (type_name, preceded(ws, identifier)).parse_next(input)?;
    let initializer = opt(preceded(symbol("="), cut_err(expression))).parse_next(input)?;
    cut_err(expect(';')).parse_next(input)?;
    Ok(Draft::leaf(
        rest,
        VariableDefinition::new(var_type, name, initializer),
    ))
}

fn expression_stmt(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    let target = expression(input)?;
    let value = opt(preceded(symbol("="), cut_err(expression))).parse_next(input)?;
    cut_err(expect(';')).parse_next(input)?;
    let data = match value {
        Some(value) => Assignment::new(target, value).map(NodeData::from),
        None => ExpressionStatement::new(target).map(NodeData::from),
    };
    Ok(Draft::leaf(rest, data))
}

// ============================================================================
// Top level
// ============================================================================

fn function(input: &mut &str) -> ModalResult<Draft> {
    let rest = input.len();
    keyword("function").parse_next(input)?;
    let name = cut_err(
        preceded(ws, identifier).context(StrContext::Expected(StrContextValue::Description(
            "function name",
        ))),
    )
    .parse_next(input)?;

    cut_err(expect('(')).parse_next(input)?;
    let params: Vec<(&str, &str)> = separated(
        0..,
        (preceded(ws, type_name), preceded(ws, identifier)),
        symbol(","),
    )
    .parse_next(input)?;
    cut_err(expect(')')).parse_next(input)?;

    let returns: Option<Vec<&str>> = opt(delimited(
        symbol("("),
        cut_err(separated(1.., preceded(ws, type_name), symbol(","))),
        cut_err(expect(')')),
    ))
    .parse_next(input)?;
    let statements = required_body(input)?;

    let data = params
        .into_iter()
        .map(|(param_type, param_name)| Parameter::new(param_type, param_name))
        .collect::<Result<Vec<_>, _>>()
        .and_then(|params| {
            let returns = returns
                .unwrap_or_default()
                .into_iter()
                .map(str::to_string)
                .collect();
            Function::new(name, params, returns)
        });
    Ok(Draft::new(rest, data, statements))
}

fn unit(input: &mut &str) -> ModalResult<UnitDraft> {
    ws(input)?;
    let rest = input.len();
    let package = opt(preceded(
        keyword("package"),
        cut_err(terminated(preceded(ws, package_name), expect(';'))),
    ))
    .parse_next(input)?;
    let items: Vec<Draft> = repeat(0.., preceded(ws, alt((comment, function)))).parse_next(input)?;
    ws(input)?;
    end_of_input(input)?;

    Ok(UnitDraft {
        rest,
        unit: CompilationUnit::new(package.map(str::to_string)),
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use duet_core::NodeKind;

    fn kinds(tree: &Tree) -> Vec<NodeKind> {
        duet_core::visitor::PreorderCollector::collect(tree.root())
            .unwrap()
            .into_iter()
            .map(|id| tree.node(id).unwrap().kind())
            .collect()
    }

    // =========================================================================
    // Expression Tests
    // =========================================================================

    #[test]
    fn test_parse_precedence() {
        let expr = parse_expression("a + b * c").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                BinaryOp::Add,
                Expression::ident("a"),
                Expression::binary(BinaryOp::Mul, Expression::ident("b"), Expression::ident("c"))
            )
        );
    }

    #[test]
    fn test_parse_left_associative() {
        let expr = parse_expression("a - b - c").unwrap();
        assert_eq!(expr.to_string(), "a - b - c");
        match expr {
            Expression::Binary { lhs, .. } => assert!(matches!(*lhs, Expression::Binary { .. })),
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse_expression("42").unwrap(), Expression::int(42));
        assert_eq!(parse_expression("-7").unwrap(), Expression::int(-7));
        assert_eq!(parse_expression("1.5").unwrap(), Expression::float(1.5));
        assert_eq!(parse_expression("2e3").unwrap(), Expression::float(2000.0));
        assert_eq!(
            parse_expression(r#""a \"b\"\n""#).unwrap(),
            Expression::string("a \"b\"\n")
        );
        assert_eq!(parse_expression("true").unwrap(), Expression::boolean(true));
        assert_eq!(parse_expression("null").unwrap(), Expression::null());
        assert_eq!(
            parse_expression("-9223372036854775808").unwrap(),
            Expression::int(i64::MIN)
        );
    }

    #[test]
    fn test_negation_is_not_a_literal() {
        let neg = |e| Expression::unary(UnaryOp::Neg, e);
        assert_eq!(parse_expression("- 7").unwrap(), neg(Expression::int(7)));
        assert_eq!(parse_expression("-(7)").unwrap(), neg(Expression::int(7)));
        assert_eq!(parse_expression("-(-7)").unwrap(), neg(Expression::int(-7)));
        assert_eq!(parse_expression("-(1.5)").unwrap(), neg(Expression::float(1.5)));
        assert_eq!(parse_expression("--x").unwrap(), neg(neg(Expression::ident("x"))));
        assert_eq!(
            parse_expression("a - -7").unwrap(),
            Expression::binary(BinaryOp::Sub, Expression::ident("a"), Expression::int(-7))
        );
    }

    #[test]
    fn test_number_literals_take_suffixes() {
        assert_eq!(
            parse_expression("3.y").unwrap(),
            Expression::field(Expression::int(3), "y")
        );
        assert_eq!(
            parse_expression("-1[0]").unwrap(),
            Expression::index(Expression::int(-1), Expression::int(0))
        );
        assert_eq!(
            parse_expression("1.5.x").unwrap(),
            Expression::field(Expression::float(1.5), "x")
        );
        assert_eq!(
            parse_expression("-(1[0])").unwrap(),
            Expression::unary(
                UnaryOp::Neg,
                Expression::index(Expression::int(1), Expression::int(0))
            )
        );
    }

    #[test]
    fn test_parse_calls_and_postfix() {
        let expr = parse_expression("io:println(xs[0].name, f())").unwrap();
        assert_eq!(
            expr,
            Expression::call(
                "io:println",
                vec![
                    Expression::field(
                        Expression::index(Expression::ident("xs"), Expression::int(0)),
                        "name"
                    ),
                    Expression::call("f", vec![]),
                ]
            )
        );
    }

    #[test]
    fn test_parse_unary_and_grouping() {
        let expr = parse_expression("!(a && b) || -c").unwrap();
        assert_eq!(expr.to_string(), "!(a && b) || -c");
    }

    #[test]
    fn test_identifier_prefix_of_keyword() {
        assert_eq!(parse_expression("iffy").unwrap(), Expression::ident("iffy"));
        assert_eq!(parse_expression("nullable").unwrap(), Expression::ident("nullable"));
    }

    #[test]
    fn test_parse_expression_errors() {
        assert!(parse_expression("a +").is_err());
        assert!(parse_expression("f(a").is_err());
        assert!(parse_expression("\"open").is_err());
        assert!(parse_expression("while").is_err());
    }

    // =========================================================================
    // Statement Tests
    // =========================================================================

    #[test]
    fn test_build_empty_unit() {
        let tree = build_tree("").unwrap();
        assert_eq!(tree.len(), 1);
        let tree = build_tree("package samples.echo;").unwrap();
        match tree.root().data() {
            NodeData::CompilationUnit(unit) => assert_eq!(unit.package(), Some("samples.echo")),
            other => panic!("unexpected root {other:?}"),
        }
    }

    #[test]
    fn test_build_function_signature() {
        let tree = build_tree("function add(int a, int b) (int) { return a + b; }").unwrap();
        let f = tree.root().child(0).unwrap();
        match f.data() {
            NodeData::Function(func) => {
                assert_eq!(func.name(), "add");
                assert_eq!(func.params().len(), 2);
                assert_eq!(func.params()[1].name(), "b");
                assert_eq!(func.return_types(), &["int".to_string()]);
            }
            other => panic!("unexpected node {other:?}"),
        }
        assert_eq!(f.child(0).unwrap().kind(), NodeKind::Return);
    }

    #[test]
    fn test_build_if_chain() {
        let tree = build_tree(
            "function f() { if (a) { x = 1; } else if (b) { x = 2; } else if (c) { } else { x = 3; } }",
        )
        .unwrap();
        assert_eq!(
            kinds(&tree),
            vec![
                NodeKind::CompilationUnit,
                NodeKind::Function,
                NodeKind::If,
                NodeKind::Assignment,
                NodeKind::ElseIf,
                NodeKind::Assignment,
                NodeKind::ElseIf,
                NodeKind::Else,
                NodeKind::Assignment,
            ]
        );
    }

    #[test]
    fn test_build_try_catch_and_statements() {
        let source = r#"
            function main() {
                // setup
                string[] names = ["unused"];
            }
        "#;
        // array literals are not part of the language
        assert!(build_tree(source).is_err());

        let source = r#"
            // leading comment
            function main() {
                // setup
                string[] names;
                int count = 0;
                try {
                    log:print("go");
                    throw err;
                } catch (error e) {
                    reply e.message;
                }
                {
                    continue;
                }
            }
        "#;
        let tree = build_tree(source).unwrap();
        assert_eq!(
            kinds(&tree),
            vec![
                NodeKind::CompilationUnit,
                NodeKind::Comment,
                NodeKind::Function,
                NodeKind::Comment,
                NodeKind::VariableDefinition,
                NodeKind::VariableDefinition,
                NodeKind::TryCatch,
                NodeKind::ExpressionStatement,
                NodeKind::Throw,
                NodeKind::Catch,
                NodeKind::Reply,
                NodeKind::Block,
                NodeKind::Continue,
            ]
        );
    }

    #[test]
    fn test_error_position() {
        let err = build_tree("function main() {\n    x = ;\n}").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 9);
    }

    #[test]
    fn test_missing_brace_is_reported() {
        let err = build_tree("function main() {\n    break;\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains('}'), "message: {}", err.message);
    }

    #[test]
    fn test_malformed_node_reported_at_statement() {
        let err = build_tree("function main() {\n  a + b = 1;\n}").unwrap_err();
        assert_eq!((err.line, err.column), (2, 3));
        assert!(err.message.contains("assign"), "message: {}", err.message);

        let err = build_tree("function main() {\n  x + 1;\n}").unwrap_err();
        assert_eq!((err.line, err.column), (2, 3));
    }

    #[test]
    fn test_duplicate_parameter_is_malformed() {
        let err = build_tree("function f(int a, int a) { }").unwrap_err();
        assert_eq!((err.line, err.column), (1, 1));
    }

    #[test]
    fn test_top_level_statement_rejected() {
        let err = build_tree("break;").unwrap_err();
        assert_eq!((err.line, err.column), (1, 1));
    }
}
