//! Driving the generated tables through the runtime parser.

use tabula::grammar::{NonTerminal, Terminal};
use tabula::{Grammar, ParserGenerator};
use tabula_runtime::{ParseError, ParseNode, Parser};

type Node = ParseNode<Terminal, NonTerminal>;

fn label_of(node: &Node) -> Option<&NonTerminal> {
    match node {
        ParseNode::NonTerminal { label, .. } => Some(label),
        ParseNode::Terminal(_) => None,
    }
}

fn children_of(node: &Node) -> &[Node] {
    match node {
        ParseNode::NonTerminal { children, .. } => children,
        ParseNode::Terminal(_) => &[],
    }
}

#[test]
fn single_token_round_trip() {
    // S := id; parsing `id` is one shift, one reduce, then accept.
    let grammar = Grammar::define(|g| {
        let id = g.terminal("id")?;
        let s = g.nonterminal("S")?;
        g.rule(&s, [id.sym()])?;
        Ok(())
    })
    .unwrap();
    let tables = ParserGenerator::new(grammar).generate().unwrap();

    let tree = Parser::new(&tables)
        .parse([Terminal::new("id"), Terminal::end_of_input()])
        .unwrap();

    let root = tree.root();
    assert_eq!(label_of(root), Some(&NonTerminal::new("S")));
    assert_eq!(children_of(root).len(), 1);
    assert!(matches!(
        &children_of(root)[0],
        ParseNode::Terminal(t) if t == &Terminal::new("id")
    ));
}

#[test]
fn nested_parentheses_round_trip() {
    // S := '(' S ')' | id
    let grammar = Grammar::define(|g| {
        let lparen = g.terminal("(")?;
        let rparen = g.terminal(")")?;
        let id = g.terminal("id")?;
        let s = g.nonterminal("S")?;
        g.rule(&s, [lparen.sym(), s.sym(), rparen.sym()])?;
        g.rule(&s, [id.sym()])?;
        Ok(())
    })
    .unwrap();
    let tables = ParserGenerator::new(grammar).generate().unwrap();

    let tree = Parser::new(&tables)
        .parse([
            Terminal::new("("),
            Terminal::new("id"),
            Terminal::new(")"),
            Terminal::end_of_input(),
        ])
        .unwrap();

    let root = tree.root();
    assert_eq!(label_of(root), Some(&NonTerminal::new("S")));
    let children = children_of(root);
    assert_eq!(children.len(), 3);
    assert!(matches!(&children[0], ParseNode::Terminal(t) if t == &Terminal::new("(")));
    assert_eq!(label_of(&children[1]), Some(&NonTerminal::new("S")));
    assert!(matches!(&children[2], ParseNode::Terminal(t) if t == &Terminal::new(")")));
}

#[test]
fn epsilon_rule_reduces_without_consuming_input() {
    // S := A, A := $eps; an empty stream reduces twice before accepting
    // and never shifts.
    let grammar = Grammar::define(|g| {
        let s = g.nonterminal("S")?;
        let a = g.nonterminal("A")?;
        g.rule(&s, [a.sym()])?;
        g.rule(&a, [Terminal::epsilon().sym()])?;
        Ok(())
    })
    .unwrap();
    let tables = ParserGenerator::new(grammar).generate().unwrap();

    let tree = Parser::new(&tables)
        .parse([Terminal::end_of_input()])
        .unwrap();

    let root = tree.root();
    assert_eq!(label_of(root), Some(&NonTerminal::new("S")));
    let children = children_of(root);
    assert_eq!(children.len(), 1);
    assert_eq!(label_of(&children[0]), Some(&NonTerminal::new("A")));
    assert!(children_of(&children[0]).is_empty());
}

#[test]
fn unexpected_terminal_is_a_syntax_error() {
    let grammar = Grammar::define(|g| {
        let id = g.terminal("id")?;
        let s = g.nonterminal("S")?;
        g.rule(&s, [id.sym()])?;
        Ok(())
    })
    .unwrap();
    let tables = ParserGenerator::new(grammar).generate().unwrap();

    let err = Parser::new(&tables)
        .parse([
            Terminal::new("id"),
            Terminal::new("id"),
            Terminal::end_of_input(),
        ])
        .unwrap_err();
    assert!(matches!(err, ParseError::Syntax { ref token, .. } if token == "T_id"));
}
