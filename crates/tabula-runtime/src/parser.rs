//! The table-driven parser.

use crate::definition::{ParseAction, ParseTable};

/// A trait for abstracting input token symbols.
pub trait Token {
    /// The qualified key used to look this token up in the ACTION table.
    fn action_key(&self) -> String;
}

/// A node of the produced parse tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseNode<TTok, TSym> {
    /// A leaf pushed by a shift.
    Terminal(TTok),

    /// An interior node pushed by a reduction, labeled with the rule's
    /// left-hand side.
    NonTerminal {
        label: TSym,
        children: Vec<ParseNode<TTok, TSym>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseTree<TTok, TSym> {
    root: ParseNode<TTok, TSym>,
}

impl<TTok, TSym> ParseTree<TTok, TSym> {
    pub fn root(&self) -> &ParseNode<TTok, TSym> {
        &self.root
    }

    pub fn into_root(self) -> ParseNode<TTok, TSym> {
        self.root
    }
}

/// The parser driven by a generated parse table.
///
/// The input stream must be terminated by an explicit end-of-input token;
/// the end token is inspected as a lookahead but never shifted.
pub struct Parser<TDef, TTok>
where
    TDef: ParseTable,
    TTok: Token,
{
    definition: TDef,
    state_stack: Vec<usize>,
    node_stack: Vec<ParseNode<TTok, TDef::Symbol>>,
}

impl<TDef, TTok> Parser<TDef, TTok>
where
    TDef: ParseTable,
    TTok: Token,
{
    /// Create a parser instance using the specified parse table.
    pub fn new(definition: TDef) -> Self {
        let initial = definition.initial_state();
        Self {
            definition,
            state_stack: vec![initial],
            node_stack: Vec::new(),
        }
    }

    /// Drive the table over the token stream until it accepts or fails.
    pub fn parse<I>(mut self, tokens: I) -> Result<ParseTree<TTok, TDef::Symbol>, ParseError>
    where
        I: IntoIterator<Item = TTok>,
    {
        let mut tokens = tokens.into_iter();
        let mut lookahead = tokens.next().ok_or(ParseError::UnexpectedEndOfInput)?;

        loop {
            let state = self.current_state()?;
            match self.definition.action(state, &lookahead.action_key()) {
                ParseAction::Shift(next) => {
                    self.node_stack.push(ParseNode::Terminal(lookahead));
                    self.state_stack.push(next);
                    lookahead = tokens.next().ok_or(ParseError::UnexpectedEndOfInput)?;
                }

                ParseAction::Reduce { lhs, arity, .. } => {
                    let mut children = Vec::with_capacity(arity);
                    for _ in 0..arity {
                        self.state_stack.pop().ok_or(ParseError::EmptyStateStack)?;
                        children.push(self.node_stack.pop().ok_or(ParseError::EmptyNodeStack)?);
                    }
                    children.reverse();

                    let state = self.current_state()?;
                    let next = self
                        .definition
                        .goto(state, &lhs)
                        .ok_or(ParseError::MissingGoto { state })?;
                    self.node_stack.push(ParseNode::NonTerminal {
                        label: lhs,
                        children,
                    });
                    self.state_stack.push(next);
                }

                ParseAction::Accept => {
                    let root = self.node_stack.pop().ok_or(ParseError::EmptyNodeStack)?;
                    return Ok(ParseTree { root });
                }

                ParseAction::Error => {
                    return Err(ParseError::Syntax {
                        state,
                        token: lookahead.action_key(),
                    });
                }
            }
        }
    }

    fn current_state(&self) -> Result<usize, ParseError> {
        self.state_stack
            .last()
            .copied()
            .ok_or(ParseError::EmptyStateStack)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token `{token}' in state {state}")]
    Syntax { state: usize, token: String },

    #[error("token stream ended before the end-of-input terminal")]
    UnexpectedEndOfInput,

    #[error("no goto transition from state {state}")]
    MissingGoto { state: usize },

    #[error("empty state stack")]
    EmptyStateStack,

    #[error("empty node stack")]
    EmptyNodeStack,
}
