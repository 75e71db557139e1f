//! ACTION/GOTO table construction.

use crate::first_sets::FirstSets;
use crate::follow_sets::FollowSets;
use crate::grammar::{Grammar, NonTerminal, Terminal, Token};
use crate::lr1::{Automaton, ItemSets};
use crate::types::Map;
use tabula_runtime::definition::{ParseAction, ParseTable};

/// A single ACTION table entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    /// Consume the lookahead and enter the given state.
    Shift(usize),
    /// Rewind the stack by the given rule and push its left-hand side.
    Reduce(usize),
    /// The input has been recognized.
    Accept,
    /// No action is defined: the lookahead is a syntax error.
    Error,
}

/// The ACTION table: per state, qualified terminal key to [`Action`].
///
/// Only non-error entries are stored; a missing entry reads as
/// [`Action::Error`].
#[derive(Debug)]
pub struct ActionTable {
    rows: Vec<Map<String, Action>>,
}

impl ActionTable {
    pub fn action(&self, state: usize, key: &str) -> Action {
        self.rows
            .get(state)
            .and_then(|row| row.get(key))
            .copied()
            .unwrap_or(Action::Error)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The stored entries of one state's row.
    pub fn row(&self, state: usize) -> impl Iterator<Item = (&str, Action)> {
        self.rows
            .get(state)
            .into_iter()
            .flatten()
            .map(|(key, action)| (key.as_str(), *action))
    }
}

/// The GOTO table: per state, nonterminal to successor state. Entries are
/// omitted where no transition exists.
#[derive(Debug)]
pub struct GotoTable {
    rows: Vec<Map<NonTerminal, usize>>,
}

impl GotoTable {
    pub fn target(&self, state: usize, symbol: &NonTerminal) -> Option<usize> {
        self.rows
            .get(state)
            .and_then(|row| row.get(symbol))
            .copied()
    }

    pub fn row(&self, state: usize) -> impl Iterator<Item = (&NonTerminal, usize)> {
        self.rows
            .get(state)
            .into_iter()
            .flatten()
            .map(|(symbol, target)| (symbol, *target))
    }
}

/// The grammar demanded two incompatible actions for the same state and
/// lookahead: it is not LR(1). Construction stops at the first conflict.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("provided grammar is ambiguous (shift/reduce conflict on token: {key})")]
    ShiftReduce { key: String },

    #[error("provided grammar is ambiguous (shift/shift conflict on token: {key})")]
    ShiftShift { key: String },

    #[error("provided grammar is ambiguous (reduce/reduce conflict on token: {key})")]
    ReduceReduce { key: String },
}

/// Drives table generation for one grammar.
///
/// Owning the grammar here and consuming `self` in [`generate`] keeps the
/// pipeline single-shot: the derived tables only exist on the success
/// value, and re-running means constructing a new generator.
///
/// [`generate`]: ParserGenerator::generate
#[derive(Debug)]
pub struct ParserGenerator {
    grammar: Grammar,
}

impl ParserGenerator {
    /// Takes ownership of the grammar and adds the end-of-input terminal
    /// to its vocabulary.
    pub fn new(mut grammar: Grammar) -> Self {
        grammar.inject_end_terminal();
        Self { grammar }
    }

    /// Runs FIRST, FOLLOW, the canonical collection, and ACTION/GOTO
    /// construction, in that order.
    pub fn generate(self) -> Result<ParserTables, GenerateError> {
        let grammar = self.grammar;
        tracing::debug!(rules = grammar.rules().len(), "generating parse tables");

        let first = FirstSets::new(&grammar);
        let follow = FollowSets::new(&grammar, &first);
        let automaton = Automaton::generate(&grammar, &first);

        let sets = ItemSets::new(&grammar, &first);
        let actions = build_action_table(&sets, &automaton)?;
        let gotos = build_goto_table(&grammar, &sets, &automaton);
        tracing::debug!(states = automaton.len(), "parse tables generated");

        Ok(ParserTables {
            grammar,
            follow,
            automaton,
            actions,
            gotos,
        })
    }
}

/// The output of a successful [`ParserGenerator::generate`] run.
#[derive(Debug)]
pub struct ParserTables {
    grammar: Grammar,
    follow: FollowSets,
    automaton: Automaton,
    actions: ActionTable,
    gotos: GotoTable,
}

impl ParserTables {
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn action_table(&self) -> &ActionTable {
        &self.actions
    }

    pub fn goto_table(&self) -> &GotoTable {
        &self.gotos
    }

    /// FOLLOW sets, exported for diagnostics; table construction does not
    /// consume them.
    pub fn follow_sets(&self) -> &FollowSets {
        &self.follow
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }
}

impl ParseTable for ParserTables {
    type Symbol = NonTerminal;

    fn initial_state(&self) -> usize {
        0
    }

    fn action(&self, state: usize, key: &str) -> ParseAction<NonTerminal> {
        match self.actions.action(state, key) {
            Action::Shift(next) => ParseAction::Shift(next),
            Action::Reduce(rule) => {
                let reduced = &self.grammar[rule];
                ParseAction::Reduce {
                    rule,
                    lhs: reduced.lhs().clone(),
                    arity: reduced.arity(),
                }
            }
            Action::Accept => ParseAction::Accept,
            Action::Error => ParseAction::Error,
        }
    }

    fn goto(&self, state: usize, symbol: &NonTerminal) -> Option<usize> {
        self.gotos.target(state, symbol)
    }
}

fn build_action_table(
    sets: &ItemSets<'_>,
    automaton: &Automaton,
) -> Result<ActionTable, GenerateError> {
    let mut rows: Vec<Map<String, Action>> = vec![Map::default(); automaton.len()];

    for (index, state) in automaton.states().enumerate() {
        let row = &mut rows[index];
        for item in state {
            match sets.next_token(item) {
                Some(Token::Terminal(next)) if next.is_epsilon() => {
                    // An epsilon body reduces without consuming input; the
                    // trigger is the item's own lookahead.
                    insert_reduce(row, item.lookahead.qual_name(), Action::Reduce(item.rule))?;
                }
                Some(token @ Token::Terminal(next)) => {
                    let target = sets.goto(state, token);
                    // Every goto target was registered while the collection
                    // grew; state 0 is the documented fallback should the
                    // lookup ever miss.
                    let target = automaton.index_of(&target).unwrap_or(0);
                    insert_shift(row, next.qual_name(), target)?;
                }
                Some(Token::NonTerminal(_)) => {}
                None => {
                    if item.rule != 0 {
                        insert_reduce(row, item.lookahead.qual_name(), Action::Reduce(item.rule))?;
                    } else {
                        // The augmented start rule is exhausted.
                        insert_reduce(
                            row,
                            Terminal::end_of_input().qual_name(),
                            Action::Accept,
                        )?;
                    }
                }
            }
        }
    }

    Ok(ActionTable { rows })
}

fn insert_shift(
    row: &mut Map<String, Action>,
    key: String,
    target: usize,
) -> Result<(), GenerateError> {
    match row.get(&key) {
        Some(Action::Reduce(_)) => return Err(GenerateError::ShiftReduce { key }),
        Some(Action::Shift(existing)) if *existing != target => {
            return Err(GenerateError::ShiftShift { key });
        }
        _ => {}
    }
    row.insert(key, Action::Shift(target));
    Ok(())
}

fn insert_reduce(
    row: &mut Map<String, Action>,
    key: String,
    action: Action,
) -> Result<(), GenerateError> {
    match (row.get(&key), action) {
        (Some(Action::Shift(_)), _) => return Err(GenerateError::ShiftReduce { key }),
        (Some(Action::Reduce(existing)), Action::Reduce(rule)) if *existing != rule => {
            return Err(GenerateError::ReduceReduce { key });
        }
        (Some(Action::Reduce(_)), Action::Accept) => {
            return Err(GenerateError::ReduceReduce { key });
        }
        _ => {}
    }
    row.insert(key, action);
    Ok(())
}

fn build_goto_table(grammar: &Grammar, sets: &ItemSets<'_>, automaton: &Automaton) -> GotoTable {
    let mut rows: Vec<Map<NonTerminal, usize>> = vec![Map::default(); automaton.len()];

    for (index, state) in automaton.states().enumerate() {
        for token in grammar.tokens() {
            let Token::NonTerminal(symbol) = token else {
                continue;
            };
            let target = sets.goto(state, token);
            if let Some(target) = automaton.index_of(&target) {
                rows[index].insert(symbol.clone(), target);
            }
        }
    }

    GotoTable { rows }
}
