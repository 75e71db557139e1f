//! LR(1) items and the canonical collection.

use crate::first_sets::FirstSets;
use crate::grammar::{Grammar, Terminal, Token};
use crate::types::Map;
use crate::util::{display_fn, fixpoint};
use std::{collections::BTreeSet, fmt};

/// A production rule with a marker position and a lookahead terminal.
///
/// The derived order is `(rule, dot, lookahead)`, which is what makes
/// states structurally comparable regardless of how their items were
/// discovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    /// Index of the rule in the grammar.
    pub rule: usize,
    /// Marker position within the rule's production; `0 ..= prod.len()`.
    pub dot: usize,
    pub lookahead: Terminal,
}

impl Item {
    // `"(LHS := R1 . R2 R3) [la]"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let rule = &g[self.rule];
            write!(f, "({} :=", rule.lhs())?;
            for (i, token) in rule.prod().iter().enumerate() {
                if i == self.dot {
                    f.write_str(" .")?;
                }
                write!(f, " {}", token)?;
            }
            if self.dot == rule.prod().len() {
                f.write_str(" .")?;
            }
            write!(f, ") [{}]", self.lookahead)
        })
    }
}

/// A deduplicated, ordered set of items. Two states holding the same
/// items are identical by structural equality.
pub type State = BTreeSet<Item>;

/// Closure and goto over a grammar and its FIRST sets.
pub(crate) struct ItemSets<'g> {
    grammar: &'g Grammar,
    first: &'g FirstSets,
}

impl<'g> ItemSets<'g> {
    pub(crate) fn new(grammar: &'g Grammar, first: &'g FirstSets) -> Self {
        Self { grammar, first }
    }

    /// The symbol right of the item's marker, if any.
    pub(crate) fn next_token(&self, item: &Item) -> Option<&'g Token> {
        self.grammar[item.rule].prod().get(item.dot)
    }

    /// The smallest superset of `items` closed under expansion: for every
    /// `[A := alpha . B beta, la]` and every rule `B := gamma`, the items
    /// `[B := . gamma, la']` with `la'` in `FIRST(beta la)`.
    pub(crate) fn closure(&self, mut items: State) -> State {
        fixpoint(|| {
            let mut fresh = Vec::new();
            for item in &items {
                let Some(Token::NonTerminal(next)) = self.next_token(item) else {
                    continue;
                };
                let prod = self.grammar[item.rule].prod();
                let mut seq: Vec<Token> = prod[item.dot + 1..].to_vec();
                seq.push(item.lookahead.sym());
                let lookaheads = self.first.first_of_sequence(&seq);

                for (number, rule) in self.grammar.rules().enumerate() {
                    if rule.lhs() != next {
                        continue;
                    }
                    for lookahead in &lookaheads {
                        fresh.push(Item {
                            rule: number,
                            dot: 0,
                            lookahead: lookahead.clone(),
                        });
                    }
                }
            }

            let mut changed = false;
            for item in fresh {
                changed |= items.insert(item);
            }
            changed
        });
        items
    }

    /// Advances the marker over `token` for every item that reads it,
    /// then closes the result. An empty result means "no transition".
    pub(crate) fn goto(&self, state: &State, token: &Token) -> State {
        let mut moved = State::new();
        for item in state {
            if self.next_token(item) == Some(token) {
                moved.insert(Item {
                    rule: item.rule,
                    dot: item.dot + 1,
                    lookahead: item.lookahead.clone(),
                });
            }
        }
        if moved.is_empty() {
            return moved;
        }
        self.closure(moved)
    }
}

/// The canonical collection: a dense arena of states with index 0 the
/// initial state, plus the reverse state-to-index lookup.
#[derive(Debug)]
pub struct Automaton {
    states: Vec<State>,
    indices: Map<State, usize>,
}

impl Automaton {
    pub fn generate(grammar: &Grammar, first: &FirstSets) -> Self {
        let sets = ItemSets::new(grammar, first);
        let initial = sets.closure(State::from([Item {
            rule: 0,
            dot: 0,
            lookahead: Terminal::end_of_input(),
        }]));

        let mut states = vec![initial.clone()];
        let mut indices: Map<State, usize> = Map::default();
        indices.insert(initial, 0);

        fixpoint(|| {
            // Collect the pass's goto results into an ordered set first, so
            // index assignment does not depend on discovery order.
            let mut discovered: BTreeSet<State> = BTreeSet::new();
            for state in &states {
                for token in grammar.tokens() {
                    let next = sets.goto(state, token);
                    if !next.is_empty() {
                        discovered.insert(next);
                    }
                }
            }

            let mut changed = false;
            for state in discovered {
                if !indices.contains_key(&state) {
                    let index = states.len();
                    states.push(state.clone());
                    indices.insert(state, index);
                    changed = true;
                }
            }
            changed
        });

        tracing::debug!(states = states.len(), "canonical collection constructed");
        Self { states, indices }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, index: usize) -> &State {
        &self.states[index]
    }

    pub fn index_of(&self, state: &State) -> Option<usize> {
        self.indices.get(state).copied()
    }

    pub fn states(&self) -> impl ExactSizeIterator<Item = &State> {
        self.states.iter()
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (index, state) in self.states.iter().enumerate() {
                writeln!(f, "#### state {:02}", index)?;
                for item in state {
                    writeln!(f, "- {}", item.display(g))?;
                }
            }
            Ok(())
        })
    }
}
