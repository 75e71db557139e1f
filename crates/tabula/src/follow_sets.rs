//! Calculation of FOLLOW sets.

use crate::first_sets::FirstSets;
use crate::grammar::{Grammar, NonTerminal, Terminal, Token};
use crate::types::{Map, Set};
use crate::util::fixpoint;

/// The set of terminals that can immediately follow each nonterminal in
/// some derivation, seeded with `$` on the augmented start symbol.
///
/// Table construction never reads these sets: the LR(1) lookaheads carried
/// by the items subsume them. They are kept as a separately correct,
/// exported artifact for diagnostics and downstream consumers.
#[derive(Debug)]
pub struct FollowSets {
    map: Map<NonTerminal, Set<Terminal>>,
}

impl FollowSets {
    pub fn new(grammar: &Grammar, first: &FirstSets) -> Self {
        let mut map: Map<NonTerminal, Set<Terminal>> = Map::default();
        for token in grammar.tokens() {
            if let Token::NonTerminal(nt) = token {
                map.insert(nt.clone(), Set::default());
            }
        }
        map.entry(grammar.augmented_start().clone())
            .or_default()
            .insert(Terminal::end_of_input());

        fixpoint(|| {
            let mut changed = false;
            for rule in grammar.rules() {
                for (i, token) in rule.prod().iter().enumerate() {
                    let Token::NonTerminal(nt) = token else {
                        continue;
                    };
                    let beta = &rule.prod()[i + 1..];

                    let mut to_add: Vec<Terminal> = Vec::new();
                    if beta.is_empty() {
                        to_add.extend(map.get(rule.lhs()).into_iter().flatten().cloned());
                    } else {
                        let beta_first = first.first_of_sequence(beta);
                        if beta_first.contains(&Terminal::epsilon()) {
                            to_add.extend(map.get(rule.lhs()).into_iter().flatten().cloned());
                        }
                        to_add.extend(beta_first.into_iter().filter(|t| !t.is_epsilon()));
                    }

                    let follow = map.get_mut(nt).expect("nonterminal missing from vocabulary");
                    for t in to_add {
                        changed |= follow.insert(t);
                    }
                }
            }
            changed
        });

        Self { map }
    }

    pub fn follow(&self, symbol: &NonTerminal) -> Option<&Set<Terminal>> {
        self.map.get(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NonTerminal, &Set<Terminal>)> {
        self.map.iter()
    }
}
