//! Calculation of FIRST sets.

use crate::grammar::{Grammar, Terminal, Token};
use crate::types::{Map, Set};
use crate::util::fixpoint;

/// The set of terminals that can begin a string derived from each symbol.
///
/// `FIRST(t) = {t}` for every terminal, `FIRST($eps) = {$eps}`, and the
/// nonterminal sets are grown to the least fixpoint of the usual
/// constraints: a rule `A := X1 .. Xn` contributes `FIRST(Xi) \ {$eps}`
/// for every nullable prefix `X1 .. X(i-1)`, plus `$eps` itself when the
/// whole right-hand side is nullable.
#[derive(Debug)]
pub struct FirstSets {
    map: Map<Token, Set<Terminal>>,
}

impl FirstSets {
    pub fn new(grammar: &Grammar) -> Self {
        let mut map: Map<Token, Set<Terminal>> = Map::default();
        for token in grammar.tokens() {
            let mut init = Set::default();
            if let Token::Terminal(t) = token {
                init.insert(t.clone());
            }
            map.insert(token.clone(), init);
        }
        // Present even when no production mentions the empty string.
        map.entry(Terminal::epsilon().sym())
            .or_default()
            .insert(Terminal::epsilon());

        fixpoint(|| {
            let mut changed = false;
            for rule in grammar.rules() {
                let lhs = rule.lhs().sym();
                let mut rhs_nullable = true;
                for token in rule.prod() {
                    let token_first = map.get(token).expect("token missing from vocabulary").clone();
                    let nullable = token_first.contains(&Terminal::epsilon());
                    let lhs_first = map.get_mut(&lhs).expect("lhs missing from vocabulary");
                    for t in token_first {
                        if !t.is_epsilon() && lhs_first.insert(t) {
                            changed = true;
                        }
                    }
                    if !nullable {
                        rhs_nullable = false;
                        break;
                    }
                }
                if rhs_nullable {
                    let lhs_first = map.get_mut(&lhs).expect("lhs missing from vocabulary");
                    if lhs_first.insert(Terminal::epsilon()) {
                        changed = true;
                    }
                }
            }
            changed
        });

        Self { map }
    }

    pub fn first(&self, token: &Token) -> Option<&Set<Terminal>> {
        self.map.get(token)
    }

    /// `FIRST(x1 x2 .. xn)` for a symbol sequence: scan left to right,
    /// collecting non-epsilon terminals and stopping at the first
    /// non-nullable symbol; the result contains `$eps` only when every
    /// symbol is nullable (in particular for the empty sequence).
    pub fn first_of_sequence(&self, seq: &[Token]) -> Set<Terminal> {
        let mut result = Set::default();
        let mut all_nullable = true;
        for token in seq {
            let token_first = self.map.get(token).expect("token missing from vocabulary");
            let mut nullable = false;
            for t in token_first {
                if t.is_epsilon() {
                    nullable = true;
                } else {
                    result.insert(t.clone());
                }
            }
            if !nullable {
                all_nullable = false;
                break;
            }
        }
        if all_nullable {
            result.insert(Terminal::epsilon());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::NonTerminal;

    fn terminals(first: &FirstSets, token: &Token) -> Vec<String> {
        let mut names: Vec<String> = first
            .first(token)
            .expect("symbol not covered")
            .iter()
            .map(|t| t.name().to_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn terminals_begin_with_themselves() {
        let grammar = Grammar::define(|g| {
            let x = g.terminal("x")?;
            let a = g.nonterminal("A")?;
            g.rule(&a, [x.sym()])?;
            Ok(())
        })
        .unwrap();
        let first = FirstSets::new(&grammar);

        assert_eq!(terminals(&first, &Terminal::new("x").sym()), ["x"]);
        assert_eq!(terminals(&first, &Terminal::epsilon().sym()), [""]);
    }

    #[test]
    fn non_nullable_symbol_stops_the_scan() {
        // A := B C, B := x, C := y | $eps  =>  FIRST(A) = {x}
        let grammar = Grammar::define(|g| {
            let x = g.terminal("x")?;
            let y = g.terminal("y")?;
            let a = g.nonterminal("A")?;
            let b = g.nonterminal("B")?;
            let c = g.nonterminal("C")?;
            g.rule(&a, [b.sym(), c.sym()])?;
            g.rule(&b, [x.sym()])?;
            g.rule(&c, [y.sym()])?;
            g.rule(&c, [Terminal::epsilon().sym()])?;
            Ok(())
        })
        .unwrap();
        let first = FirstSets::new(&grammar);

        assert_eq!(terminals(&first, &NonTerminal::new("A").sym()), ["x"]);
        assert_eq!(terminals(&first, &NonTerminal::new("C").sym()), ["", "y"]);
    }

    #[test]
    fn nullability_propagates_through_rules() {
        // A := B, B := $eps  =>  $eps in FIRST(A)
        let grammar = Grammar::define(|g| {
            let a = g.nonterminal("A")?;
            let b = g.nonterminal("B")?;
            g.rule(&a, [b.sym()])?;
            g.rule(&b, [Terminal::epsilon().sym()])?;
            Ok(())
        })
        .unwrap();
        let first = FirstSets::new(&grammar);

        assert!(first
            .first(&NonTerminal::new("A").sym())
            .unwrap()
            .contains(&Terminal::epsilon()));
        assert!(first
            .first(&NonTerminal::new("B").sym())
            .unwrap()
            .contains(&Terminal::epsilon()));
    }

    #[test]
    fn sequence_first_skips_nullable_prefixes() {
        let grammar = Grammar::define(|g| {
            let x = g.terminal("x")?;
            let y = g.terminal("y")?;
            let c = g.nonterminal("C")?;
            g.rule(&c, [y.sym()])?;
            g.rule(&c, [Terminal::epsilon().sym()])?;
            let s = g.nonterminal("S")?;
            g.rule(&s, [c.sym(), x.sym()])?;
            Ok(())
        })
        .unwrap();
        let first = FirstSets::new(&grammar);

        assert!(first.first_of_sequence(&[]).contains(&Terminal::epsilon()));

        let seq = [NonTerminal::new("C").sym(), Terminal::new("x").sym()];
        let result = first.first_of_sequence(&seq);
        assert!(result.contains(&Terminal::new("y")));
        assert!(result.contains(&Terminal::new("x")));
        assert!(!result.contains(&Terminal::epsilon()));
    }
}
