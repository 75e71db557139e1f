//! Grammar types.

use crate::types::Set;
use std::{cmp::Ordering, fmt, hash::Hash, hash::Hasher, ops};

/// A terminal symbol, matched directly against input tokens.
///
/// Equality, hashing and ordering are defined on `name` alone: a terminal
/// carrying a lexical pattern and one without are the same symbol as far as
/// the grammar is concerned. The pattern only matters to the lexer that
/// feeds the generated tables.
#[derive(Debug, Clone)]
pub struct Terminal {
    name: String,
    repr: String,
}

impl Terminal {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            repr: String::new(),
        }
    }

    /// A terminal whose lexeme is described by a pattern instead of its
    /// literal name.
    pub fn with_pattern(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_owned(),
            repr: pattern.to_owned(),
        }
    }

    /// The distinguished terminal standing for the empty string.
    pub fn epsilon() -> Self {
        Self {
            name: String::new(),
            repr: String::new(),
        }
    }

    /// The distinguished end-of-input terminal `$`.
    pub fn end_of_input() -> Self {
        Self {
            name: "$".to_owned(),
            repr: "$".to_owned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lexical pattern associated with this terminal, if any.
    pub fn pattern(&self) -> Option<&str> {
        if self.repr.is_empty() {
            None
        } else {
            Some(&self.repr)
        }
    }

    pub fn is_epsilon(&self) -> bool {
        self.name.is_empty()
    }

    /// The qualified ACTION table key: `T_<name>` for plain terminals,
    /// `R_<name>` for pattern-bearing ones.
    pub fn qual_name(&self) -> String {
        if self.repr.is_empty() {
            format!("T_{}", self.name)
        } else {
            format!("R_{}", self.name)
        }
    }

    pub fn sym(&self) -> Token {
        Token::Terminal(self.clone())
    }
}

impl PartialEq for Terminal {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Terminal {}

impl Hash for Terminal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Terminal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Terminal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_epsilon() {
            f.write_str("$eps")
        } else {
            f.write_str(&self.name)
        }
    }
}

impl tabula_runtime::parser::Token for Terminal {
    fn action_key(&self) -> String {
        self.qual_name()
    }
}

/// A nonterminal symbol, defined by one or more production rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonTerminal {
    name: String,
}

impl NonTerminal {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sym(&self) -> Token {
        Token::NonTerminal(self.clone())
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A grammar symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl Token {
    /// Derives the disambiguated string key for this symbol: `T_`/`R_` for
    /// terminals (see [`Terminal::qual_name`]), `NT_` for nonterminals.
    pub fn qual_name(&self) -> String {
        match self {
            Self::Terminal(t) => t.qual_name(),
            Self::NonTerminal(nt) => format!("NT_{}", nt.name),
        }
    }
}

impl From<Terminal> for Token {
    fn from(t: Terminal) -> Self {
        Self::Terminal(t)
    }
}
impl From<NonTerminal> for Token {
    fn from(nt: NonTerminal) -> Self {
        Self::NonTerminal(nt)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(t) => fmt::Display::fmt(t, f),
            Self::NonTerminal(nt) => fmt::Display::fmt(nt, f),
        }
    }
}

pub type Production = Vec<Token>;

/// A production rule `lhs := prod`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    lhs: NonTerminal,
    prod: Production,
}

impl Rule {
    pub fn lhs(&self) -> &NonTerminal {
        &self.lhs
    }

    pub fn prod(&self) -> &[Token] {
        &self.prod
    }

    /// Number of stack frames a reduction by this rule pops: zero for an
    /// epsilon body, the production length otherwise.
    pub fn arity(&self) -> usize {
        match &self.prod[..] {
            [Token::Terminal(t)] if t.is_epsilon() => 0,
            prod => prod.len(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :=", self.lhs)?;
        for token in &self.prod {
            write!(f, " {}", token)?;
        }
        Ok(())
    }
}

/// The grammar the parse tables are derived from.
///
/// Rule 0 is always the augmented start rule injected by
/// [`Grammar::define`]. The grammar is read-only once defined; the only
/// later mutation is the end-of-input terminal the generator adds to the
/// vocabulary.
#[derive(Debug)]
pub struct Grammar {
    rules: Vec<Rule>,
    tokens: Set<Token>,
    ignored: Vec<String>,
}

impl Grammar {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef {
            rules: Vec::new(),
            tokens: Set::default(),
            start: None,
            first_nonterminal: None,
            ignored: Vec::new(),
        };
        f(&mut def)?;
        def.end()
    }

    pub fn rules(&self) -> impl ExactSizeIterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Every symbol appearing anywhere in the grammar, plus the injected
    /// end-of-input terminal once a generator owns this grammar.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Lexical patterns the lexer should skip. Carried for the code
    /// emitter; nothing in table construction reads them.
    pub fn ignored_patterns(&self) -> &[String] {
        &self.ignored
    }

    /// The left-hand side of the augmented start rule.
    pub fn augmented_start(&self) -> &NonTerminal {
        &self.rules[0].lhs
    }

    pub(crate) fn inject_end_terminal(&mut self) {
        self.tokens.insert(Token::Terminal(Terminal::end_of_input()));
    }
}

impl ops::Index<usize> for Grammar {
    type Output = Rule;

    fn index(&self, index: usize) -> &Rule {
        &self.rules[index]
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## tokens:")?;
        for token in &self.tokens {
            writeln!(f, "{}", token)?;
        }
        writeln!(f, "\n## rules:")?;
        for (i, rule) in self.rules.iter().enumerate() {
            writeln!(f, "{}: {}", i, rule)?;
        }
        if !self.ignored.is_empty() {
            writeln!(f, "\n## ignored patterns:")?;
            for pattern in &self.ignored {
                writeln!(f, "{}", pattern)?;
            }
        }
        Ok(())
    }
}

/// The contextual values for building a [`Grammar`].
#[derive(Debug)]
pub struct GrammarDef {
    rules: Vec<Rule>,
    tokens: Set<Token>,
    start: Option<NonTerminal>,
    first_nonterminal: Option<NonTerminal>,
    ignored: Vec<String>,
}

impl GrammarDef {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(&mut self, name: &str) -> Result<Terminal, GrammarDefError> {
        self.declare_terminal(Terminal::new(name))
    }

    /// Declare a terminal symbol whose lexeme is described by a pattern.
    pub fn terminal_with_pattern(
        &mut self,
        name: &str,
        pattern: &str,
    ) -> Result<Terminal, GrammarDefError> {
        self.declare_terminal(Terminal::with_pattern(name, pattern))
    }

    fn declare_terminal(&mut self, terminal: Terminal) -> Result<Terminal, GrammarDefError> {
        verify_name(terminal.name())?;
        if !self.tokens.insert(terminal.sym()) {
            return Err(GrammarDefError::DuplicateSymbol {
                name: terminal.name().to_owned(),
            });
        }
        Ok(terminal)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonTerminal, GrammarDefError> {
        verify_name(name)?;
        let nonterminal = NonTerminal::new(name);
        if !self.tokens.insert(nonterminal.sym()) {
            return Err(GrammarDefError::DuplicateSymbol {
                name: name.to_owned(),
            });
        }
        if self.first_nonterminal.is_none() {
            self.first_nonterminal = Some(nonterminal.clone());
        }
        Ok(nonterminal)
    }

    /// Add a production rule to this grammar.
    pub fn rule<I>(&mut self, lhs: &NonTerminal, prod: I) -> Result<(), GrammarDefError>
    where
        I: IntoIterator<Item = Token>,
    {
        let prod: Production = prod.into_iter().collect();
        if self.rules.iter().any(|r| &r.lhs == lhs && r.prod == prod) {
            return Err(GrammarDefError::DuplicateRule {
                lhs: lhs.name().to_owned(),
            });
        }
        self.tokens.insert(lhs.sym());
        for token in &prod {
            self.tokens.insert(token.clone());
        }
        self.rules.push(Rule {
            lhs: lhs.clone(),
            prod,
        });
        Ok(())
    }

    /// Specify the start symbol. Defaults to the first declared
    /// nonterminal when left unset.
    pub fn start_symbol(&mut self, symbol: &NonTerminal) {
        self.start = Some(symbol.clone());
    }

    /// Register a lexical pattern the lexer should skip.
    pub fn ignore(&mut self, pattern: &str) {
        self.ignored.push(pattern.to_owned());
    }

    fn end(mut self) -> Result<Grammar, GrammarDefError> {
        let start = self
            .start
            .take()
            .or_else(|| self.first_nonterminal.take())
            .ok_or(GrammarDefError::EmptyGrammar)?;

        // Rule 0: the augmented start rule. The end-of-input terminal is
        // attached to the initial item's lookahead, not to this body.
        let accept = NonTerminal {
            name: "$accept".to_owned(),
        };
        self.tokens.insert(accept.sym());
        let mut rules = vec![Rule {
            lhs: accept,
            prod: vec![start.sym()],
        }];
        rules.extend(self.rules);

        Ok(Grammar {
            rules,
            tokens: self.tokens,
            ignored: self.ignored,
        })
    }
}

// `$`-prefixed names are reserved for the injected symbols.
fn verify_name(name: &str) -> Result<(), GrammarDefError> {
    if name.is_empty() || name.starts_with('$') {
        return Err(GrammarDefError::InvalidName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("invalid symbol name `{name}'")]
    InvalidName { name: String },

    #[error("the symbol `{name}' has already been declared")]
    DuplicateSymbol { name: String },

    #[error("duplicate production rule for `{lhs}'")]
    DuplicateRule { lhs: String },

    #[error("the grammar declares no nonterminal symbols")]
    EmptyGrammar,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qual_names() {
        assert_eq!(Terminal::new("+").qual_name(), "T_+");
        assert_eq!(Terminal::with_pattern("IDENT", "[a-z]+").qual_name(), "R_IDENT");
        assert_eq!(NonTerminal::new("S").sym().qual_name(), "NT_S");
        assert_eq!(Terminal::epsilon().qual_name(), "T_");
        assert_eq!(Terminal::end_of_input().qual_name(), "R_$");
    }

    #[test]
    fn terminal_identity_ignores_pattern() {
        let plain = Terminal::new("num");
        let patterned = Terminal::with_pattern("num", "[0-9]+");
        assert_eq!(plain, patterned);
        assert_eq!(plain.cmp(&patterned), Ordering::Equal);

        let mut set = Set::default();
        set.insert(plain.sym());
        assert!(!set.insert(patterned.sym()));
    }

    #[test]
    fn define_injects_augmented_rule() {
        let grammar = Grammar::define(|g| {
            let id = g.terminal("id")?;
            let s = g.nonterminal("S")?;
            g.start_symbol(&s);
            g.rule(&s, [id.sym()])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(grammar.rules().len(), 2);
        assert_eq!(grammar.augmented_start().name(), "$accept");
        assert_eq!(grammar[0].prod(), &[NonTerminal::new("S").sym()]);
        assert!(grammar.tokens().any(|t| t == &Terminal::new("id").sym()));
        assert!(grammar.tokens().any(|t| t == &NonTerminal::new("$accept").sym()));
    }

    #[test]
    fn start_symbol_defaults_to_first_nonterminal() {
        let grammar = Grammar::define(|g| {
            let id = g.terminal("id")?;
            let s = g.nonterminal("S")?;
            let t = g.nonterminal("T")?;
            g.rule(&s, [t.sym()])?;
            g.rule(&t, [id.sym()])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(grammar[0].prod(), &[NonTerminal::new("S").sym()]);
    }

    #[test]
    fn epsilon_rule_has_zero_arity() {
        let grammar = Grammar::define(|g| {
            let a = g.nonterminal("A")?;
            g.rule(&a, [Terminal::epsilon().sym()])?;
            Ok(())
        })
        .unwrap();

        assert_eq!(grammar[1].arity(), 0);
        assert_eq!(grammar[0].arity(), 1);
    }

    #[test]
    fn rejects_reserved_and_duplicate_names() {
        let err = Grammar::define(|g| {
            g.terminal("$end")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::InvalidName { .. }));

        let err = Grammar::define(|g| {
            g.terminal("id")?;
            g.terminal("id")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateSymbol { .. }));

        let err = Grammar::define(|g| {
            let id = g.terminal("id")?;
            let s = g.nonterminal("S")?;
            g.rule(&s, [id.sym()])?;
            g.rule(&s, [id.sym()])?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateRule { .. }));

        let err = Grammar::define(|_| Ok(())).unwrap_err();
        assert!(matches!(err, GrammarDefError::EmptyGrammar));
    }
}
