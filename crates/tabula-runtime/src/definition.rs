//! Parse table abstraction.

/// The action a parser performs for a state/lookahead pair.
#[derive(Debug, Clone)]
pub enum ParseAction<TSym> {
    /// Consume the lookahead and enter the given state.
    Shift(usize),

    /// Rewind `arity` stack frames and push `lhs` in their place.
    /// `arity` is zero for an epsilon production.
    Reduce { rule: usize, lhs: TSym, arity: usize },

    /// The input has been recognized.
    Accept,

    /// No action is defined: the lookahead is a syntax error.
    Error,
}

/// The trait for abstracting a generated LR(1) parse table.
pub trait ParseTable {
    /// The nonterminal label pushed on a reduction.
    type Symbol: Clone;

    /// Return the initial state index.
    fn initial_state(&self) -> usize;

    /// Return the action for the given state and qualified lookahead key.
    fn action(&self, state: usize, key: &str) -> ParseAction<Self::Symbol>;

    /// Return the state entered after reducing to `symbol` in `state`.
    fn goto(&self, state: usize, symbol: &Self::Symbol) -> Option<usize>;
}

impl<T: ?Sized> ParseTable for &T
where
    T: ParseTable,
{
    type Symbol = T::Symbol;

    fn initial_state(&self) -> usize {
        (**self).initial_state()
    }

    fn action(&self, state: usize, key: &str) -> ParseAction<Self::Symbol> {
        (**self).action(state, key)
    }

    fn goto(&self, state: usize, symbol: &Self::Symbol) -> Option<usize> {
        (**self).goto(state, symbol)
    }
}
