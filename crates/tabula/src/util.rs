use std::fmt;

/// Adapts a closure into a `fmt::Display` implementation.
pub(crate) fn display_fn<F>(f: F) -> impl fmt::Display
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    struct DisplayFn<F>(F);
    impl<F> fmt::Display for DisplayFn<F>
    where
        F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            (self.0)(f)
        }
    }
    DisplayFn(f)
}

/// Repeats `pass` until it reports that nothing changed.
///
/// Every set computation in this crate grows a monotone set over a finite
/// domain, so each of them terminates under this driver.
pub(crate) fn fixpoint<F>(mut pass: F)
where
    F: FnMut() -> bool,
{
    while pass() {}
}
