use std::fmt;
use std::sync::Arc;

use super::result::ScanResult;

/// Function run by an executor for one work item.
///
/// Receives the item's origin and input and returns the item's result.
/// Shared behind an `Arc` so one function can back many items.
pub type WorkFn<I, R> = Arc<dyn Fn(&str, I) -> ScanResult<R> + Send + Sync>;

/// One unit of work: a function, the origin it runs for, and its input.
///
/// The pool never looks at `input`; only the function knows what it means.
pub struct Work<I, R> {
    func: WorkFn<I, R>,
    origin: String,
    input: I,
}

impl<I, R> Work<I, R> {
    pub fn new<F>(func: F, origin: impl Into<String>, input: I) -> Self
    where
        F: Fn(&str, I) -> ScanResult<R> + Send + Sync + 'static,
    {
        Self::from_shared(Arc::new(func), origin, input)
    }

    /// Build an item around a function that is already shared with other items
    pub fn from_shared(func: WorkFn<I, R>, origin: impl Into<String>, input: I) -> Self {
        Self {
            func,
            origin: origin.into(),
            input,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    /// Run the function, consuming the item
    pub(crate) fn run(self) -> ScanResult<R> {
        let Self {
            func,
            origin,
            input,
        } = self;
        func(&origin, input)
    }
}

impl<I, R> fmt::Debug for Work<I, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Work")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}
