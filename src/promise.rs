use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::{Error, Future};

/// Write side of a [`Future`]. The only handle able to settle it.
///
/// Clones share the same future, which lets competing producers race with
/// [`Promise::resolve_safely`]; exactly one of them wins.
///
/// # Examples
///
/// ```
/// use promise_future::Promise;
/// let promise = Promise::<u32, String>::new();
/// let future = promise.future();
/// assert!(!future.is_complete());
/// promise.succeed(42).unwrap();
/// assert_eq!(future.value(), Ok(42));
/// ```
pub struct Promise<T, E> {
    future: Future<T, E>,
}

impl<T, E> Promise<T, E> {
    pub fn new() -> Self {
        Self {
            future: Future::pending(),
        }
    }

    /// The paired future. Every call returns a handle to the same future.
    pub fn future(&self) -> Future<T, E> {
        self.future.clone()
    }

    pub fn succeed(&self, value: T) -> Result<(), Error> {
        self.resolve(Ok(value))
    }

    pub fn fail(&self, err: E) -> Result<(), Error> {
        self.resolve(Err(err))
    }

    /// Settles the future with `outcome` and runs its observers before
    /// returning.
    ///
    /// A second settlement is rejected with [`Error::AlreadySettled`] and
    /// leaves the first outcome in place.
    pub fn resolve(&self, outcome: Result<T, E>) -> Result<(), Error> {
        self.future.settle(Arc::new(outcome))
    }

    /// Settles the future unless it already is. Returns whether this call
    /// was the one that settled it.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_future::Promise;
    /// let promise = Promise::<u32, ()>::new();
    /// assert!(promise.resolve_safely(Ok(42)));
    /// assert!(!promise.resolve_safely(Ok(99)));
    /// assert_eq!(promise.future().value(), Ok(42));
    /// ```
    pub fn resolve_safely(&self, outcome: Result<T, E>) -> bool {
        match self.resolve(outcome) {
            Ok(()) => true,
            Err(_) => {
                debug!("promise already settled, outcome dropped");
                false
            }
        }
    }

    /// Settles this promise with whatever `inner` settles with.
    ///
    /// The paired future stays pending until `inner` settles, then takes the
    /// same outcome, success or failure. If `inner` is already settled this
    /// happens before `succeed_with` returns.
    ///
    /// The already-settled check and the later forward take the lock
    /// separately. If the promise is settled in between, `succeed_with` still
    /// returns `Ok(())` and the forwarded outcome is dropped with a warning.
    pub fn succeed_with(&self, inner: &Future<T, E>) -> Result<(), Error>
    where
        T: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        if self.future.is_complete() {
            return Err(Error::AlreadySettled);
        }
        trace!("promise chained to inner future");
        let outer = self.future.clone();
        inner.on_complete(move |settled| {
            let Some(outcome) = settled.outcome() else {
                return;
            };
            trace!("forwarding inner outcome");
            if outer.settle(outcome).is_err() {
                warn!("chained promise settled before its inner future");
            }
        });
        Ok(())
    }
}

impl<T, E> Default for Promise<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            future: self.future.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise").field("future", &self.future).finish()
    }
}
