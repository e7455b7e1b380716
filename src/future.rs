use std::fmt;
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

use tracing::trace;

use crate::Error;

type Observer<T, E> = Box<dyn FnOnce(&Future<T, E>) + Send>;

struct Inner<T, E> {
    outcome: Option<Arc<Result<T, E>>>,
    observers: Vec<Observer<T, E>>,
    wakers: Vec<Waker>,
}

/// Read side of a promise. Clones share the same state, so every holder
/// sees the one outcome.
///
/// A `Future` is settled at most once, by its [`Promise`](crate::Promise),
/// and never returns to pending afterwards. It may be awaited; the output is
/// the shared outcome.
///
/// # Examples
///
/// ```
/// use promise_future::Promise;
/// use futures::executor::block_on;
/// use std::thread;
/// let promise = Promise::<String, ()>::new();
/// let future = promise.future();
/// let task1 = thread::spawn(move || block_on(async {
///     println!("Received {:?}", future.await);
/// }));
/// promise.succeed("Hi".into()).unwrap();
/// task1.join().expect("The task1 thread has panicked.");
/// ```
pub struct Future<T, E> {
    inner: Arc<Mutex<Inner<T, E>>>,
}

impl<T, E> Future<T, E> {
    pub(crate) fn pending() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                outcome: None,
                observers: vec![],
                wakers: vec![],
            })),
        }
    }

    fn settled(outcome: Result<T, E>) -> Self {
        let future = Self::pending();
        future.lock().outcome = Some(Arc::new(outcome));
        future
    }

    /// A future that has already succeeded with `value`.
    pub fn succeeded(value: T) -> Self {
        Self::settled(Ok(value))
    }

    /// A future that has already failed with `err`.
    pub fn failed(err: E) -> Self {
        Self::settled(Err(err))
    }

    // Observers never run while the lock is held, so a poisoned lock still
    // guards a consistent cell.
    fn lock(&self) -> MutexGuard<'_, Inner<T, E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `callback` with this future once it settles.
    ///
    /// Callbacks registered while pending run in registration order on the
    /// thread that settles the future. On a settled future the callback runs
    /// right away, before `on_complete` returns.
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnOnce(&Future<T, E>) + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.outcome.is_none() {
            inner.observers.push(Box::new(callback));
            return;
        }
        drop(inner);
        callback(self)
    }

    pub fn is_complete(&self) -> bool {
        self.lock().outcome.is_some()
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self.outcome().as_deref(), Some(Ok(_)))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome().as_deref(), Some(Err(_)))
    }

    /// The shared outcome, or `None` while pending.
    pub fn outcome(&self) -> Option<Arc<Result<T, E>>> {
        self.lock().outcome.clone()
    }

    /// The success value.
    ///
    /// Fails with [`Error::Pending`] before settlement and with
    /// [`Error::Failed`] if the future settled with a failure.
    pub fn value(&self) -> Result<T, Error>
    where
        T: Clone,
    {
        match self.outcome().as_deref() {
            None => Err(Error::Pending),
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(_)) => Err(Error::Failed),
        }
    }

    /// The failure, `Ok(None)` if the future succeeded.
    pub fn error(&self) -> Result<Option<E>, Error>
    where
        E: Clone,
    {
        match self.outcome().as_deref() {
            None => Err(Error::Pending),
            Some(Ok(_)) => Ok(None),
            Some(Err(err)) => Ok(Some(err.clone())),
        }
    }

    /// Whether both handles observe the same settlement.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Stores `outcome`, wakes any tasks awaiting the future, then dispatches
    /// observers. Only reachable through [`Promise`](crate::Promise).
    pub(crate) fn settle(&self, outcome: Arc<Result<T, E>>) -> Result<(), Error> {
        let (observers, wakers) = {
            let mut inner = self.lock();
            if inner.outcome.is_some() {
                return Err(Error::AlreadySettled);
            }
            inner.outcome = Some(outcome);
            (mem::take(&mut inner.observers), mem::take(&mut inner.wakers))
        };
        trace!(
            observers = observers.len(),
            wakers = wakers.len(),
            "future settled"
        );
        // Wake first so a panicking observer cannot strand awaiting tasks.
        for waker in wakers {
            waker.wake();
        }
        for observer in observers {
            observer(self);
        }
        Ok(())
    }
}

impl<T, E> Clone for Future<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Future<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.outcome().as_deref() {
            None => "Pending",
            Some(Ok(_)) => "Succeeded",
            Some(Err(_)) => "Failed",
        };
        write!(f, "Future({state})")
    }
}

impl<T, E> std::future::Future for Future<T, E> {
    type Output = Arc<Result<T, E>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.lock();
        if let Some(outcome) = &inner.outcome {
            return Poll::Ready(outcome.clone());
        }
        if !inner.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            inner.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
