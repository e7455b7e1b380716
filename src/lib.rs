//! A write-once `Promise`/`Future` pair.
//!
//! The producer keeps the [`Promise`] and hands out its [`Future`]. Settling
//! the promise stores the outcome and runs every observer registered with
//! [`Future::on_complete`] inline, in registration order. Observers registered
//! later run immediately. A future may also be awaited.
//!
//! # Examples
//!
//! ```
//! use promise_future::Promise;
//! use std::sync::{Arc, Mutex};
//!
//! let promise = Promise::<u32, String>::new();
//! let future = promise.future();
//! let seen = Arc::new(Mutex::new(None));
//! let sink = seen.clone();
//! future.on_complete(move |f| *sink.lock().unwrap() = f.value().ok());
//!
//! assert!(promise.resolve_safely(Ok(42)));
//! assert!(!promise.resolve_safely(Ok(99)));
//! assert_eq!(*seen.lock().unwrap(), Some(42));
//! assert_eq!(future.value(), Ok(42));
//! ```
pub mod future;
pub mod promise;

pub use future::Future;
pub use promise::Promise;

/// Misuse of a promise or its future. Failures of the operation itself are
/// carried as the `E` side of the outcome and never show up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("future is still pending")]
    Pending,
    #[error("future settled with a failure, not a value")]
    Failed,
    #[error("future is already settled")]
    AlreadySettled,
}
