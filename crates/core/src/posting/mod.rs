//! Posting facade: document transitions and the queries around them.

pub mod error;
pub mod retry;
pub mod service;

pub use error::{ErrorKind, TransitionError};
pub use retry::RetryPolicy;
pub use service::{PostingReceipt, PostingService};
