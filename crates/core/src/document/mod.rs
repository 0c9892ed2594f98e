//! Business documents and their lifecycle.

pub mod error;
pub mod lifecycle;
pub mod types;

#[cfg(test)]
mod lifecycle_props;

pub use error::LifecycleError;
pub use lifecycle::{
    PostingEffect, Transition, TransitionOrigin, allowed_targets, check_editable,
    check_user_transition, effective_status, is_expired,
};
pub use types::{Document, DocumentKind, DocumentStatus, LineItem, NewDocument, StockLine};
