//! Price alert module
//!
//! Persistent price triggers with fire-once semantics.
//!
//! # Lifecycle
//!
//! ```text
//! add ──► PENDING ──(price condition met)──► TRIGGERED
//!            │                                   │
//!            └──────────── remove ───────────────┘
//! ```

pub mod evaluator;
pub mod store;
pub mod types;

pub use evaluator::AlertEvaluator;
pub use store::AlertStore;
pub use types::{Alert, AlertCondition, AlertId, FiredAlert};
