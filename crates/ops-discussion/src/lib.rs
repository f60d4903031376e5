//! # ops-discussion
//!
//! Discussion threads on reports: notes, threaded replies, per-user read
//! tracking, and the notification fan-out they trigger.
//!
//! The data mutation and the notifications are deliberately decoupled:
//! note and reply writes commit under the store's row-locked report
//! transaction, then the recipient set is computed
//! ([`resolve_recipients`]) and each recipient is notified independently
//! over both channels (persisted in-app row + push). A delivery failure
//! for one recipient never affects another recipient, and never affects
//! the committed note.

pub mod error;
pub mod recipients;
pub mod thread;

pub use error::DiscussionError;
pub use recipients::resolve_recipients;
pub use thread::DiscussionService;
