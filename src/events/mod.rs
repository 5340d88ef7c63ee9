pub mod dedup;
pub mod handler;
pub mod message;

pub use dedup::{dedup_key, seen};
pub use handler::{EventHandler, HandlerError, Intent, IntentClassifier};
pub use message::{Ack, InboundEvent};
