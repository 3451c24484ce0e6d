// Public modules
pub mod banner;
pub mod chat;
pub mod classify;
pub mod client;
pub mod error;
pub mod message;
pub mod observability;
pub mod progress;
pub mod screen;

// Re-exports
pub use classify::{ClassifierState, Emission, ResponseClassifier, StreamEnd, THINK_CLOSE_TAG};
pub use client::{FragmentStream, Generator, ModelServer};
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use progress::ProgressIndicator;
