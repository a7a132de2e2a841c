//! Status listener: periodic polling with per-subscription deduplication.

pub mod cycle;
pub mod engine;
pub mod handler;
pub mod subscription;

pub use cycle::PollCycle;
pub use engine::{ListenerEngine, ListenerError, ListenerHandle, ListenerState};
pub use handler::{Callbacks, ChannelHandler, Delivery, HandlerError, ListenerHandler, channel};
pub use subscription::{DEFAULT_INTERVAL, DEFAULT_LIMIT, SeenSet, Subscription};
