pub mod bridge;
pub mod observer;

pub use bridge::{TimelineBridge, TimelineEvent, TimelineRenderer};
pub use observer::{Observers, Subscription};
