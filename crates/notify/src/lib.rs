pub mod queue;
pub mod templates;

pub use queue::{NotificationQueue, NotificationQueueConfig, NotificationQueueHandle};
