//! Built-in handlers registered by the server binary.

pub mod inbox;
pub mod outbox;
pub mod self_test;
pub mod sweep;

pub use inbox::InboxPullHandler;
pub use outbox::OutboxPushHandler;
pub use self_test::SelfTestHandler;
pub use sweep::JobSweepHandler;
