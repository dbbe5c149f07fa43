//! Topic endpoints: publisher and subscriber.

pub mod publisher;
pub mod subscriber;
