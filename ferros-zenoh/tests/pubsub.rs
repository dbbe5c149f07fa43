//! Loopback pub/sub within a single session.
//!
//! No router is required: samples published on a session are delivered to
//! that session's own matching subscribers.

use ferros_msg::std_msgs;
use ferros_zenoh::{Context, Profile, SessionConfig};
use std::{thread, time::Duration};

#[test]
fn loopback_pubsub_and_graph() {
    let ctx = Context::open(SessionConfig::default()).expect("session should open");
    let node = ctx.create_node("loopback", None).expect("node");

    let mut subscriber = node
        .create_subscriber::<std_msgs::String>("chatter", Profile::default())
        .expect("subscriber");
    let publisher = node
        .create_publisher::<std_msgs::String>("chatter", Profile::default())
        .expect("publisher");
    assert_eq!(publisher.topic_name(), "/chatter");

    // Let the local declarations settle before publishing.
    thread::sleep(Duration::from_millis(200));

    let msg = std_msgs::String {
        data: "hello".to_string(),
    };
    publisher.send(&msg).expect("send");

    let received = subscriber
        .recv_timeout(Duration::from_secs(5))
        .expect("recv")
        .expect("a message should arrive");
    assert_eq!(received.data.data, "hello");
    assert_eq!(received.info.sequence_number, 0);

    // Our own liveliness tokens show up in the discovery graph.
    let graph = ctx.graph();
    assert!(graph.node_names().contains(&"/loopback".to_string()));
    assert!(graph.count_publishers("/chatter") >= 1);
    assert!(graph.count_subscribers("/chatter") >= 1);

    drop(publisher);
    drop(subscriber);
    ctx.close().expect("close");
    assert!(ctx.is_closed());
    // Closing again is a no-op.
    ctx.close().expect("close twice");
}
