//! Runtime lifecycle tests against the mock transport.

mod common;

use common::MockContext;
use ferros::{CancelToken, Error, NodeConfig, NodeRuntime, Profile};
use ferros_msg::{
    example_interfaces::{AddTwoInts, AddTwoIntsRequest, AddTwoIntsResponse},
    std_msgs,
};
use ferros_core::msg::TypeSupport;
use parking_lot::Mutex;
use std::sync::{Arc, atomic::Ordering};

fn runtime_on(ctx: &Arc<MockContext>, config: NodeConfig) -> NodeRuntime<MockContext> {
    NodeRuntime::with_context(config, Arc::clone(ctx)).expect("runtime should initialize")
}

fn string_msg(data: &str) -> std_msgs::String {
    std_msgs::String {
        data: data.to_string(),
    }
}

#[test]
fn type_mismatch_is_rejected_and_registry_survives() {
    let ctx = MockContext::new();
    let runtime = runtime_on(&ctx, NodeConfig::new("node"));

    runtime
        .register_publisher::<std_msgs::String>("chatter", Profile::default())
        .unwrap();

    // Same topic, different message type.
    let err = runtime
        .register_subscriber::<AddTwoIntsRequest, _>("chatter", Profile::default(), |_| Ok(()))
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    // The registry was not corrupted: the original registration is intact
    // and compatible registrations still work.
    assert_eq!(runtime.endpoint_count(), 1);
    assert_eq!(
        runtime.topic_type("chatter").as_deref(),
        Some(std_msgs::String::type_name())
    );
    runtime
        .register_subscriber::<std_msgs::String, _>("chatter", Profile::default(), |_| Ok(()))
        .unwrap();
    assert_eq!(runtime.endpoint_count(), 2);
}

#[test]
fn incompatible_qos_is_rejected_both_ways() {
    let ctx = MockContext::new();
    let runtime = runtime_on(&ctx, NodeConfig::new("node"));

    // Best-effort offer cannot satisfy a reliable request.
    runtime
        .register_publisher::<std_msgs::String>("scan", Profile::sensor_data())
        .unwrap();
    let err = runtime
        .register_subscriber::<std_msgs::String, _>("scan", Profile::default(), |_| Ok(()))
        .unwrap_err();
    assert!(matches!(err, Error::QosIncompatible { .. }));

    // And the same check fires when the subscriber registers first.
    runtime
        .register_subscriber::<std_msgs::String, _>("status", Profile::default(), |_| Ok(()))
        .unwrap();
    let err = runtime
        .register_publisher::<std_msgs::String>("status", Profile::sensor_data())
        .unwrap_err();
    assert!(matches!(err, Error::QosIncompatible { .. }));
}

#[test]
fn subscriber_receives_in_fifo_order() {
    let ctx = MockContext::new();
    let runtime = runtime_on(&ctx, NodeConfig::new("node"));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    runtime
        .register_subscriber::<std_msgs::String, _>("chatter", Profile::default(), move |msg| {
            sink.lock().push(msg.data.data.clone());
            Ok(())
        })
        .unwrap();

    let chatter = runtime
        .register_publisher::<std_msgs::String>("chatter", Profile::default())
        .unwrap();
    for i in 0..5 {
        chatter.publish(&string_msg(&format!("m{i}"))).unwrap();
    }

    // A pre-cancelled token makes spin drain the queues once and return.
    let cancel = CancelToken::new();
    cancel.cancel();
    runtime.spin(&cancel).unwrap();

    assert_eq!(*seen.lock(), vec!["m0", "m1", "m2", "m3", "m4"]);
    runtime.shutdown().unwrap();
}

#[test]
fn callback_errors_are_isolated_by_default() {
    let ctx = MockContext::new();
    let runtime = runtime_on(&ctx, NodeConfig::new("node"));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    runtime
        .register_subscriber::<std_msgs::String, _>("chatter", Profile::default(), move |msg| {
            if msg.data.data == "bad" {
                return Err("handler refused".into());
            }
            sink.lock().push(msg.data.data.clone());
            Ok(())
        })
        .unwrap();

    let chatter = runtime
        .register_publisher::<std_msgs::String>("chatter", Profile::default())
        .unwrap();
    for data in ["one", "bad", "two"] {
        chatter.publish(&string_msg(data)).unwrap();
    }

    let cancel = CancelToken::new();
    cancel.cancel();
    // The failing callback is logged, not propagated.
    runtime.spin(&cancel).unwrap();
    assert_eq!(*seen.lock(), vec!["one", "two"]);
}

#[test]
fn fatal_callback_errors_abort_spin() {
    let ctx = MockContext::new();
    let runtime = runtime_on(&ctx, NodeConfig::new("node").fatal_callback_errors(true));

    runtime
        .register_subscriber::<std_msgs::String, _>("chatter", Profile::default(), |_| {
            Err("always fails".into())
        })
        .unwrap();

    let chatter = runtime
        .register_publisher::<std_msgs::String>("chatter", Profile::default())
        .unwrap();
    chatter.publish(&string_msg("boom")).unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    let err = runtime.spin(&cancel).unwrap_err();
    assert!(matches!(err, Error::Callback { .. }));

    // Shutdown still releases everything.
    runtime.shutdown().unwrap();
    assert_eq!(ctx.close_count.load(Ordering::SeqCst), 1);
}

#[test]
fn callback_panics_are_contained() {
    let ctx = MockContext::new();
    let runtime = runtime_on(&ctx, NodeConfig::new("node"));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    runtime
        .register_subscriber::<std_msgs::String, _>("chatter", Profile::default(), move |msg| {
            if msg.data.data == "panic" {
                panic!("callback exploded");
            }
            sink.lock().push(msg.data.data.clone());
            Ok(())
        })
        .unwrap();

    let chatter = runtime
        .register_publisher::<std_msgs::String>("chatter", Profile::default())
        .unwrap();
    for data in ["a", "panic", "b"] {
        chatter.publish(&string_msg(data)).unwrap();
    }

    let cancel = CancelToken::new();
    cancel.cancel();
    runtime.spin(&cancel).unwrap();
    assert_eq!(*seen.lock(), vec!["a", "b"]);
}

#[test]
fn service_requests_are_answered() {
    let ctx = MockContext::new();
    let runtime = runtime_on(&ctx, NodeConfig::new("adder"));

    runtime
        .register_service::<AddTwoInts, _>("add_two_ints", Profile::services_default(), |req| {
            AddTwoIntsResponse { sum: req.a + req.b }
        })
        .unwrap();

    let request = AddTwoIntsRequest { a: 40, b: 2 }.to_bytes().unwrap();
    let response_rx = ctx
        .call_service("/add_two_ints", request)
        .expect("service should be registered");

    let cancel = CancelToken::new();
    cancel.cancel();
    runtime.spin(&cancel).unwrap();

    let response = AddTwoIntsResponse::from_bytes(&response_rx.try_recv().unwrap()).unwrap();
    assert_eq!(response.sum, 42);
}

#[test]
fn shutdown_releases_in_reverse_creation_order() {
    let ctx = MockContext::new();
    let runtime = runtime_on(&ctx, NodeConfig::new("node"));

    runtime
        .register_publisher::<std_msgs::String>("first", Profile::default())
        .unwrap();
    runtime
        .register_subscriber::<std_msgs::String, _>("second", Profile::default(), |_| Ok(()))
        .unwrap();
    runtime
        .register_publisher::<std_msgs::String>("third", Profile::default())
        .unwrap();

    runtime.shutdown().unwrap();

    assert_eq!(
        ctx.dropped(),
        vec!["pub:/third", "sub:/second", "pub:/first"]
    );
    assert_eq!(ctx.close_count.load(Ordering::SeqCst), 1);
}

#[test]
fn shutdown_is_idempotent() {
    let ctx = MockContext::new();
    let runtime = runtime_on(&ctx, NodeConfig::new("node"));
    runtime
        .register_publisher::<std_msgs::String>("chatter", Profile::default())
        .unwrap();

    runtime.shutdown().unwrap();
    runtime.shutdown().unwrap();

    // One release per endpoint, one session close.
    assert_eq!(ctx.dropped().len(), 1);
    assert_eq!(ctx.close_count.load(Ordering::SeqCst), 1);
}

#[test]
fn publish_after_shutdown_fails() {
    let ctx = MockContext::new();
    let runtime = runtime_on(&ctx, NodeConfig::new("node"));
    let chatter = runtime
        .register_publisher::<std_msgs::String>("chatter", Profile::default())
        .unwrap();

    runtime.shutdown().unwrap();

    let err = chatter.publish(&string_msg("late")).unwrap_err();
    assert!(matches!(err, Error::AlreadyShutdown));

    // So does further registration.
    let err = runtime
        .register_publisher::<std_msgs::String>("other", Profile::default())
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyShutdown));
}

#[test]
fn drop_shuts_the_runtime_down() {
    let ctx = MockContext::new();
    {
        let runtime = runtime_on(&ctx, NodeConfig::new("node"));
        runtime
            .register_publisher::<std_msgs::String>("chatter", Profile::default())
            .unwrap();
    }
    assert_eq!(ctx.dropped(), vec!["pub:/chatter"]);
    assert_eq!(ctx.close_count.load(Ordering::SeqCst), 1);
}

#[test]
fn namespaced_names_are_expanded() {
    let ctx = MockContext::new();
    let runtime = runtime_on(&ctx, NodeConfig::new("driver").namespace("/robot1"));

    let chatter = runtime
        .register_publisher::<std_msgs::String>("chatter", Profile::default())
        .unwrap();
    assert_eq!(chatter.topic_name(), "/robot1/chatter");

    let private = runtime
        .register_publisher::<std_msgs::String>("~/status", Profile::default())
        .unwrap();
    assert_eq!(private.topic_name(), "/robot1/driver/status");
}

#[test]
fn invalid_node_name_is_rejected() {
    let ctx = MockContext::new();
    let err = NodeRuntime::with_context(NodeConfig::new("bad/name"), ctx).unwrap_err();
    assert!(matches!(err, Error::InvalidName { .. }));
}
