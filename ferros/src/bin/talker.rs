//! Periodically publishes greetings on `chatter`, like the
//! `demo-nodes-cpp` talker.

use ferros::prelude::*;
use ferros_msg::std_msgs;
use std::{thread, time::Duration};

fn main() -> Result<()> {
    init_logging();

    let runtime = NodeRuntime::initialize(NodeConfig::new("talker"))?;
    let chatter = runtime.register_publisher::<std_msgs::String>("chatter", Profile::default())?;
    let cancel = cancel_on_signals()?;

    let mut count = 0u64;
    while !cancel.is_cancelled() {
        count += 1;
        let msg = std_msgs::String {
            data: format!("Hello World: {count}"),
        };
        tracing::info!("Publishing: '{}'", msg.data);
        chatter.publish(&msg)?;
        thread::sleep(Duration::from_secs(1));
    }

    runtime.shutdown()
}
