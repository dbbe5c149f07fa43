//! Logs everything heard on `chatter`, like the `demo-nodes-cpp` listener.

use ferros::prelude::*;
use ferros_msg::std_msgs;

fn main() -> Result<()> {
    init_logging();

    let runtime = NodeRuntime::initialize(NodeConfig::new("listener"))?;
    runtime.register_subscriber::<std_msgs::String, _>("chatter", Profile::default(), |msg| {
        tracing::info!("I heard: '{}'", msg.data.data);
        Ok(())
    })?;

    let cancel = cancel_on_signals()?;
    runtime.spin(&cancel)?;
    runtime.shutdown()
}
