//! Serves `example_interfaces/srv/AddTwoInts` on `add_two_ints`.

use ferros::prelude::*;
use ferros_msg::example_interfaces::{AddTwoInts, AddTwoIntsResponse};

fn main() -> Result<()> {
    init_logging();

    let runtime = NodeRuntime::initialize(NodeConfig::new("add_two_ints_server"))?;
    runtime.register_service::<AddTwoInts, _>(
        "add_two_ints",
        Profile::services_default(),
        |request| {
            tracing::info!("Incoming request: a={} b={}", request.a, request.b);
            AddTwoIntsResponse {
                sum: request.a + request.b,
            }
        },
    )?;

    let cancel = cancel_on_signals()?;
    runtime.spin(&cancel)?;
    runtime.shutdown()
}
