use ludo_core::entity::EntityKind;
use ludo_core::responses::OrderResponse;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `ludo order`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&order_response()?, flags.format)
}

fn order_response() -> anyhow::Result<OrderResponse> {
    let plan = EntityKind::graph().plan()?;
    Ok(OrderResponse {
        insertion: plan.insertion,
        deletion: plan.deletion,
    })
}
