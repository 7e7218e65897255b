//! Turns use case deliveries into socket writes.

use crate::{
    domain::{Delivery, DeliveryTarget, MessagePusher},
    infrastructure::dto::conversion::encode_event,
};

/// Encode each delivery once and write it to every recipient's queue.
///
/// Returns the number of queue writes attempted.
pub(super) async fn push_deliveries(pusher: &dyn MessagePusher, deliveries: Vec<Delivery>) -> usize {
    let mut attempted = 0;

    for delivery in deliveries {
        if delivery.recipients.is_empty() {
            continue;
        }

        let event_name = delivery.event.name();
        let frame = match encode_event(delivery.event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(event = event_name, "Failed to encode outbound event: {}", e);
                continue;
            }
        };

        attempted += delivery.recipients.len();
        let result = match delivery.target {
            DeliveryTarget::Connection(connection_id) => {
                pusher.push_to(&connection_id, &frame).await
            }
            DeliveryTarget::Channel(_) => pusher.broadcast(delivery.recipients, &frame).await,
        };
        if let Err(e) = result {
            tracing::warn!(event = event_name, "Failed to push outbound event: {}", e);
        }
    }

    attempted
}
