//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{DecisionEvent, PlannerEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Planning requests, completions, adoptions and discards
    Planner,
    /// Behavior changes and session resets
    Decision,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Planner(PlannerEvent),
    Decision(DecisionEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Planner(_) => Topic::Planner,
            Event::Decision(_) => Topic::Decision,
        }
    }
}

impl From<PlannerEvent> for Event {
    fn from(event: PlannerEvent) -> Self {
        Event::Planner(event)
    }
}

impl From<DecisionEvent> for Event {
    fn from(event: DecisionEvent) -> Self {
        Event::Decision(event)
    }
}

/// Topic-based event bus
///
/// Consumers subscribe to the topics they care about. Publishing never
/// blocks, which keeps it usable from the tick thread.
#[derive(Clone)]
pub struct EventBus {
    planner: broadcast::Sender<Event>,
    decision: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            planner: broadcast::channel(capacity).0,
            decision: broadcast::channel(capacity).0,
        }
    }

    fn channel(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Planner => &self.planner,
            Topic::Decision => &self.decision,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.channel(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channel(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_reach_only_their_topic() {
        let bus = EventBus::with_capacity(4);
        let mut planner = bus.subscribe(Topic::Planner);
        let mut decision = bus.subscribe(Topic::Decision);

        bus.publish(DecisionEvent::SessionReset { epoch: 2 });

        assert_eq!(
            decision.try_recv().unwrap(),
            Event::Decision(DecisionEvent::SessionReset { epoch: 2 })
        );
        assert!(planner.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        EventBus::new().publish(PlannerEvent::RequestDropped { epoch: 0, tick: 3 });
    }
}
