//! Typed publish/subscribe event registry
//!
//! Listeners subscribe per event kind and are called synchronously, in
//! subscription order, when a matching event is published.

use std::collections::BTreeMap;

use crate::EntityId;
use crate::sim::GameState;

/// Notifications raised by the game core for external listeners
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Per-scene setup finished, player placed at spawn
    LevelEntered { scene: String },
    /// Player reached the finish zone
    LevelComplete { scene: String },
    /// Level left through the level manager
    LevelEnded { scene: String },
    /// Player touched a deadzone
    PlayerDied,
    /// Game state machine applied a transition
    GameStateChanged { from: GameState, to: GameState },
    /// The interaction gate activated a target
    TargetActivated { target: EntityId },
}

/// Discriminant used as the subscription key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    LevelEntered,
    LevelComplete,
    LevelEnded,
    PlayerDied,
    GameStateChanged,
    TargetActivated,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::LevelEntered { .. } => EventKind::LevelEntered,
            GameEvent::LevelComplete { .. } => EventKind::LevelComplete,
            GameEvent::LevelEnded { .. } => EventKind::LevelEnded,
            GameEvent::PlayerDied => EventKind::PlayerDied,
            GameEvent::GameStateChanged { .. } => EventKind::GameStateChanged,
            GameEvent::TargetActivated { .. } => EventKind::TargetActivated,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u32);

type Listener = Box<dyn FnMut(&GameEvent)>;

/// Event registry keyed by event kind
#[derive(Default)]
pub struct EventBus {
    listeners: BTreeMap<EventKind, Vec<(SubscriptionId, Listener)>>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one event kind
    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(idx) = list.iter().position(|(sub, _)| *sub == id) {
                list.remove(idx);
                return true;
            }
        }
        false
    }

    /// Number of listeners registered for a kind
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver an event to every listener of its kind.
    /// Returns how many listeners were notified.
    pub fn publish(&mut self, event: GameEvent) -> usize {
        let kind = event.kind();
        match self.listeners.get_mut(&kind) {
            Some(list) if !list.is_empty() => {
                for (_, listener) in list.iter_mut() {
                    listener(&event);
                }
                list.len()
            }
            _ => {
                log::warn!("No listeners registered for {:?}", kind);
                0
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<_, _> = self.listeners.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_without_listeners_is_noop() {
        let mut bus = EventBus::new();
        assert_eq!(bus.publish(GameEvent::PlayerDied), 0);
    }

    #[test]
    fn test_listeners_only_see_their_kind() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::LevelComplete, move |e| sink.borrow_mut().push(e.clone()));

        bus.publish(GameEvent::PlayerDied);
        bus.publish(GameEvent::LevelComplete {
            scene: "Level1".into(),
        });

        assert_eq!(
            *seen.borrow(),
            vec![GameEvent::LevelComplete {
                scene: "Level1".into()
            }]
        );
    }

    #[test]
    fn test_subscription_order_and_unsubscribe() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let a = Rc::clone(&order);
        let first = bus.subscribe(EventKind::PlayerDied, move |_| a.borrow_mut().push("first"));
        let b = Rc::clone(&order);
        bus.subscribe(EventKind::PlayerDied, move |_| b.borrow_mut().push("second"));

        assert_eq!(bus.publish(GameEvent::PlayerDied), 2);
        assert!(bus.unsubscribe(first));
        assert!(!bus.unsubscribe(first));
        assert_eq!(bus.publish(GameEvent::PlayerDied), 1);

        assert_eq!(*order.borrow(), vec!["first", "second", "second"]);
        assert_eq!(bus.listener_count(EventKind::PlayerDied), 1);
    }
}
