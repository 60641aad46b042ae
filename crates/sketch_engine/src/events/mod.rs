//! Named publish/subscribe events
//!
//! Game code invents its own event names ("wave/cleared", "player/died")
//! and attaches keyed arguments. Handlers subscribe by name and run in
//! registration order; a handler returning true swallows the event.
//! Delivery is either right away ([`EventBus::emit`]), at the end of the
//! frame ([`EventBus::send`]) or after a delay ([`EventBus::post`]).

use std::collections::HashMap;

use crate::foundation::collections::ObjectId;

/// Value of a keyed event argument
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f32),
    /// Flag
    Bool(bool),
    /// Free text
    Text(String),
    /// Position coordinates
    Position(f32, f32),
    /// Reference to a GameObject in the active scene
    Object(ObjectId),
}

/// Event with a name and key-value arguments
#[derive(Debug, Clone)]
pub struct Event {
    /// Name handlers register for
    pub name: String,
    /// Bus time the event was raised at, in seconds
    pub timestamp: f64,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Create a new event with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: 0.0,
            args: HashMap::new(),
        }
    }

    /// Attach `value` under `key`
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Raw argument under `key`
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Get an integer argument if present
    pub fn get_int(&self, key: &str) -> Option<i64> {
        if let Some(EventArg::Int(value)) = self.get_arg(key) {
            Some(*value)
        } else {
            None
        }
    }

    /// Get a float argument if present
    pub fn get_float(&self, key: &str) -> Option<f32> {
        if let Some(EventArg::Float(value)) = self.get_arg(key) {
            Some(*value)
        } else {
            None
        }
    }

    /// Get a text argument if present
    pub fn get_text(&self, key: &str) -> Option<&str> {
        if let Some(EventArg::Text(value)) = self.get_arg(key) {
            Some(value)
        } else {
            None
        }
    }

    /// Get a position argument if present
    pub fn get_position(&self, key: &str) -> Option<(f32, f32)> {
        if let Some(EventArg::Position(x, y)) = self.get_arg(key) {
            Some((*x, *y))
        } else {
            None
        }
    }

    /// Get an object argument if present
    pub fn get_object(&self, key: &str) -> Option<ObjectId> {
        if let Some(EventArg::Object(id)) = self.get_arg(key) {
            Some(*id)
        } else {
            None
        }
    }
}

/// Subscriber to named events; closures taking `&Event` qualify
pub trait EventHandler {
    /// React to `event`; true stops later subscribers from seeing it
    fn on_event(&mut self, event: &Event) -> bool;
}

impl<F> EventHandler for F
where
    F: FnMut(&Event) -> bool,
{
    fn on_event(&mut self, event: &Event) -> bool {
        self(event)
    }
}

/// Subscriptions by event name plus the queues of undelivered events
#[derive(Default)]
pub struct EventBus {
    immediate_queue: Vec<Event>,
    deferred_queue: Vec<(f64, Event)>,
    handlers: HashMap<String, Vec<Box<dyn EventHandler>>>,
    current_time: f64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending())
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("current_time", &self.current_time)
            .finish()
    }
}

impl EventBus {
    /// Create a new empty event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bus clock; deferred events compare against it
    pub fn update_time(&mut self, time: f64) {
        self.current_time = time;
    }

    /// Subscribe `handler` to events called `name`
    pub fn on(&mut self, name: impl Into<String>, handler: impl EventHandler + 'static) {
        self.handlers.entry(name.into()).or_default().push(Box::new(handler));
    }

    /// Number of handlers registered for `name`
    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }

    /// Deliver an event right now, returns true if a handler consumed it
    pub fn emit(&mut self, mut event: Event) -> bool {
        event.timestamp = self.current_time;
        self.dispatch_event(&event)
    }

    /// Queue an event for the next `dispatch`
    pub fn send(&mut self, mut event: Event) {
        event.timestamp = self.current_time;
        self.immediate_queue.push(event);
    }

    /// Queue an event for delivery `delay` seconds from now
    pub fn post(&mut self, delay: f64, mut event: Event) {
        event.timestamp = self.current_time;
        self.deferred_queue.push((self.current_time + delay, event));
    }

    /// Number of events still waiting in either queue
    pub fn pending(&self) -> usize {
        self.immediate_queue.len() + self.deferred_queue.len()
    }

    /// Deliver end-of-frame events, then deferred events that are due
    pub fn dispatch(&mut self) {
        for event in std::mem::take(&mut self.immediate_queue) {
            self.dispatch_event(&event);
        }

        let now = self.current_time;
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.deferred_queue)
            .into_iter()
            .partition(|(delivery_time, _)| *delivery_time <= now);
        self.deferred_queue = waiting;
        for (_, event) in due {
            self.dispatch_event(&event);
        }
    }

    fn dispatch_event(&mut self, event: &Event) -> bool {
        let Some(handlers) = self.handlers.get_mut(&event.name) else {
            log::trace!("No handlers for event '{}'", event.name);
            return false;
        };
        handlers.iter_mut().any(|handler| handler.on_event(event))
    }

    /// Drop queued events, keeping subscriptions
    pub fn clear(&mut self) {
        self.immediate_queue.clear();
        self.deferred_queue.clear();
    }

    /// Drop every handler and queued event
    pub fn reset(&mut self) {
        self.clear();
        self.handlers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str, consume: bool) -> impl FnMut(&Event) -> bool {
        let log = Rc::clone(log);
        move |event: &Event| {
            log.borrow_mut().push(format!("{tag}:{}", event.name));
            consume
        }
    }

    #[test]
    fn test_emit_reaches_only_matching_handlers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.on("enemy_died", recorder(&log, "a", false));
        bus.on("wave_started", recorder(&log, "b", false));

        bus.emit(Event::new("enemy_died").with_arg("reward", EventArg::Int(5)));
        assert_eq!(*log.borrow(), vec!["a:enemy_died".to_string()]);
    }

    #[test]
    fn test_send_waits_for_dispatch() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.on("ping", recorder(&log, "a", false));

        bus.send(Event::new("ping"));
        assert!(log.borrow().is_empty());
        bus.dispatch();
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_deferred_dispatch() {
        let mut bus = EventBus::new();
        bus.update_time(0.0);
        bus.post(1.0, Event::new("later"));

        bus.update_time(0.5);
        bus.dispatch();
        assert_eq!(bus.pending(), 1);

        bus.update_time(1.0);
        bus.dispatch();
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_event_consumption() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.on("hit", recorder(&log, "first", true));
        bus.on("hit", recorder(&log, "second", false));

        assert!(bus.emit(Event::new("hit")));
        assert_eq!(*log.borrow(), vec!["first:hit".to_string()]);
        assert_eq!(bus.handler_count("hit"), 2);
    }

    #[test]
    fn test_typed_getters() {
        let event = Event::new("spawn")
            .with_arg("at", EventArg::Position(1.0, 2.0))
            .with_arg("kind", EventArg::Text("tank".into()));
        assert_eq!(event.get_position("at"), Some((1.0, 2.0)));
        assert_eq!(event.get_text("kind"), Some("tank"));
        assert_eq!(event.get_int("at"), None);
    }
}
