//! Public events of a puppet node
//!
//! - Handler returns bool (true = consumed, stops forwarding)
//! - Handlers are notified in registration order, so an observer that wants
//!   every handler to see an event must return false
//! - Delivery is immediate, on the thread that caused the event

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelEventType {
    /// Model finished setting up
    Loaded,
    /// A tap landed on hit areas
    Hit,
    /// Node is being destroyed
    Destroy,
}

/// Event emitted by a puppet node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    /// Model finished setting up
    Loaded,
    /// A tap landed on these hit areas, in definition order
    Hit(Vec<String>),
    /// Node is being destroyed
    Destroy,
}

impl ModelEvent {
    /// Type of this event
    pub fn event_type(&self) -> ModelEventType {
        match self {
            Self::Loaded => ModelEventType::Loaded,
            Self::Hit(_) => ModelEventType::Hit,
            Self::Destroy => ModelEventType::Destroy,
        }
    }
}

/// Event handler trait
/// Returns true if event was consumed (stops forwarding)
pub trait ModelEventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &ModelEvent) -> bool;
}

impl<F> ModelEventHandler for F
where
    F: FnMut(&ModelEvent) -> bool,
{
    fn on_event(&mut self, event: &ModelEvent) -> bool {
        self(event)
    }
}

/// Handler list of one node
#[derive(Default)]
pub struct ModelEvents {
    handlers: Vec<(Option<ModelEventType>, Box<dyn ModelEventHandler>)>,
}

impl ModelEvents {
    /// Create an empty handler list
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every event type
    pub fn register_handler(&mut self, handler: Box<dyn ModelEventHandler>) {
        self.handlers.push((None, handler));
    }

    /// Register a handler for one event type
    pub fn register_handler_for(&mut self, event_type: ModelEventType, handler: Box<dyn ModelEventHandler>) {
        self.handlers.push((Some(event_type), handler));
    }

    /// Deliver an event; returns whether a handler consumed it
    ///
    /// Handlers registered after the consuming one never see the event.
    pub fn emit(&mut self, event: &ModelEvent) -> bool {
        let event_type = event.event_type();
        for (filter, handler) in &mut self.handlers {
            if filter.map_or(true, |wanted| wanted == event_type) && handler.on_event(event) {
                return true;
            }
        }
        false
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Drop every handler
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl std::fmt::Debug for ModelEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEvents").field("handlers", &self.handlers.len()).finish()
    }
}
