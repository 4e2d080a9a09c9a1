use crate::event::LogEvent;

pub mod enrich;

/// Transforms come in two variants in a full pipeline runtime: functions,
/// or tasks. This core only ever builds function transforms.
pub enum Transform {
    /// A stateless per-event function.
    Function(Box<dyn FunctionTransform>),
}

impl Transform {
    /// Create a new function transform.
    ///
    /// These functions are "stateless" and can be run in parallel, without
    /// regard for coordination.
    pub fn function(v: impl FunctionTransform + 'static) -> Self {
        Transform::Function(Box::new(v))
    }

    /// Unwraps into the inner function transform.
    pub fn into_function(self) -> Box<dyn FunctionTransform> {
        match self {
            Transform::Function(function) => function,
        }
    }
}

/// Transforms that are simple, and don't require attention to coordination.
/// You can run them as simple functions over events in any order.
pub trait FunctionTransform: Send + Sync + dyn_clone::DynClone {
    /// Processes one event, pushing any results into `output`.
    fn transform(&mut self, output: &mut OutputBuffer, event: LogEvent);
}

dyn_clone::clone_trait_object!(FunctionTransform);

/// Buffer into which function transforms emit their results.
#[derive(Clone, Debug, Default)]
pub struct OutputBuffer(Vec<LogEvent>);

impl OutputBuffer {
    /// A buffer with room for `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Pushes a single event.
    pub fn push(&mut self, event: LogEvent) {
        self.0.push(event);
    }

    /// Pushes every event from the iterator.
    pub fn extend(&mut self, events: impl Iterator<Item = LogEvent>) {
        self.0.extend(events);
    }

    /// True when no events have been emitted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of buffered events.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The first buffered event, if any.
    pub fn first(&self) -> Option<&LogEvent> {
        self.0.first()
    }

    /// Drains the buffered events.
    pub fn drain(&mut self) -> impl Iterator<Item = LogEvent> + '_ {
        self.0.drain(..)
    }

    /// Consumes the buffer, yielding its events.
    pub fn into_events(self) -> impl Iterator<Item = LogEvent> {
        self.0.into_iter()
    }
}

impl From<Vec<LogEvent>> for OutputBuffer {
    fn from(events: Vec<LogEvent>) -> Self {
        Self(events)
    }
}
