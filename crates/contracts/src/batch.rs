//! Event batches
//!
//! A batch is either a single-pass stream or a materialized list. Only the
//! materialized form can be handed to several destinations.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::{ContractError, Event, EventTime, Record};

/// Single-pass event source
///
/// Iterated at most once. Items are fallible so that a failing source
/// (broken pipe, bad line) surfaces while draining.
pub struct EventStream {
    inner: Box<dyn Iterator<Item = Result<Event, ContractError>>>,
}

impl EventStream {
    /// Wrap a fallible event iterator
    pub fn new<I>(events: I) -> Self
    where
        I: IntoIterator<Item = Result<Event, ContractError>>,
        I::IntoIter: 'static,
    {
        Self {
            inner: Box::new(events.into_iter()),
        }
    }

    /// Wrap an infallible sequence of events
    pub fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = Event>,
        I::IntoIter: 'static,
    {
        Self::new(events.into_iter().map(Ok))
    }
}

impl Iterator for EventStream {
    type Item = Result<Event, ContractError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}

/// Materialized, re-iterable batch
///
/// `Clone` hands out another handle to the *same* list: an in-place change
/// made through one handle is visible through all of them. Use
/// [`RepeatableBatch::duplicate`] for an isolated copy.
///
/// Borrows taken through [`events`](Self::events) or
/// [`events_mut`](Self::events_mut) must be released before the next
/// destination runs, i.e. before calling `advance()` on the chain.
#[derive(Debug, Clone, Default)]
pub struct RepeatableBatch {
    events: Rc<RefCell<Vec<Event>>>,
}

impl RepeatableBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a batch from an ordered list of events
    pub fn from_events(events: Vec<Event>) -> Self {
        Self {
            events: Rc::new(RefCell::new(events)),
        }
    }

    /// Create a batch holding exactly one event
    pub fn one(time: EventTime, record: Record) -> Self {
        Self::from_events(vec![Event::new(time, record)])
    }

    /// Append an event
    pub fn push(&self, time: EventTime, record: Record) {
        self.events.borrow_mut().push(Event::new(time, record));
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Whether the batch holds no events
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Borrow the events for reading
    pub fn events(&self) -> Ref<'_, [Event]> {
        Ref::map(self.events.borrow(), Vec::as_slice)
    }

    /// Borrow the events for in-place mutation
    pub fn events_mut(&self) -> RefMut<'_, Vec<Event>> {
        self.events.borrow_mut()
    }

    /// Owned copy of the events
    pub fn to_vec(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Independent deep copy: same ordered pairs, every record copied
    pub fn duplicate(&self) -> Self {
        Self::from_events(self.to_vec())
    }

    /// Whether two handles point to the same underlying list
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.events, &other.events)
    }
}

impl From<Vec<Event>> for RepeatableBatch {
    fn from(events: Vec<Event>) -> Self {
        Self::from_events(events)
    }
}

impl FromIterator<Event> for RepeatableBatch {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::from_events(iter.into_iter().collect())
    }
}

/// Incoming batch in either representation
#[derive(Debug)]
pub enum EventBatch {
    /// Single-pass source, must be drained before fan-out
    Streaming(EventStream),
    /// Materialized list
    Repeatable(RepeatableBatch),
}

impl EventBatch {
    /// Whether the batch can be iterated more than once
    pub fn is_repeatable(&self) -> bool {
        matches!(self, Self::Repeatable(_))
    }

    /// Convert to the repeatable form
    ///
    /// A repeatable batch is returned as-is (same instance). A stream is
    /// drained once, in order; the first source error is returned unchanged
    /// and the partially drained events are discarded.
    pub fn ensure_repeatable(self) -> Result<RepeatableBatch, ContractError> {
        match self {
            Self::Repeatable(batch) => Ok(batch),
            Self::Streaming(stream) => {
                let events = stream.collect::<Result<Vec<_>, _>>()?;
                Ok(RepeatableBatch::from_events(events))
            }
        }
    }
}

impl From<RepeatableBatch> for EventBatch {
    fn from(batch: RepeatableBatch) -> Self {
        Self::Repeatable(batch)
    }
}

impl From<EventStream> for EventBatch {
    fn from(stream: EventStream) -> Self {
        Self::Streaming(stream)
    }
}
