//! Attachable event-sink hooks reporting value construction, assignment and
//! operator applications.
//!
//! Wrapper types that want their lifecycle observed (for diagram writers,
//! debuggers or other tooling) report three kinds of events through a
//! [`ValueEventHooks`] instance:
//!
//! * construction: `(origin, result, transfer kind)` — the origin is absent
//!   when the value was built from a bare primitive;
//! * plain assignment: `(left, right, transfer kind)`;
//! * binary/compound operators: `(left, right, result, operator name)`.
//!
//! The hooks themselves do nothing: every report is a no-op unless a consumer
//! implementing [`ValueEventSink`] is attached *and* reporting is enabled. The
//! sink is injected explicitly — there is no process-wide singleton — and can
//! be detached or disabled at any time without affecting the reporting types.
//!
//! # Example
//!
//! ```rust
//! use value_events::{TransferKind, ValueEventHooks, ValueEventSink, ValueToken};
//!
//! #[derive(Default)]
//! struct CountingSink {
//!     constructions: usize,
//! }
//!
//! impl ValueEventSink for CountingSink {
//!     fn construction(
//!         &mut self,
//!         _origin: Option<ValueToken>,
//!         _result: ValueToken,
//!         _kind: TransferKind,
//!     ) {
//!         self.constructions += 1;
//!     }
//!
//!     fn assignment(&mut self, _left: ValueToken, _right: ValueToken, _kind: TransferKind) {}
//!
//!     fn binary_operator(
//!         &mut self,
//!         _left: ValueToken,
//!         _right: ValueToken,
//!         _result: ValueToken,
//!         _operator: &str,
//!     ) {
//!     }
//! }
//!
//! let mut hooks = ValueEventHooks::new();
//!
//! let value = 5_i64;
//! let token = ValueToken::of(&value);
//!
//! // Nothing attached: reports vanish.
//! hooks.report_construction(None, token, TransferKind::Copy);
//!
//! hooks.attach(Box::new(CountingSink::default()));
//! hooks.report_construction(None, token, TransferKind::Move);
//! ```

/// How a value traveled into its destination.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TransferKind {
    /// The source was duplicated and remains usable.
    Copy,

    /// The source gave its contents up.
    Move,
}

/// Opaque identity of a tracked value, derived from its address.
///
/// Tokens only identify a value for the duration of its lifetime; a token
/// taken from a dead value may collide with a newer one at the same address.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ValueToken(usize);

impl ValueToken {
    /// The token of `value` for as long as `value` stays where it is.
    #[must_use]
    pub fn of<T>(value: &T) -> Self {
        Self(std::ptr::from_ref(value) as usize)
    }

    /// The raw address the token was derived from.
    #[must_use]
    pub fn raw(self) -> usize {
        self.0
    }
}

/// A consumer of value lifecycle events.
///
/// Implementations decide what an event means — writing a graph node, counting
/// copies, asserting in tests. Reporters never depend on any of it.
pub trait ValueEventSink {
    /// A value came into existence, either from another tracked value
    /// (`origin` present) or from a bare primitive.
    fn construction(&mut self, origin: Option<ValueToken>, result: ValueToken, kind: TransferKind);

    /// A plain assignment replaced the contents of `left` with `right`.
    fn assignment(&mut self, left: ValueToken, right: ValueToken, kind: TransferKind);

    /// A binary or compound operator combined `left` and `right` into
    /// `result`.
    fn binary_operator(
        &mut self,
        left: ValueToken,
        right: ValueToken,
        result: ValueToken,
        operator: &str,
    );
}

/// The hook point reporters talk to: an optionally attached sink plus an
/// enabled flag.
///
/// Every `report_*` call is a no-op unless a sink is attached and reporting is
/// enabled, so reporters never pay more than a branch when nobody listens.
pub struct ValueEventHooks {
    sink: Option<Box<dyn ValueEventSink>>,

    enabled: bool,
}

impl ValueEventHooks {
    /// Creates hooks with no sink attached and reporting enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: None,
            enabled: true,
        }
    }

    /// Installs the consumer that future reports go to, replacing any previous
    /// one.
    pub fn attach(&mut self, sink: Box<dyn ValueEventSink>) {
        self.sink = Some(sink);
    }

    /// Removes and returns the current consumer, if any.
    pub fn detach(&mut self) -> Option<Box<dyn ValueEventSink>> {
        self.sink.take()
    }

    /// Whether a consumer is currently attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.sink.is_some()
    }

    /// Turns reporting on or off without touching the attached consumer.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether reports are currently forwarded.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reports a construction event.
    pub fn report_construction(
        &mut self,
        origin: Option<ValueToken>,
        result: ValueToken,
        kind: TransferKind,
    ) {
        if !self.enabled {
            return;
        }

        if let Some(sink) = self.sink.as_mut() {
            sink.construction(origin, result, kind);
        }
    }

    /// Reports a plain assignment event.
    pub fn report_assignment(&mut self, left: ValueToken, right: ValueToken, kind: TransferKind) {
        if !self.enabled {
            return;
        }

        if let Some(sink) = self.sink.as_mut() {
            sink.assignment(left, right, kind);
        }
    }

    /// Reports a binary or compound operator event.
    pub fn report_binary_operator(
        &mut self,
        left: ValueToken,
        right: ValueToken,
        result: ValueToken,
        operator: &str,
    ) {
        if !self.enabled {
            return;
        }

        if let Some(sink) = self.sink.as_mut() {
            sink.binary_operator(left, right, result, operator);
        }
    }
}

impl Default for ValueEventHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValueEventHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueEventHooks")
            .field("attached", &self.is_attached())
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// One recorded event, flattened for easy assertions.
    #[derive(Clone, Debug, Eq, PartialEq)]
    enum Event {
        Construction(Option<ValueToken>, ValueToken, TransferKind),
        Assignment(ValueToken, ValueToken, TransferKind),
        Operator(ValueToken, ValueToken, ValueToken, String),
    }

    struct RecordingSink {
        events: Rc<RefCell<Vec<Event>>>,
    }

    impl ValueEventSink for RecordingSink {
        fn construction(
            &mut self,
            origin: Option<ValueToken>,
            result: ValueToken,
            kind: TransferKind,
        ) {
            self.events
                .borrow_mut()
                .push(Event::Construction(origin, result, kind));
        }

        fn assignment(&mut self, left: ValueToken, right: ValueToken, kind: TransferKind) {
            self.events
                .borrow_mut()
                .push(Event::Assignment(left, right, kind));
        }

        fn binary_operator(
            &mut self,
            left: ValueToken,
            right: ValueToken,
            result: ValueToken,
            operator: &str,
        ) {
            self.events.borrow_mut().push(Event::Operator(
                left,
                right,
                result,
                operator.to_string(),
            ));
        }
    }

    fn recording_hooks() -> (ValueEventHooks, Rc<RefCell<Vec<Event>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = ValueEventHooks::new();

        hooks.attach(Box::new(RecordingSink {
            events: Rc::clone(&events),
        }));

        (hooks, events)
    }

    #[test]
    fn events_reach_the_attached_sink() {
        let (mut hooks, events) = recording_hooks();

        let left = 1_u32;
        let right = 2_u32;
        let result = 3_u32;

        hooks.report_construction(None, ValueToken::of(&left), TransferKind::Copy);
        hooks.report_assignment(
            ValueToken::of(&left),
            ValueToken::of(&right),
            TransferKind::Move,
        );
        hooks.report_binary_operator(
            ValueToken::of(&left),
            ValueToken::of(&right),
            ValueToken::of(&result),
            "+",
        );

        let events = events.borrow();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events.first(),
            Some(&Event::Construction(
                None,
                ValueToken::of(&left),
                TransferKind::Copy
            ))
        );
        assert_eq!(
            events.last(),
            Some(&Event::Operator(
                ValueToken::of(&left),
                ValueToken::of(&right),
                ValueToken::of(&result),
                "+".to_string()
            ))
        );
    }

    #[test]
    fn nothing_is_reported_without_a_sink() {
        let mut hooks = ValueEventHooks::new();
        let value = 1_u32;

        // Must simply not blow up.
        hooks.report_construction(None, ValueToken::of(&value), TransferKind::Copy);
        assert!(!hooks.is_attached());
    }

    #[test]
    fn disabling_suppresses_reports_without_detaching() {
        let (mut hooks, events) = recording_hooks();
        let value = 1_u32;

        hooks.set_enabled(false);
        hooks.report_construction(None, ValueToken::of(&value), TransferKind::Copy);

        assert!(events.borrow().is_empty());
        assert!(hooks.is_attached());

        hooks.set_enabled(true);
        hooks.report_construction(None, ValueToken::of(&value), TransferKind::Copy);

        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn detach_returns_the_sink() {
        let (mut hooks, _events) = recording_hooks();

        let sink = hooks.detach();

        assert!(sink.is_some());
        assert!(!hooks.is_attached());
        assert!(hooks.detach().is_none());
    }

    #[test]
    fn tokens_identify_distinct_values() {
        let a = 1_u64;
        let b = 2_u64;

        assert_ne!(ValueToken::of(&a), ValueToken::of(&b));
        assert_eq!(ValueToken::of(&a), ValueToken::of(&a));
        assert_eq!(ValueToken::of(&a).raw(), std::ptr::from_ref(&a) as usize);
    }
}
