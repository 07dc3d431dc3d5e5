//! Per-unit validation without errors as control flow.
//!
//! An [`ErrorRule`] pairs a predicate with a handler. An [`ErrorChecker`] is
//! an ordered list of rules: [`ErrorChecker::validate`] evaluates every rule,
//! fires the handler of each one that fails and reports whether all passed.
//! The engines call it right before running a transform on one unit of work
//! (an element, an element pair or a whole branch); a failure only suppresses
//! that unit's output.
//!
//! Handlers usually report to a [`DiagnosticSink`]. The sink is a handle the
//! caller passes in when building the rule; there is no global sink.
//!
//! ```rust
//! use std::sync::Arc;
//! use partree::validation::{CollectingSink, ErrorChecker, ErrorRule, Severity};
//!
//! let sink = Arc::new(CollectingSink::new());
//! let checker = ErrorChecker::new().with_rule(ErrorRule::reporting(
//!     |x: &f64| *x >= 0.0,
//!     sink.clone(),
//!     Severity::Warning,
//!     |x| format!("negative input {x}"),
//! ));
//!
//! assert!(checker.validate(&1.0));
//! assert!(!checker.validate(&-1.0));
//! assert_eq!(sink.len(), 1);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

/// Unit validated by a zip: one element from each side.
pub type Pair<'a, T, Q> = (&'a T, &'a Q);

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational.
    Remark,
    /// The unit was skipped, the run is otherwise fine.
    Warning,
    /// The unit was skipped and the caller should look at the input.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Remark => "remark",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// One reported event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the event.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

/// Receiver for validation diagnostics.
///
/// Handlers run on worker threads, so sinks must be `Send + Sync`.
pub trait DiagnosticSink: Send + Sync {
    /// Records one event. Must not block for long.
    fn report(&self, severity: Severity, message: &str);
}

/// Sink that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything reported so far, in arrival order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Number of diagnostics reported.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Removes and returns everything reported so far.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(|p| p.into_inner()))
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, severity: Severity, message: &str) {
        let mut guard = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        guard.push(Diagnostic {
            severity,
            message: message.to_owned(),
        });
    }
}

/// Sink that forwards to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Remark => log::info!("{message}"),
            Severity::Warning => log::warn!("{message}"),
            Severity::Error => log::error!("{message}"),
        }
    }
}

type Predicate<U> = Box<dyn Fn(&U) -> bool + Send + Sync>;
type Message<U> = Box<dyn Fn(&U) -> String + Send + Sync>;

enum Handler<U: ?Sized> {
    Custom(Box<dyn Fn(&U) + Send + Sync>),
    Report {
        sink: Arc<dyn DiagnosticSink>,
        severity: Severity,
        message: Message<U>,
    },
}

/// A predicate over one unit of work plus the handler fired when it fails.
pub struct ErrorRule<U: ?Sized> {
    predicate: Predicate<U>,
    handler: Handler<U>,
}

impl<U: ?Sized> ErrorRule<U> {
    /// Creates a rule from a predicate and a failure handler.
    pub fn new<P, H>(predicate: P, handler: H) -> Self
    where
        P: Fn(&U) -> bool + Send + Sync + 'static,
        H: Fn(&U) + Send + Sync + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            handler: Handler::Custom(Box::new(handler)),
        }
    }

    /// Creates a rule whose handler reports `message(unit)` to `sink`.
    pub fn reporting<P, M>(
        predicate: P,
        sink: Arc<dyn DiagnosticSink>,
        severity: Severity,
        message: M,
    ) -> Self
    where
        P: Fn(&U) -> bool + Send + Sync + 'static,
        M: Fn(&U) -> String + Send + Sync + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            handler: Handler::Report {
                sink,
                severity,
                message: Box::new(message),
            },
        }
    }

    /// Evaluates the predicate, running the handler on failure.
    pub fn check(&self, unit: &U) -> bool {
        let ok = (self.predicate)(unit);
        if !ok {
            match &self.handler {
                Handler::Custom(handler) => handler(unit),
                Handler::Report {
                    sink,
                    severity,
                    message,
                } => sink.report(*severity, &message(unit)),
            }
        }
        ok
    }
}

impl<U: ?Sized> fmt::Debug for ErrorRule<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorRule")
    }
}

/// Ordered set of [`ErrorRule`]s gating one kind of unit.
pub struct ErrorChecker<U: ?Sized> {
    rules: Vec<ErrorRule<U>>,
}

impl<U: ?Sized> ErrorChecker<U> {
    /// A checker with no rules; it accepts every unit.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule, builder style.
    pub fn with_rule(mut self, rule: ErrorRule<U>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds a rule.
    pub fn push(&mut self, rule: ErrorRule<U>) {
        self.rules.push(rule);
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule against `unit`.
    ///
    /// All rules are evaluated even after a failure, so each failing rule's
    /// handler fires exactly once.
    pub fn validate(&self, unit: &U) -> bool {
        self.rules
            .iter()
            .fold(true, |all_ok, rule| rule.check(unit) && all_ok)
    }
}

impl<U: ?Sized> Default for ErrorChecker<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: ?Sized> fmt::Debug for ErrorChecker<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorChecker")
            .field("rules", &self.rules.len())
            .finish()
    }
}
