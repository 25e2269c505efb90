//! Cooperative, single-threaded sequencing.
//!
//! Nothing here blocks. A step that has to wait (for text to be read, a menu
//! choice, an effect to finish) is handed a [`Continuation`] and returns; when
//! the collaborator is done it resumes the continuation, which queues the rest
//! of the chain on the [`Scheduler`]. The coordinator drains that queue,
//! giving every task the `&mut BattleSession` it runs against.

use crate::battle::coordinator::BattleSession;
use crate::services::Effect;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

pub type Task = Box<dyn FnOnce(&mut BattleSession)>;

thread_local! {
    /// Nesting depth of cancellations in progress. While it is non-zero,
    /// continuations dropped along with a cancelled closure count as
    /// abandoned.
    static ABANDONING: Cell<usize> = const { Cell::new(0) };
}

/// Run `cancel` with every continuation it drops treated as abandoned.
fn abandoning<R>(cancel: impl FnOnce() -> R) -> R {
    ABANDONING.with(|depth| depth.set(depth.get() + 1));
    let result = cancel();
    ABANDONING.with(|depth| depth.set(depth.get() - 1));
    result
}

fn is_abandoning() -> bool {
    ABANDONING.with(|depth| depth.get() > 0)
}

type ReadyQueue = Rc<RefCell<VecDeque<Task>>>;

/// Ready queue shared by every continuation of one coordinator.
#[derive(Clone, Default)]
pub struct Scheduler {
    ready: ReadyQueue,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, task: impl FnOnce(&mut BattleSession) + 'static) {
        self.ready.borrow_mut().push_back(Box::new(task));
    }

    pub fn pop(&self) -> Option<Task> {
        self.ready.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.ready.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.ready.borrow().is_empty()
    }

    /// Drop every queued task, abandoning whatever they still hold. Returns
    /// how many were discarded.
    pub fn clear(&self) -> usize {
        let discarded: Vec<Task> = self.ready.borrow_mut().drain(..).collect();
        let count = discarded.len();
        abandoning(move || drop(discarded));
        count
    }

    pub fn continuation<T: 'static>(
        &self,
        label: impl Into<String>,
        next: impl FnOnce(&mut BattleSession, T) + 'static,
    ) -> Continuation<T> {
        Continuation {
            label: label.into(),
            next: Some(Box::new(next)),
            ready: Rc::clone(&self.ready),
        }
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler").field("ready", &self.len()).finish()
    }
}

/// One-shot handle for the next step of a chain.
///
/// `resume` consumes the handle, so a continuation cannot be resumed twice.
/// Dropping one that was neither resumed nor abandoned is a bug in the chain
/// and trips a debug assertion.
pub struct Continuation<T = ()> {
    label: String,
    next: Option<Box<dyn FnOnce(&mut BattleSession, T)>>,
    ready: ReadyQueue,
}

impl<T: 'static> Continuation<T> {
    pub fn resume(mut self, value: T) {
        if let Some(next) = self.next.take() {
            trace!(label = %self.label, "continuation resumed");
            self.ready
                .borrow_mut()
                .push_back(Box::new(move |session: &mut BattleSession| next(session, value)));
        }
    }

    /// Cancel the chain. Used when a flee or a knockout ends the battle early.
    /// Continuations captured by the cancelled step are abandoned with it.
    pub fn abandon(mut self) {
        trace!(label = %self.label, "continuation abandoned");
        let next = self.next.take();
        abandoning(move || drop(next));
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T> Drop for Continuation<T> {
    fn drop(&mut self) {
        if self.next.is_some() && !is_abandoning() && !std::thread::panicking() {
            debug_assert!(
                false,
                "continuation '{}' dropped without being resumed",
                self.label
            );
        }
    }
}

impl<T> fmt::Debug for Continuation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("label", &self.label)
            .field("pending", &self.next.is_some())
            .finish()
    }
}

pub type Step = Box<dyn FnOnce(&mut BattleSession, Continuation)>;

/// Ordered presentation steps, each started once the previous one resumes.
pub struct Sequence {
    label: String,
    steps: VecDeque<Step>,
}

impl Sequence {
    pub fn new(label: impl Into<String>) -> Self {
        Sequence {
            label: label.into(),
            steps: VecDeque::new(),
        }
    }

    pub fn then(mut self, step: impl FnOnce(&mut BattleSession, Continuation) + 'static) -> Self {
        self.push(step);
        self
    }

    pub fn push(&mut self, step: impl FnOnce(&mut BattleSession, Continuation) + 'static) {
        self.steps.push_back(Box::new(step));
    }

    /// A line of battle text; continues once it has been read.
    pub fn dialog(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.then(move |session, done| session.say(text, done))
    }

    /// Text computed when the step runs, not when the sequence is built.
    /// `None` skips the step.
    pub fn dialog_with(self, text: impl FnOnce(&BattleSession) -> Option<String> + 'static) -> Self {
        self.then(move |session, done| match text(session) {
            Some(text) => session.say(text, done),
            None => done.resume(()),
        })
    }

    pub fn effect(self, effect: Effect) -> Self {
        self.then(move |session, done| session.services.effects.play(effect, done))
    }

    /// Run a plain state change between presentation steps.
    pub fn action(self, action: impl FnOnce(&mut BattleSession) + 'static) -> Self {
        self.then(move |session, done| {
            action(session);
            done.resume(());
        })
    }

    pub fn append(mut self, mut other: Sequence) -> Self {
        self.steps.append(&mut other.steps);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Start the first step. `done` resumes after the last one finishes.
    pub fn run(mut self, session: &mut BattleSession, done: Continuation) {
        match self.steps.pop_front() {
            None => done.resume(()),
            Some(step) => {
                let label = format!("{}[{} left]", self.label, self.steps.len());
                let rest = session.continuation(label, move |session, ()| self.run(session, done));
                step(session, rest);
            }
        }
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("label", &self.label)
            .field("steps", &self.steps.len())
            .finish()
    }
}
