use std::cell::RefCell;
use std::fmt;

use crate::value::Value;

/// The outcome of a settled promise.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    Fulfilled(Value),
    Rejected(Value),
}

type Reaction = Box<dyn FnOnce(&Settlement)>;

enum PromiseState {
    Pending(Vec<Reaction>),
    Settled(Settlement),
}

/// A single-threaded deferred value.
///
/// Reactions registered while pending run synchronously, in registration
/// order, at the moment the promise settles. A promise settles at most once.
pub struct Promise {
    state: RefCell<PromiseState>,
}

impl Promise {
    pub fn pending() -> Self {
        Promise {
            state: RefCell::new(PromiseState::Pending(Vec::new())),
        }
    }

    pub fn fulfilled(value: Value) -> Self {
        Promise {
            state: RefCell::new(PromiseState::Settled(Settlement::Fulfilled(value))),
        }
    }

    pub fn rejected(reason: Value) -> Self {
        Promise {
            state: RefCell::new(PromiseState::Settled(Settlement::Rejected(reason))),
        }
    }

    pub fn resolve(&self, value: Value) -> bool {
        self.settle(Settlement::Fulfilled(value))
    }

    pub fn reject(&self, reason: Value) -> bool {
        self.settle(Settlement::Rejected(reason))
    }

    /// Settle the promise and run its reactions. Returns `false` if it had
    /// already settled.
    pub fn settle(&self, settlement: Settlement) -> bool {
        let reactions = {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                PromiseState::Pending(reactions) => {
                    let reactions = std::mem::take(reactions);
                    *state = PromiseState::Settled(settlement.clone());
                    reactions
                }
                PromiseState::Settled(_) => return false,
            }
        };
        for reaction in reactions {
            reaction(&settlement);
        }
        true
    }

    /// Run `reaction` once the promise settles, or right away if it already has.
    pub fn on_settled(&self, reaction: impl FnOnce(&Settlement) + 'static) {
        let settled = {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                PromiseState::Pending(reactions) => {
                    reactions.push(Box::new(reaction));
                    return;
                }
                PromiseState::Settled(settlement) => settlement.clone(),
            }
        };
        reaction(&settled);
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), PromiseState::Pending(_))
    }

    pub fn settlement(&self) -> Option<Settlement> {
        match &*self.state.borrow() {
            PromiseState::Pending(_) => None,
            PromiseState::Settled(settlement) => Some(settlement.clone()),
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state.borrow() {
            PromiseState::Pending(reactions) => {
                write!(f, "<promise pending, {} reactions>", reactions.len())
            }
            PromiseState::Settled(Settlement::Fulfilled(v)) => {
                write!(f, "<promise fulfilled {v}>")
            }
            PromiseState::Settled(Settlement::Rejected(v)) => {
                write!(f, "<promise rejected {v}>")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_reactions_run_on_settle_in_order() {
        let promise = Promise::pending();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = Rc::clone(&log);
            promise.on_settled(move |s| log.borrow_mut().push((i, s.clone())));
        }
        assert!(log.borrow().is_empty());
        assert!(promise.resolve(Value::number(5.0)));
        let log = log.borrow();
        assert_eq!(log.len(), 3);
        assert_eq!(log[2], (2, Settlement::Fulfilled(Value::number(5.0))));
    }

    #[test]
    fn test_settles_once() {
        let promise = Promise::pending();
        assert!(promise.reject(Value::string("boom")));
        assert!(!promise.resolve(Value::Null));
        assert_eq!(
            promise.settlement(),
            Some(Settlement::Rejected(Value::string("boom")))
        );
    }

    #[test]
    fn test_reaction_on_settled_promise_runs_immediately() {
        let promise = Promise::fulfilled(Value::Bool(true));
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        promise.on_settled(move |s| *sink.borrow_mut() = Some(s.clone()));
        assert_eq!(
            *seen.borrow(),
            Some(Settlement::Fulfilled(Value::Bool(true)))
        );
    }
}
