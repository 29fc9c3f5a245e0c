//! Consent gate for destructive actions.
//!
//! `confirm()` suspends the caller until whoever renders the dialog answers
//! the current prompt cycle. Each cycle has its own one-shot resolver, so an
//! answer can only ever resolve the prompt it was given for.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Neutral,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub description: String,
    pub tone: Tone,
}

impl ConfirmPrompt {
    pub fn new(title: impl Into<String>, description: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tone,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, Tone::Destructive)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Idle,
    Prompting { cycle: u64, prompt: ConfirmPrompt },
}

struct GateInner {
    prompt: ConfirmPrompt,
    state: watch::Sender<GateState>,
    pending: Mutex<Option<(u64, oneshot::Sender<bool>)>>,
    cycles: AtomicU64,
}

/// One gate per guarded action. Clones share the same dialog.
#[derive(Clone)]
pub struct ConfirmGate {
    inner: Arc<GateInner>,
}

impl std::fmt::Debug for ConfirmGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmGate")
            .field("prompt", &self.inner.prompt)
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

impl ConfirmGate {
    pub fn new(prompt: ConfirmPrompt) -> Self {
        let (state, _) = watch::channel(GateState::Idle);
        Self {
            inner: Arc::new(GateInner {
                prompt,
                state,
                pending: Mutex::new(None),
                cycles: AtomicU64::new(0),
            }),
        }
    }

    pub fn prompt(&self) -> &ConfirmPrompt {
        &self.inner.prompt
    }

    pub fn state(&self) -> GateState {
        self.inner.state.borrow().clone()
    }

    /// The dialog side watches this to know when to show itself.
    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.inner.state.subscribe()
    }

    /// Wait until the gate is prompting and return that cycle.
    pub async fn prompted(&self) -> u64 {
        let mut rx = self.subscribe();
        loop {
            let current = match &*rx.borrow_and_update() {
                GateState::Prompting { cycle, .. } => Some(*cycle),
                GateState::Idle => None,
            };
            if let Some(cycle) = current {
                return cycle;
            }
            // The sender lives as long as `self`, so this cannot fail.
            let _ = rx.changed().await;
        }
    }

    /// Show the prompt and wait for an answer. A prompt that is superseded
    /// by a newer `confirm()` resolves `false`.
    pub async fn confirm(&self) -> bool {
        let cycle = self.inner.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = oneshot::channel();

        let previous = self.inner.pending.lock().replace((cycle, tx));
        if let Some((previous_cycle, resolver)) = previous {
            tracing::debug!(cycle = previous_cycle, "confirmation superseded");
            let _ = resolver.send(false);
        }

        self.inner.state.send_replace(GateState::Prompting {
            cycle,
            prompt: self.inner.prompt.clone(),
        });

        let _guard = CycleGuard {
            inner: &self.inner,
            cycle,
        };
        rx.await.unwrap_or(false)
    }

    /// Answer a specific prompt cycle. Returns `false` if that cycle is no
    /// longer waiting.
    pub fn respond(&self, cycle: u64, confirmed: bool) -> bool {
        let resolver = {
            let mut pending = self.inner.pending.lock();
            match pending.as_ref() {
                Some((current, _)) if *current == cycle => pending.take(),
                _ => None,
            }
        };

        match resolver {
            Some((_, tx)) => {
                self.inner.back_to_idle(cycle);
                tx.send(confirmed).is_ok()
            }
            None => false,
        }
    }

    pub fn accept(&self) -> bool {
        self.current_cycle()
            .is_some_and(|cycle| self.respond(cycle, true))
    }

    pub fn cancel(&self) -> bool {
        self.current_cycle()
            .is_some_and(|cycle| self.respond(cycle, false))
    }

    fn current_cycle(&self) -> Option<u64> {
        self.inner.pending.lock().as_ref().map(|(cycle, _)| *cycle)
    }
}

impl GateInner {
    fn back_to_idle(&self, cycle: u64) {
        self.state.send_if_modified(|state| match state {
            GateState::Prompting { cycle: shown, .. } if *shown == cycle => {
                *state = GateState::Idle;
                true
            }
            _ => false,
        });
    }
}

/// Clears the cycle if the waiting caller goes away without an answer.
struct CycleGuard<'a> {
    inner: &'a GateInner,
    cycle: u64,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let mut pending = self.inner.pending.lock();
        if matches!(pending.as_ref(), Some((current, _)) if *current == self.cycle) {
            pending.take();
        }
        drop(pending);
        self.inner.back_to_idle(self.cycle);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn gate(title: &str) -> ConfirmGate {
        ConfirmGate::new(ConfirmPrompt::destructive(title, "This action cannot be undone."))
    }

    #[tokio::test]
    async fn accept_resolves_true_and_returns_to_idle() {
        let gate = gate("Delete workspace");

        let (confirmed, accepted) = tokio::join!(gate.confirm(), async { gate.accept() });

        assert!(confirmed);
        assert!(accepted);
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[tokio::test]
    async fn cancel_resolves_false() {
        let gate = gate("Delete project");

        let (confirmed, _) = tokio::join!(gate.confirm(), async { gate.cancel() });

        assert!(!confirmed);
        assert_eq!(gate.state(), GateState::Idle);
    }

    #[tokio::test]
    async fn prompting_state_carries_cycle_and_prompt() {
        let gate = gate("Reset invite link");
        let mut rx = gate.subscribe();

        let (confirmed, _) = tokio::join!(gate.confirm(), async {
            rx.changed().await.unwrap();
            let state = rx.borrow_and_update().clone();
            match state {
                GateState::Prompting { cycle, prompt } => {
                    assert_eq!(cycle, 1);
                    assert_eq!(prompt.tone, Tone::Destructive);
                    assert_eq!(prompt.title, "Reset invite link");
                    gate.respond(cycle, true)
                }
                GateState::Idle => panic!("gate should be prompting"),
            }
        });

        assert!(confirmed);
    }

    #[tokio::test]
    async fn two_gates_never_cross_resolve() {
        let delete = gate("Delete workspace");
        let reset = gate("Reset invite link");

        let (deleted, reset_answered) = tokio::join!(delete.confirm(), async {
            // Nothing is waiting on the reset gate, so this must not reach the delete prompt.
            let reset_answered = reset.accept();
            delete.cancel();
            reset_answered
        });

        assert!(!reset_answered);
        assert!(!deleted);
        assert_eq!(reset.state(), GateState::Idle);
    }

    #[tokio::test]
    async fn stale_cycle_answers_are_ignored() {
        let gate = gate("Remove member");

        let (first, second) = tokio::join!(gate.confirm(), async {
            let second = gate.confirm();
            tokio::pin!(second);
            assert!(futures::poll!(second.as_mut()).is_pending());
            // Cycle 1 was superseded by cycle 2.
            assert!(!gate.respond(1, true));
            assert!(gate.respond(2, true));
            second.await
        });

        assert!(!first);
        assert!(second);
    }

    #[tokio::test]
    async fn dropped_caller_clears_the_prompt() {
        let gate = gate("Delete task");
        {
            let pending = gate.confirm();
            tokio::pin!(pending);
            assert!(futures::poll!(pending.as_mut()).is_pending());
            assert!(matches!(gate.state(), GateState::Prompting { .. }));
        }

        assert_eq!(gate.state(), GateState::Idle);
        assert!(!gate.accept());
    }
}
