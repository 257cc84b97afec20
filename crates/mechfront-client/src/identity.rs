//! Identity collaborator.
//!
//! The identity service answers "who is signed in" and pushes sign-in and
//! sign-out notifications. Subscribers get a channel receiver; the
//! [`Session`](crate::session::Session) drains it on every tick.

use std::sync::mpsc::{self, Receiver, Sender};

use mechfront_logic::common::UserId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut,
}

pub trait IdentityProvider {
    fn current_user(&self) -> Option<User>;

    /// Subscribe to auth-state changes from now on.
    fn watch(&mut self) -> Receiver<AuthEvent>;
}

/// Identity provider driven directly by tests and the harness.
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    user: Option<User>,
    watchers: Vec<Sender<AuthEvent>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(id: impl Into<String>) -> Self {
        Self {
            user: Some(User {
                id: UserId::new(id),
            }),
            watchers: Vec::new(),
        }
    }

    pub fn sign_in(&mut self, id: impl Into<String>) {
        let user = User {
            id: UserId::new(id),
        };
        log::info!("identity: {} signed in", user.id);
        self.user = Some(user.clone());
        self.broadcast(AuthEvent::SignedIn(user));
    }

    pub fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            log::info!("identity: {} signed out", user.id);
        }
        self.broadcast(AuthEvent::SignedOut);
    }

    fn broadcast(&mut self, event: AuthEvent) {
        // Dropped receivers are pruned.
        self.watchers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl IdentityProvider for MemoryIdentity {
    fn current_user(&self) -> Option<User> {
        self.user.clone()
    }

    fn watch(&mut self) -> Receiver<AuthEvent> {
        let (tx, rx) = mpsc::channel();
        self.watchers.push(tx);
        rx
    }
}
