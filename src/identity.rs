//! Identity provider boundary
//!
//! The assistant only needs to know who is signed in and to hear about
//! sign-in changes. Real deployments plug an external provider in behind
//! [`IdentityProvider`]; the terminal front end uses the in-memory
//! [`LocalIdentityProvider`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{Result, ShipsmartError};

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
    pub signed_in_at: DateTime<Utc>,
}

/// Sign-in state change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut,
}

/// Source of the current user
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in as `display_name`
    async fn sign_in(&self, display_name: &str) -> Result<User>;

    /// Sign out; signing out while signed out is a no-op
    async fn sign_out(&self) -> Result<()>;

    fn current_user(&self) -> Option<User>;

    /// Receive future sign-in changes
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }
}

/// In-process identity provider
#[derive(Debug)]
pub struct LocalIdentityProvider {
    current: RwLock<Option<User>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            current: RwLock::new(None),
            events,
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, display_name: &str) -> Result<User> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ShipsmartError::Session("display name cannot be empty".to_string()).into());
        }

        let user = User {
            id: Uuid::new_v4(),
            display_name: display_name.to_string(),
            signed_in_at: Utc::now(),
        };
        {
            let mut current = self.current.write().map_err(|_| {
                ShipsmartError::Session("identity state lock poisoned".to_string())
            })?;
            *current = Some(user.clone());
        }

        tracing::info!("Signed in as {}", user.display_name);
        let _ = self.events.send(AuthEvent::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        let previous = self
            .current
            .write()
            .map_err(|_| ShipsmartError::Session("identity state lock poisoned".to_string()))?
            .take();

        if let Some(user) = previous {
            tracing::info!("Signed out {}", user.display_name);
            let _ = self.events.send(AuthEvent::SignedOut);
        }
        Ok(())
    }

    fn current_user(&self) -> Option<User> {
        self.current.read().ok().and_then(|user| user.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
