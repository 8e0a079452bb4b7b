//! In-memory message log shared by the communication endpoints.

use std::collections::VecDeque;

use chrono::{DateTime, TimeZone, Utc};
use data_loader::{Message, Role};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Messages returned by the communication page
pub const RECENT_LIMIT: usize = 5;

/// Messages kept in memory; the oldest is dropped beyond this
pub const DEFAULT_CAPACITY: usize = 1000;

/// Body of `POST /api/messages`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub from: Role,
    pub to: Role,
    #[serde(default)]
    pub bus_number: Option<String>,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Bounded log of conductor/coordinator messages
#[derive(Debug)]
pub struct MessageLog {
    messages: RwLock<VecDeque<Message>>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty log holding at most `capacity` messages (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Log holding the two field reports the dashboard starts with
    pub fn seeded() -> Self {
        let at = |h, m| {
            Utc.with_ymd_and_hms(2025, 12, 2, h, m, 0)
                .single()
                .unwrap_or_default()
        };

        let seed = VecDeque::from([
            Message {
                id: "1".to_string(),
                from: Role::Conductor,
                to: Role::Coordinator,
                bus_number: Some("KA-01-F-4532".to_string()),
                message: "Route 335E experiencing heavy traffic at Silk Board Junction".to_string(),
                timestamp: at(10, 0),
                read: false,
            },
            Message {
                id: "3".to_string(),
                from: Role::Conductor,
                to: Role::Coordinator,
                bus_number: Some("KA-01-F-8934".to_string()),
                message: "Bus breakdown on Route G4 near Electronic City".to_string(),
                timestamp: at(9, 30),
                read: false,
            },
        ]);

        Self {
            messages: RwLock::new(seed),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Store a message and return its new id, evicting the oldest when full
    pub async fn append(&self, new: NewMessage) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let message = Message {
            id: id.clone(),
            from: new.from,
            to: new.to,
            bus_number: new.bus_number,
            message: new.message,
            timestamp: new.timestamp.unwrap_or_else(Utc::now),
            read: false,
        };

        debug!("Message {} from {} to {}", id, message.from.as_str(), message.to.as_str());
        let mut messages = self.messages.write().await;
        while messages.len() >= self.capacity {
            messages.pop_front();
        }
        messages.push_back(message);
        id
    }

    /// Up to `limit` messages, newest first
    pub async fn recent(&self, limit: usize) -> Vec<Message> {
        let mut messages: Vec<Message> = self.messages.read().await.iter().cloned().collect();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        messages.truncate(limit);
        messages
    }

    /// Unread messages addressed to `role`
    pub async fn pending_for(&self, role: Role) -> u32 {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| m.to == role && !m.read)
            .count() as u32
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}
