//! Notification events and the `Notifier` collaborator.
//!
//! The engine hands one [`ReviewEvent`] per committed transition to its
//! notifier. Delivery is fire-and-forget: the engine never waits for it and a
//! failure is logged, never surfaced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
  CycleActivated,
  CycleClosed,
  AssessmentStarted,
  SelfAssessmentSubmitted,
  ManagerReviewSubmitted,
  ReviewAcknowledged,
  AdminOverride,
}

/// The entity an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum EventSubject {
  Cycle(Uuid),
  Assessment(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEvent {
  pub event_id:    Uuid,
  pub kind:        EventKind,
  pub subject:     EventSubject,
  pub actor_id:    Uuid,
  pub occurred_at: DateTime<Utc>,
}

impl ReviewEvent {
  pub fn new(kind: EventKind, subject: EventSubject, actor_id: Uuid) -> Self {
    Self {
      event_id: Uuid::new_v4(),
      kind,
      subject,
      actor_id,
      occurred_at: Utc::now(),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Receives events after the underlying transition has committed.
///
/// Implementations must not block: hand the event off (to a queue, a task)
/// and return.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn notify(&self, event: ReviewEvent) -> Result<(), Self::Error>;
}

// ─── Implementations ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("notification channel closed")]
pub struct ChannelClosed;

/// Queues events on an unbounded tokio channel for a separate delivery task.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  tx: mpsc::UnboundedSender<ReviewEvent>,
}

impl ChannelNotifier {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<ReviewEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }
}

impl Notifier for ChannelNotifier {
  type Error = ChannelClosed;

  fn notify(&self, event: ReviewEvent) -> Result<(), ChannelClosed> {
    self.tx.send(event).map_err(|_| ChannelClosed)
  }
}

/// Logs every event and delivers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  type Error = std::convert::Infallible;

  fn notify(&self, event: ReviewEvent) -> Result<(), Self::Error> {
    tracing::info!(
      event_id = %event.event_id,
      kind = %event.kind,
      actor_id = %event.actor_id,
      subject = ?event.subject,
      "review event"
    );
    Ok(())
  }
}
