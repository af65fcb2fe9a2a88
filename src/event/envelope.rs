//! Notification envelopes carrying source-control webhooks.
//!
//! The envelope is a record list in the SNS delivery shape. The first record's
//! `Sns.Message` holds the webhook payload as a JSON string, and its
//! `X-Github-Event` message attribute names the event type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{EventError, Result};

/// Message attribute naming the webhook event type.
pub const EVENT_TYPE_ATTRIBUTE: &str = "X-Github-Event";

/// The only event type that triggers work.
pub const PUSH_EVENT: &str = "push";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Record {
    sns: SnsMessage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SnsMessage {
    message: String,
    #[serde(default)]
    message_attributes: HashMap<String, MessageAttribute>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MessageAttribute {
    value: String,
}

/// A decoded inbound envelope.
#[derive(Debug, Clone)]
pub struct Envelope {
    event_type: Option<String>,
    message: String,
}

/// Decode an envelope. Only the first record is considered.
pub fn parse_envelope(json: &str) -> Result<Envelope> {
    #[derive(Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Wire {
        records: Vec<Record>,
    }

    let wire: Wire = serde_json::from_str(json).map_err(EventError::Envelope)?;
    let record = wire.records.into_iter().next().ok_or(EventError::NoRecords)?;
    let event_type = record
        .sns
        .message_attributes
        .get(EVENT_TYPE_ATTRIBUTE)
        .map(|attr| attr.value.clone());

    Ok(Envelope {
        event_type,
        message: record.sns.message,
    })
}

impl Envelope {
    /// The `X-Github-Event` attribute, if present.
    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    pub fn is_push(&self) -> bool {
        self.event_type() == Some(PUSH_EVENT)
    }

    /// The push described by this envelope, or `None` for any other event.
    pub fn push_event(&self) -> Result<Option<PushEvent>> {
        if !self.is_push() {
            return Ok(None);
        }
        PushEvent::from_payload(&self.message).map(Some)
    }
}

#[derive(Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    repository: RepositoryPayload,
    head_commit: Option<HeadCommitPayload>,
}

#[derive(Deserialize)]
struct RepositoryPayload {
    name: String,
    owner: OwnerPayload,
}

#[derive(Deserialize)]
struct OwnerPayload {
    login: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct HeadCommitPayload {
    id: String,
}

/// The parts of a push that drive a mirror run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushEvent {
    pub repository: String,
    pub owner: String,
    /// Sha of the pushed head commit.
    pub head_commit: String,
    pub git_ref: String,
}

impl PushEvent {
    pub fn new(
        owner: impl Into<String>,
        repository: impl Into<String>,
        head_commit: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            owner: owner.into(),
            head_commit: head_commit.into(),
            git_ref: git_ref.into(),
        }
    }

    /// Decode a push webhook payload.
    pub fn from_payload(json: &str) -> Result<Self> {
        let payload: PushPayload = serde_json::from_str(json).map_err(EventError::Payload)?;
        let repository = payload.repository.name;

        let owner = payload
            .repository
            .owner
            .login
            .or(payload.repository.owner.name)
            .ok_or_else(|| EventError::MissingOwner {
                repository: repository.clone(),
            })?;

        let head_commit = payload
            .head_commit
            .ok_or_else(|| EventError::NoHeadCommit {
                git_ref: payload.git_ref.clone(),
            })?
            .id;

        Ok(Self {
            repository,
            owner,
            head_commit,
            git_ref: payload.git_ref,
        })
    }
}
