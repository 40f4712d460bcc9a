use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical resource a mutation applies to, e.g. `"meals"`.
pub type Target = String;
/// Key of an existing remote record.
pub type RecordId = String;

/// What a queued mutation does to its target.
///
/// The three row operations serialize as `INSERT`, `UPDATE` and `DELETE`.
/// Any other tag is kept verbatim as a domain action (`upsertFood`,
/// `saveMeal`, ...), so queues written by newer clients still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MutationKind {
    Insert,
    Update,
    Delete,
    Action(String),
}

impl MutationKind {
    pub fn as_str(&self) -> &str {
        match self {
            MutationKind::Insert => "INSERT",
            MutationKind::Update => "UPDATE",
            MutationKind::Delete => "DELETE",
            MutationKind::Action(tag) => tag,
        }
    }
}

impl From<String> for MutationKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "INSERT" => MutationKind::Insert,
            "UPDATE" => MutationKind::Update,
            "DELETE" => MutationKind::Delete,
            _ => MutationKind::Action(s),
        }
    }
}

impl From<&str> for MutationKind {
    fn from(s: &str) -> Self {
        MutationKind::from(s.to_string())
    }
}

impl From<MutationKind> for String {
    fn from(kind: MutationKind) -> Self {
        match kind {
            MutationKind::Action(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One deferred write, as stored in the offline queue.
///
/// The queue treats `target` and `payload` as opaque. Field names on the wire
/// are `type`, `table`, `id` and `data`; `payload` is accepted as an alias for
/// `data` because action entries were historically written that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedMutation {
    #[serde(rename = "type")]
    pub kind: MutationKind,

    #[serde(rename = "table", default)]
    pub target: Target,

    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<RecordId>,

    #[serde(
        rename = "data",
        alias = "payload",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub payload: Option<serde_json::Value>,

    #[serde(default)]
    pub enqueued_at_ms: u64,
}

impl QueuedMutation {
    pub fn new(
        kind: MutationKind,
        target: impl Into<Target>,
        identifier: Option<RecordId>,
        payload: Option<serde_json::Value>,
    ) -> Self {
        QueuedMutation {
            kind,
            target: target.into(),
            identifier,
            payload,
            enqueued_at_ms: now_ms(),
        }
    }

    pub fn insert(target: impl Into<Target>, payload: serde_json::Value) -> Self {
        Self::new(MutationKind::Insert, target, None, Some(payload))
    }

    pub fn update(
        target: impl Into<Target>,
        identifier: impl Into<RecordId>,
        payload: serde_json::Value,
    ) -> Self {
        Self::new(
            MutationKind::Update,
            target,
            Some(identifier.into()),
            Some(payload),
        )
    }

    pub fn delete(target: impl Into<Target>, identifier: impl Into<RecordId>) -> Self {
        Self::new(MutationKind::Delete, target, Some(identifier.into()), None)
    }

    pub fn action(
        tag: impl Into<String>,
        target: impl Into<Target>,
        payload: serde_json::Value,
    ) -> Self {
        Self::new(
            MutationKind::Action(tag.into()),
            target,
            None,
            Some(payload),
        )
    }
}

impl fmt::Display for QueuedMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identifier {
            Some(id) => write!(f, "{} {}/{}", self.kind, self.target, id),
            None => write!(f, "{} {}", self.kind, self.target),
        }
    }
}

pub(crate) fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
