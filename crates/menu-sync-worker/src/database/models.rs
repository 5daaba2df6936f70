use crate::platform::{Credentials, MenuKind};
use sqlx::FromRow;

/// A messaging-platform account whose menu this worker manages.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub app_id: String,
    pub app_secret: String,
}

impl Account {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            app_id: self.app_id.clone(),
            app_secret: self.app_secret.clone(),
        }
    }
}

/// One node of the local menu tree. A node is either a top-level group
/// holding leaf buttons, or a leaf button with a resolved `(kind, key)` pair;
/// the tree is at most two levels deep.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuNode {
    Group {
        name: String,
        children: Vec<MenuNode>,
    },
    Button {
        name: String,
        kind: MenuKind,
        key: String,
    },
}

impl MenuNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Group { name, .. } | Self::Button { name, .. } => name,
        }
    }
}

/// Content bound to an application-owned event key.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Text(String),
    Material(i64),
}

/// Binds an opaque, namespace-prefixed event key to application content.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub key: String,
    pub account_id: i64,
    pub payload: EventPayload,
}

/// Persisted menu row; `parent_id` is NULL for top-level rows and `kind` is
/// NULL for group rows.
#[derive(Debug, Clone, FromRow)]
pub struct MenuRow {
    pub id: i64,
    pub account_id: i64,
    pub parent_id: Option<i64>,
    pub position: i32,
    pub name: String,
    pub kind: Option<String>,
    pub menu_key: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub event_key: String,
    pub account_id: i64,
    pub kind: String,
    pub content: Option<String>,
    pub material_id: Option<i64>,
}
