use super::EventService;
use crate::database::{EventRecord, MaterialStore, MenuNode};
use crate::platform::{MenuKind, MenuPayload, PayloadButton, RawButton, RawSelfMenu};
use crate::utils::error::SyncError;
use std::sync::Arc;
use tracing::debug;

/// Result of a remote → local translation: the local tree plus the event
/// records created while resolving it.
#[derive(Debug)]
pub struct TranslatedMenu {
    pub buttons: Vec<MenuNode>,
    pub events: Vec<EventRecord>,
}

/// Per-button resolution outcome before compaction; `None` marks a button
/// the compaction pass removes. Keeping this separate from the output tree
/// keeps resolvers free of sibling-order bookkeeping.
enum ResolvedButton {
    Leaf(Option<MenuNode>),
    Group {
        name: String,
        children: Vec<Option<MenuNode>>,
    },
}

pub struct MenuTranslator {
    events: Arc<EventService>,
    materials: Arc<dyn MaterialStore>,
}

impl MenuTranslator {
    pub fn new(events: Arc<EventService>, materials: Arc<dyn MaterialStore>) -> Self {
        Self { events, materials }
    }

    /// Translate the platform's current self-menu into local menu nodes,
    /// creating event records as per-kind rules require. Nesting deeper than
    /// one level aborts the whole translation.
    pub async fn remote_to_local(
        &self,
        account_id: i64,
        raw: &RawSelfMenu,
    ) -> Result<TranslatedMenu, SyncError> {
        let mut created = Vec::new();
        let mut resolved = Vec::with_capacity(raw.selfmenu_info.button.len());

        for button in &raw.selfmenu_info.button {
            if let Some(sub) = &button.sub_button {
                let mut children = Vec::with_capacity(sub.list.len());
                for child in &sub.list {
                    if child.sub_button.is_some() {
                        return Err(SyncError::UnsupportedTreeShape);
                    }
                    children.push(self.resolve_leaf(account_id, child, &mut created).await?);
                }

                resolved.push(ResolvedButton::Group {
                    name: button.name.clone().unwrap_or_default(),
                    children,
                });
            } else {
                resolved.push(ResolvedButton::Leaf(
                    self.resolve_leaf(account_id, button, &mut created).await?,
                ));
            }
        }

        Ok(TranslatedMenu {
            buttons: compact(resolved),
            events: created,
        })
    }

    /// Resolve a single leaf button. Returns `None` for buttons the local
    /// model does not retain; the caller compacts those out afterwards.
    async fn resolve_leaf(
        &self,
        account_id: i64,
        button: &RawButton,
        created: &mut Vec<EventRecord>,
    ) -> Result<Option<MenuNode>, SyncError> {
        let kind_str = button.kind.as_deref().ok_or_else(|| {
            SyncError::MalformedButton(format!(
                "button {:?} has no type",
                button.name.as_deref().unwrap_or("")
            ))
        })?;
        let kind = MenuKind::parse(kind_str)?;
        let name = button.name.clone().unwrap_or_default();

        let node = match kind {
            MenuKind::Text => {
                let value = button.value.as_deref().ok_or_else(|| {
                    SyncError::MalformedButton(format!("text button {name:?} has no value"))
                })?;

                let record = self.events.create_text_event(account_id, value).await?;
                let key = record.key.clone();
                created.push(record);

                Some(MenuNode::Button {
                    name,
                    kind: MenuKind::Click,
                    key,
                })
            }

            // Reserved: permanent-media and article-link buttons are not
            // localized yet
            MenuKind::Media | MenuKind::ViewLimited => None,

            MenuKind::News => {
                let info = button.news_info.as_ref().ok_or_else(|| {
                    SyncError::MalformedButton(format!("news button {name:?} has no news_info"))
                })?;

                let material_id = self.materials.save_article(account_id, &info.list).await?;
                let record = self.events.create_media_event(account_id, material_id).await?;
                let key = record.key.clone();
                created.push(record);

                // The inline article payload lives in the material store now;
                // it is not carried onto the node
                Some(MenuNode::Button {
                    name,
                    kind: MenuKind::Click,
                    key,
                })
            }

            MenuKind::View => {
                let url = button
                    .url
                    .as_deref()
                    .or(button.value.as_deref())
                    .ok_or_else(|| {
                        SyncError::MalformedButton(format!("view button {name:?} has no url"))
                    })?;

                Some(MenuNode::Button {
                    name,
                    kind: MenuKind::View,
                    key: url.to_string(),
                })
            }

            MenuKind::Click => {
                let key = button.key.clone().unwrap_or_default();
                if self.events.is_owned(&key) {
                    Some(MenuNode::Button {
                        name,
                        kind: MenuKind::Click,
                        key,
                    })
                } else {
                    debug!("Dropping foreign click button {:?} ({})", name, key);
                    None
                }
            }

            // Ephemeral remote media, not retained locally
            MenuKind::Image | MenuKind::Voice | MenuKind::Video => None,

            MenuKind::LocationSelect
            | MenuKind::ScancodePush
            | MenuKind::ScancodeWaitMessage
            | MenuKind::PicSysPhoto
            | MenuKind::PicWeixin
            | MenuKind::PicPhotoOrAlbum => Some(MenuNode::Button {
                name,
                kind,
                key: button.key.clone().unwrap_or_default(),
            }),
        };

        Ok(node)
    }
}

/// Compaction pass: remove dropped buttons from the top level and from every
/// group's children.
fn compact(resolved: Vec<ResolvedButton>) -> Vec<MenuNode> {
    resolved
        .into_iter()
        .filter_map(|button| match button {
            ResolvedButton::Leaf(node) => node,
            ResolvedButton::Group { name, children } => Some(MenuNode::Group {
                name,
                children: children.into_iter().flatten().collect(),
            }),
        })
        .collect()
}

/// Local → remote translation: a pure shape conversion. By push time every
/// key is already a platform-legal value, so no content resolution happens;
/// link buttons are addressed by `url`, everything else by `key`.
pub fn local_to_remote(tree: &[MenuNode]) -> Result<MenuPayload, SyncError> {
    let mut buttons = Vec::with_capacity(tree.len());

    for node in tree {
        buttons.push(match node {
            MenuNode::Button { name, kind, key } => leaf_payload(name, *kind, key),
            MenuNode::Group { name, children } => {
                let mut sub_button = Vec::with_capacity(children.len());
                for child in children {
                    let MenuNode::Button { name, kind, key } = child else {
                        return Err(SyncError::UnsupportedTreeShape);
                    };
                    sub_button.push(leaf_payload(name, *kind, key));
                }

                PayloadButton {
                    name: name.clone(),
                    sub_button,
                    ..Default::default()
                }
            }
        });
    }

    Ok(MenuPayload { button: buttons })
}

fn leaf_payload(name: &str, kind: MenuKind, key: &str) -> PayloadButton {
    let mut button = PayloadButton {
        name: name.to_string(),
        kind: Some(kind.as_str()),
        ..Default::default()
    };

    if kind == MenuKind::View {
        button.url = Some(key.to_string());
    } else {
        button.key = Some(key.to_string());
    }

    button
}
