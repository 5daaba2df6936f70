use serde::{Deserialize, Serialize};

use crate::utils::error::SyncError;

/// Button type taxonomy of the platform menu API.
///
/// `Text`, `Media`, `News`, `Image`, `Voice` and `Video` only ever appear on
/// the wire: translation either converts them to `Click` or drops them, so a
/// persisted local tree never contains them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Click,
    View,
    ViewLimited,
    Text,
    Media,
    News,
    Image,
    Voice,
    Video,
    LocationSelect,
    ScancodePush,
    ScancodeWaitMessage,
    PicSysPhoto,
    PicWeixin,
    PicPhotoOrAlbum,
}

impl MenuKind {
    /// Parse a wire type string. Unknown strings are a hard error, never a
    /// silent default.
    pub fn parse(s: &str) -> Result<Self, SyncError> {
        let kind = match s {
            "click" => Self::Click,
            "view" => Self::View,
            "view_limited" => Self::ViewLimited,
            "text" => Self::Text,
            // The self-menu endpoint reports permanent media as "media_id"
            "media" | "media_id" => Self::Media,
            "news" => Self::News,
            "img" | "image" => Self::Image,
            "voice" => Self::Voice,
            "video" => Self::Video,
            "location_select" => Self::LocationSelect,
            "scancode_push" => Self::ScancodePush,
            "scancode_waitmsg" => Self::ScancodeWaitMessage,
            "pic_sysphoto" => Self::PicSysPhoto,
            "pic_weixin" => Self::PicWeixin,
            "pic_photo_or_album" => Self::PicPhotoOrAlbum,
            other => return Err(SyncError::UnknownMenuKind(other.to_string())),
        };

        Ok(kind)
    }

    /// Canonical wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::View => "view",
            Self::ViewLimited => "view_limited",
            Self::Text => "text",
            Self::Media => "media_id",
            Self::News => "news",
            Self::Image => "img",
            Self::Voice => "voice",
            Self::Video => "video",
            Self::LocationSelect => "location_select",
            Self::ScancodePush => "scancode_push",
            Self::ScancodeWaitMessage => "scancode_waitmsg",
            Self::PicSysPhoto => "pic_sysphoto",
            Self::PicWeixin => "pic_weixin",
            Self::PicPhotoOrAlbum => "pic_photo_or_album",
        }
    }
}

/// Per-account API credentials consumed by the platform client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub app_secret: String,
}

// ==================== Pull side (current self-menu) ====================

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSelfMenu {
    #[serde(default)]
    pub is_menu_open: Option<i32>,
    #[serde(default)]
    pub selfmenu_info: RawSelfMenuInfo,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSelfMenuInfo {
    #[serde(default)]
    pub button: Vec<RawButton>,
}

/// One button as the platform reports it. Which of the optional fields are
/// populated depends on `type`; the translator validates per kind.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawButton {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub sub_button: Option<RawSubButtonList>,
    #[serde(default)]
    pub news_info: Option<RawNewsInfo>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSubButtonList {
    #[serde(default)]
    pub list: Vec<RawButton>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawNewsInfo {
    #[serde(default)]
    pub list: Vec<RawArticle>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub show_cover_pic: Option<i32>,
}

// ==================== Push side (menu/create payload) ====================

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MenuPayload {
    pub button: Vec<PayloadButton>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct PayloadButton {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_button: Vec<PayloadButton>,
}
