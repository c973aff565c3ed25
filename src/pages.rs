//! Scrapbook pages and the elements placed on them
//!
//! Every element belongs to exactly one page and carries its own transform. There is no z-index,
//! elements are layered in creation order.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::scrapbooks::Details;

/// A page of a scrapbook
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Uuid,
    pub scrapbook_id: Uuid,

    /// Position within the scrapbook, contiguous from 0
    pub page_index: i32,

    #[sqlx(flatten)]
    pub details: Details,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Spatial transform of a photo, sticker or text
#[derive(Clone, Copy, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

/// Kind of media on a page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "media_kind_type", rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Photo,
}

/// A photo placed on a page
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PageMedia {
    pub id: Uuid,
    pub page_id: Uuid,
    pub kind: MediaKind,
    pub blob_key: String,
    pub url: String,
    pub width: i32,
    pub height: i32,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub transform: Transform,
    pub created_by_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Available sticker icons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "sticker_kind_type", rename_all = "lowercase")]
pub enum StickerKind {
    Heart,
    Star,
    Smile,
    Sun,
    Moon,
    Flower,
    Camera,
    Music,
    Coffee,
    Gift,
    Cake,
    Balloon,
    Plane,
    Car,
    Home,
    Leaf,
    Sparkles,
    Rainbow,
    Cloud,
    Umbrella,
}

/// A sticker placed on a page
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PageSticker {
    pub id: Uuid,
    pub page_id: Uuid,
    pub kind: StickerKind,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub transform: Transform,
    pub created_by_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fonts for text on a page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text_font_type", rename_all = "lowercase")]
pub enum TextFont {
    #[default]
    Handwriting,
    Serif,
    Sans,
    Mono,
    Display,
}

/// Default color of text on a page
pub const DEFAULT_TEXT_COLOR: &str = "#1F1F1F";

/// Maximum length of text on a page
pub const MAX_TEXT_LENGTH: usize = 2000;

/// A text box placed on a page
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PageText {
    pub id: Uuid,
    pub page_id: Uuid,
    pub text: String,
    pub font: TextFont,
    pub color: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub transform: Transform,
    pub created_by_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Colors of a sticky note
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "note_color_type", rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Yellow,
    Pink,
    Blue,
    Green,
}

/// Maximum length of a sticky note
pub const MAX_NOTE_LENGTH: usize = 500;

/// A sticky note placed on a page
///
/// Notes only move, they do not scale or rotate
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PageNote {
    pub id: Uuid,
    pub page_id: Uuid,
    pub text: String,
    pub color: NoteColor,
    pub x: f64,
    pub y: f64,
    pub created_by_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// All elements of a single page, in creation order
#[derive(Clone, Debug, Default, Serialize)]
pub struct PageElements {
    pub media: Vec<PageMedia>,
    pub stickers: Vec<PageSticker>,
    pub texts: Vec<PageText>,
    pub notes: Vec<PageNote>,
}

/// Is the color a valid `#RGB` or `#RRGGBB` color?
pub fn is_valid_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };

    (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|ch| ch.is_ascii_hexdigit())
}

/// Is the scale usable for an element?
pub fn is_valid_scale(scale: f64) -> bool {
    scale.is_finite() && scale > 0.0
}
