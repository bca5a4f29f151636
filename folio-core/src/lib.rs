//! # folio-core — Block document model
//!
//! A document is an ordered sequence of [`Block`]s. Order is the only
//! structural relationship between blocks: there is no nesting and no
//! cross-referencing. Each block carries a v4 UUID assigned at creation
//! which never changes, and a variant tag which never changes either; only
//! the variant-specific fields are edited.
//!
//! Serialized form (internally tagged on `type`):
//!
//! ```text
//! { "type": "text",      "id": "…", "content": "…", "style": "p" }
//! { "type": "image",     "id": "…", "src": "…", "width": 0, "height": 0 }
//! { "type": "checklist", "id": "…", "items": [ { "id": "…", "text": "…", "checked": false } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a block. Stable for the block's lifetime.
pub type BlockId = Uuid;

/// Identifier of a checklist item, unique within its parent block.
pub type ItemId = Uuid;

/// Model errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Unsupported block type: {0}")]
    UnsupportedBlockType(String),
}

// ---------------------------------------------------------------
// Block kinds
// ---------------------------------------------------------------

/// The variant tag of a [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Image,
    Checklist,
}

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [BlockKind::Text, BlockKind::Image, BlockKind::Checklist];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Checklist => "checklist",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(BlockKind::Text),
            "image" => Ok(BlockKind::Image),
            "checklist" => Ok(BlockKind::Checklist),
            other => Err(ModelError::UnsupportedBlockType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------
// Block
// ---------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
    Checklist(ChecklistBlock),
}

impl Block {
    /// Build a fresh block of `kind` with a new id and the kind's defaults.
    pub fn new(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => Block::Text(TextBlock::new()),
            BlockKind::Image => Block::Image(ImageBlock::new()),
            BlockKind::Checklist => Block::Checklist(ChecklistBlock::new()),
        }
    }

    pub fn id(&self) -> BlockId {
        match self {
            Block::Text(b) => b.id,
            Block::Image(b) => b.id,
            Block::Checklist(b) => b.id,
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Text(_) => BlockKind::Text,
            Block::Image(_) => BlockKind::Image,
            Block::Checklist(_) => BlockKind::Checklist,
        }
    }

    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            Block::Text(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageBlock> {
        match self {
            Block::Image(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_checklist(&self) -> Option<&ChecklistBlock> {
        match self {
            Block::Checklist(b) => Some(b),
            _ => None,
        }
    }
}

impl From<TextBlock> for Block {
    fn from(b: TextBlock) -> Self {
        Block::Text(b)
    }
}

impl From<ImageBlock> for Block {
    fn from(b: ImageBlock) -> Self {
        Block::Image(b)
    }
}

impl From<ChecklistBlock> for Block {
    fn from(b: ChecklistBlock) -> Self {
        Block::Checklist(b)
    }
}

// ---------------------------------------------------------------
// Text
// ---------------------------------------------------------------

/// Paragraph style tag. No other rich-text formatting exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    H1,
    H2,
    H3,
    #[default]
    P,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub id: BlockId,
    pub content: String,
    pub style: TextStyle,
}

impl TextBlock {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            content: String::new(),
            style: TextStyle::P,
        }
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_style(&mut self, style: TextStyle) {
        self.style = style;
    }

    pub fn is_heading(&self) -> bool {
        self.style != TextStyle::P
    }
}

impl Default for TextBlock {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------
// Image
// ---------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub id: BlockId,
    pub src: String,
    pub width: u32,
    pub height: u32,
}

impl ImageBlock {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            src: String::new(),
            width: 0,
            height: 0,
        }
    }

    pub fn set_source(&mut self, src: impl Into<String>, width: u32, height: u32) {
        self.src = src.into();
        self.width = width;
        self.height = height;
    }

    /// `width / height`, or `None` while the image has no dimensions.
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.width as f32 / self.height as f32)
    }

    pub fn has_source(&self) -> bool {
        !self.src.is_empty()
    }
}

impl Default for ImageBlock {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------
// Checklist
// ---------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ItemId,
    pub text: String,
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            checked: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChecklistBlock {
    pub id: BlockId,
    pub items: Vec<ChecklistItem>,
}

impl ChecklistBlock {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            items: Vec::new(),
        }
    }

    /// Append an unchecked item and return its id.
    pub fn add_item(&mut self, text: impl Into<String>) -> ItemId {
        let item = ChecklistItem::new(text);
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Flip `checked` on the item. Returns `false` if no such item exists.
    pub fn toggle_item(&mut self, id: ItemId) -> bool {
        match self.item_mut(id) {
            Some(item) => {
                item.checked = !item.checked;
                true
            }
            None => false,
        }
    }

    pub fn set_item_text(&mut self, id: ItemId, text: impl Into<String>) -> bool {
        match self.item_mut(id) {
            Some(item) => {
                item.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.checked).count()
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut ChecklistItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }
}

impl Default for ChecklistBlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_block_defaults() {
        let text = Block::new(BlockKind::Text);
        let text = text.as_text().unwrap();
        assert_eq!(text.content, "");
        assert_eq!(text.style, TextStyle::P);

        let image = Block::new(BlockKind::Image);
        let image = image.as_image().unwrap();
        assert_eq!(image.src, "");
        assert_eq!((image.width, image.height), (0, 0));

        let checklist = Block::new(BlockKind::Checklist);
        assert!(checklist.as_checklist().unwrap().items.is_empty());
    }

    #[test]
    fn test_block_ids_are_unique() {
        let ids: HashSet<BlockId> = (0..100)
            .map(|i| Block::new(BlockKind::ALL[i % 3]).id())
            .collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_kind_parsing() {
        for kind in BlockKind::ALL {
            assert_eq!(kind.as_str().parse::<BlockKind>().unwrap(), kind);
            assert_eq!(Block::new(kind).kind(), kind);
        }

        let err = "video".parse::<BlockKind>().unwrap_err();
        assert_eq!(err, ModelError::UnsupportedBlockType("video".into()));
        assert!(err.to_string().contains("video"));
    }

    #[test]
    fn test_text_serialized_shape() {
        let mut text = TextBlock::new();
        text.set_content("Hello");
        text.set_style(TextStyle::H2);
        let value = serde_json::to_value(Block::from(text.clone())).unwrap();

        assert_eq!(value["type"], "text");
        assert_eq!(value["id"], text.id.to_string());
        assert_eq!(value["content"], "Hello");
        assert_eq!(value["style"], "h2");
        // Fields of other variants are absent, not null
        assert!(value.get("src").is_none());
        assert!(value.get("items").is_none());
    }

    #[test]
    fn test_checklist_deserialize() {
        let id = Uuid::new_v4();
        let item_id = Uuid::new_v4();
        let json = format!(
            r#"{{"type":"checklist","id":"{id}","items":[{{"id":"{item_id}","text":"milk","checked":true}}]}}"#
        );
        let block: Block = serde_json::from_str(&json).unwrap();

        assert_eq!(block.id(), id);
        let list = block.as_checklist().unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].text, "milk");
        assert!(list.items[0].checked);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = format!(r#"{{"type":"video","id":"{}"}}"#, Uuid::new_v4());
        assert!(serde_json::from_str::<Block>(&json).is_err());
    }

    #[test]
    fn test_checklist_editing() {
        let mut list = ChecklistBlock::new();
        let a = list.add_item("eggs");
        let b = list.add_item("flour");
        assert_ne!(a, b);

        assert!(list.toggle_item(a));
        assert_eq!(list.completed_count(), 1);
        assert!(list.toggle_item(a));
        assert_eq!(list.completed_count(), 0);

        assert!(list.set_item_text(b, "rye flour"));
        assert_eq!(list.items[1].text, "rye flour");

        assert!(list.remove_item(a));
        assert!(!list.remove_item(a));
        assert!(!list.toggle_item(a));
        assert_eq!(list.items.len(), 1);
    }

    #[test]
    fn test_image_source() {
        let mut image = ImageBlock::new();
        assert!(!image.has_source());
        assert_eq!(image.aspect_ratio(), None);

        image.set_source("https://example.com/cat.png", 800, 400);
        assert!(image.has_source());
        assert_eq!(image.aspect_ratio(), Some(2.0));
    }
}
