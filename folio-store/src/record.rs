//! Persisted record format.
//!
//! A record is the block's own JSON object with one extra field,
//! `position`, holding its index in the last written document order:
//!
//! ```text
//! key   = "1b4e28ba-2fa1-11d2-883f-0016d3cca427"
//! value = {"type":"text","id":"1b4e…","content":"","style":"p","position":0}
//! ```
//!
//! Fields of other variants are absent rather than null-filled.

use folio_core::{Block, BlockId};
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// A block together with its persisted position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredBlock {
    #[serde(flatten)]
    pub block: Block,
    pub position: u64,
}

#[derive(Serialize)]
struct StoredBlockRef<'a> {
    #[serde(flatten)]
    block: &'a Block,
    position: u64,
}

/// Record key for a block id (hyphenated UUID string).
pub fn key(id: BlockId) -> String {
    id.hyphenated().to_string()
}

pub fn encode(block: &Block, position: u64) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(&StoredBlockRef { block, position }).map_err(StoreError::write)
}

pub fn decode(key: &[u8], value: &[u8]) -> Result<StoredBlock, StoreError> {
    serde_json::from_slice(value).map_err(|e| StoreError::Corrupt {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: e.to_string(),
    })
}

/// Sort records by `(position, id)` and strip positions.
pub fn into_document_order(mut records: Vec<StoredBlock>) -> Vec<Block> {
    records.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.block.id().cmp(&b.block.id()))
    });
    records.into_iter().map(|r| r.block).collect()
}

/// Position for a block not yet in the collection: one past the highest.
pub fn next_position<'a>(positions: impl IntoIterator<Item = &'a u64>) -> u64 {
    positions.into_iter().max().map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{BlockKind, TextBlock, TextStyle};

    #[test]
    fn test_record_shape() {
        let mut text = TextBlock::new();
        text.set_content("hi");
        text.set_style(TextStyle::H1);
        let block = Block::from(text);

        let bytes = encode(&block, 7).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["content"], "hi");
        assert_eq!(value["style"], "h1");
        assert_eq!(value["position"], 7);
        assert!(value.get("width").is_none());

        let k = key(block.id());
        let decoded = decode(k.as_bytes(), &bytes).unwrap();
        assert_eq!(decoded.block, block);
        assert_eq!(decoded.position, 7);
    }

    #[test]
    fn test_decode_corrupt() {
        let err = decode(b"some-key", b"{not json").unwrap_err();
        match err {
            StoreError::Corrupt { key, .. } => assert_eq!(key, "some-key"),
            other => panic!("Expected corrupt record, got {other:?}"),
        }
    }

    #[test]
    fn test_document_order() {
        let a = Block::new(BlockKind::Text);
        let b = Block::new(BlockKind::Image);
        let c = Block::new(BlockKind::Checklist);
        let records = vec![
            StoredBlock { block: c.clone(), position: 2 },
            StoredBlock { block: a.clone(), position: 0 },
            StoredBlock { block: b.clone(), position: 1 },
        ];

        assert_eq!(into_document_order(records), vec![a, b, c]);
    }

    #[test]
    fn test_next_position() {
        assert_eq!(next_position(&[]), 0);
        assert_eq!(next_position(&[0, 4, 2]), 5);
    }
}
