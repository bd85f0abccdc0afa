//! The remote document store's wire shape.
//!
//! The hosting page editor persists whole documents into a headless
//! content store whose block shape uses `_type`/`_key` discriminators and
//! camelCase field names. This module owns that shape and the lossless
//! conversions to and from the model; it deliberately implements no
//! client — fetch/patch/create stay on the host's side of the boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    Block, ButtonBlock, DividerBlock, DocumentBlock, ImageBlock, ListKind, Mark, MarkDef, Span,
    Style,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown block style: {0}")]
    UnknownStyle(String),
    #[error("unknown list item kind: {0}")]
    UnknownListKind(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One document unit on the wire, discriminated by `_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum BlockDoc {
    #[serde(rename = "block")]
    Text(TextBlockDoc),
    #[serde(rename = "image")]
    Image(ImageDoc),
    #[serde(rename = "divider")]
    Divider(DividerDoc),
    #[serde(rename = "button")]
    Button(ButtonDoc),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlockDoc {
    #[serde(rename = "_key")]
    pub key: String,
    pub style: String,
    #[serde(rename = "listItem", default, skip_serializing_if = "Option::is_none")]
    pub list_item: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    pub children: Vec<SpanDoc>,
    #[serde(rename = "markDefs")]
    pub mark_defs: Vec<MarkDefDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanDoc {
    #[serde(rename = "_type", default = "span_type")]
    pub ty: String,
    #[serde(rename = "_key")]
    pub key: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<String>,
}

fn span_type() -> String {
    "span".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkDefDoc {
    #[serde(rename = "_type", default = "link_type")]
    pub ty: String,
    #[serde(rename = "_key")]
    pub key: String,
    pub href: String,
}

fn link_type() -> String {
    "link".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDoc {
    #[serde(rename = "_key")]
    pub key: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividerDoc {
    #[serde(rename = "_key")]
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonDoc {
    #[serde(rename = "_key")]
    pub key: String,
    pub text: String,
    pub url: String,
}

/// The whole-document shape a post persists as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_type", default = "post_type")]
    pub ty: String,
    pub title: String,
    pub slug: String,
    pub body: Vec<BlockDoc>,
}

fn post_type() -> String {
    "post".to_string()
}

fn style_name(style: Style) -> &'static str {
    match style {
        Style::Normal => "normal",
        Style::Heading1 => "h1",
        Style::Heading2 => "h2",
        Style::Heading3 => "h3",
        Style::Quote => "blockquote",
    }
}

fn style_from_name(name: &str) -> Result<Style, StoreError> {
    match name {
        "normal" => Ok(Style::Normal),
        "h1" => Ok(Style::Heading1),
        "h2" => Ok(Style::Heading2),
        "h3" => Ok(Style::Heading3),
        "blockquote" => Ok(Style::Quote),
        other => Err(StoreError::UnknownStyle(other.to_string())),
    }
}

fn list_kind_name(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Bullet => "bullet",
        ListKind::Number => "number",
    }
}

fn list_kind_from_name(name: &str) -> Result<ListKind, StoreError> {
    match name {
        "bullet" => Ok(ListKind::Bullet),
        "number" => Ok(ListKind::Number),
        other => Err(StoreError::UnknownListKind(other.to_string())),
    }
}

impl From<&Block> for TextBlockDoc {
    /// Save-time conversion: dangling mark definitions are pruned here,
    /// honoring the "prune on save" invariant.
    fn from(block: &Block) -> Self {
        let mut block = block.clone();
        block.prune_mark_defs();
        TextBlockDoc {
            key: block.key.clone(),
            style: style_name(block.style).to_string(),
            list_item: block.list_item.map(|k| list_kind_name(k).to_string()),
            level: block.list_item.map(|_| block.level),
            children: block
                .children
                .iter()
                .map(|span| SpanDoc {
                    ty: span_type(),
                    key: span.key.clone(),
                    text: span.text.clone(),
                    marks: span.marks.iter().map(|m| m.name().to_string()).collect(),
                })
                .collect(),
            mark_defs: block
                .mark_defs
                .iter()
                .map(|def| MarkDefDoc {
                    ty: link_type(),
                    key: def.key.clone(),
                    href: def.href.clone(),
                })
                .collect(),
        }
    }
}

impl TryFrom<&TextBlockDoc> for Block {
    type Error = StoreError;

    fn try_from(doc: &TextBlockDoc) -> Result<Self, StoreError> {
        let list_item = doc
            .list_item
            .as_deref()
            .map(list_kind_from_name)
            .transpose()?;
        let mut children: Vec<Span> = doc
            .children
            .iter()
            .map(|span| Span {
                key: span.key.clone(),
                text: span.text.clone(),
                marks: span.marks.iter().map(|m| Mark::from_name(m)).collect(),
            })
            .collect();
        if children.is_empty() {
            children.push(Span::empty());
        }
        Ok(Block {
            key: doc.key.clone(),
            style: style_from_name(&doc.style)?,
            list_item,
            level: doc.level.unwrap_or(1).max(1),
            children,
            mark_defs: doc
                .mark_defs
                .iter()
                .map(|def| MarkDef::link(def.key.clone(), def.href.clone()))
                .collect(),
        })
    }
}

impl From<&DocumentBlock> for BlockDoc {
    fn from(block: &DocumentBlock) -> Self {
        match block {
            DocumentBlock::Text(b) => BlockDoc::Text(b.into()),
            DocumentBlock::Image(b) => BlockDoc::Image(ImageDoc {
                key: b.key.clone(),
                url: b.url.clone(),
                alt: b.alt.clone(),
            }),
            DocumentBlock::Divider(b) => BlockDoc::Divider(DividerDoc {
                key: b.key.clone(),
            }),
            DocumentBlock::Button(b) => BlockDoc::Button(ButtonDoc {
                key: b.key.clone(),
                text: b.text.clone(),
                url: b.url.clone(),
            }),
        }
    }
}

impl TryFrom<&BlockDoc> for DocumentBlock {
    type Error = StoreError;

    fn try_from(doc: &BlockDoc) -> Result<Self, StoreError> {
        Ok(match doc {
            BlockDoc::Text(b) => DocumentBlock::Text(b.try_into()?),
            BlockDoc::Image(b) => DocumentBlock::Image(ImageBlock {
                key: b.key.clone(),
                url: b.url.clone(),
                alt: b.alt.clone(),
            }),
            BlockDoc::Divider(b) => DocumentBlock::Divider(DividerBlock {
                key: b.key.clone(),
            }),
            BlockDoc::Button(b) => DocumentBlock::Button(ButtonBlock {
                key: b.key.clone(),
                text: b.text.clone(),
                url: b.url.clone(),
            }),
        })
    }
}

/// Serialize a model block to the store's JSON text.
pub fn to_json(block: &DocumentBlock) -> Result<String, StoreError> {
    Ok(serde_json::to_string(&BlockDoc::from(block))?)
}

/// Deserialize a store JSON block into the model.
pub fn from_json(json: &str) -> Result<DocumentBlock, StoreError> {
    let doc: BlockDoc = serde_json::from_str(json)?;
    DocumentBlock::try_from(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn text_block_serializes_with_store_field_names() {
        let mut block = Block::paragraph("Hello world");
        block.key = "blk1".to_string();
        block.children[0].key = "spn1".to_string();
        let value = serde_json::to_value(BlockDoc::from(&DocumentBlock::Text(block))).unwrap();
        assert_eq!(
            value,
            json!({
                "_type": "block",
                "_key": "blk1",
                "style": "normal",
                "children": [
                    {"_type": "span", "_key": "spn1", "text": "Hello world"}
                ],
                "markDefs": []
            })
        );
    }

    #[test]
    fn list_blocks_carry_list_item_and_level() {
        let block = Block::list_item(ListKind::Number, "x");
        let BlockDoc::Text(doc) = BlockDoc::from(&DocumentBlock::Text(block)) else {
            panic!("expected a text block doc");
        };
        assert_eq!(doc.list_item.as_deref(), Some("number"));
        assert_eq!(doc.level, Some(1));
    }

    #[test]
    fn marks_and_defs_survive_the_round_trip() {
        let mut block = Block::paragraph("go");
        block.mark_defs.push(MarkDef::link("k1", "https://x.com"));
        block.children[0].marks = vec![Mark::Strong, Mark::Def("k1".to_string())];

        let doc = TextBlockDoc::from(&block);
        let back = Block::try_from(&doc).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn save_prunes_dangling_defs() {
        let mut block = Block::paragraph("plain");
        block.mark_defs.push(MarkDef::link("k1", "https://x.com"));
        let doc = TextBlockDoc::from(&block);
        assert!(doc.mark_defs.is_empty());
    }

    #[test]
    fn unknown_style_is_rejected() {
        let doc = TextBlockDoc {
            key: "k".to_string(),
            style: "h9".to_string(),
            list_item: None,
            level: None,
            children: Vec::new(),
            mark_defs: Vec::new(),
        };
        assert!(matches!(
            Block::try_from(&doc),
            Err(StoreError::UnknownStyle(_))
        ));
    }

    #[test]
    fn empty_children_normalize_to_one_empty_span() {
        let doc = TextBlockDoc {
            key: "k".to_string(),
            style: "normal".to_string(),
            list_item: None,
            level: None,
            children: Vec::new(),
            mark_defs: Vec::new(),
        };
        let block = Block::try_from(&doc).unwrap();
        assert_eq!(block.children.len(), 1);
        assert!(block.is_empty());
    }

    #[test]
    fn component_blocks_discriminate_on_type() {
        let divider = DocumentBlock::Divider(DividerBlock {
            key: "d1".to_string(),
        });
        let json = to_json(&divider).unwrap();
        assert_eq!(json, r#"{"_type":"divider","_key":"d1"}"#);
        assert_eq!(from_json(&json).unwrap(), divider);
    }

    #[test]
    fn post_document_shape() {
        let doc = PostDocument {
            id: None,
            ty: post_type(),
            title: "Issue #1".to_string(),
            slug: "issue-1".to_string(),
            body: vec![BlockDoc::from(&DocumentBlock::Text(Block::paragraph(
                "hi",
            )))],
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["_type"], "post");
        assert_eq!(value["body"][0]["_type"], "block");
        let back: PostDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back, doc);
    }
}
