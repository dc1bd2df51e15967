//! Block kind dispatch for the rendering layer.
//!
//! # Responsibility
//! - Map a block (or a raw `type` tag) onto a visitor method per variant.
//! - Degrade unrecognized tags to a marked fallback instead of failing.

use crate::model::block::{
    Block, BlockContent, BlockType, NoteFields, SectionFields, TaskFields, TodoFields,
};
use std::fmt::{Display, Formatter};

/// Label shown for blocks whose tag the core does not recognize.
pub const UNKNOWN_BLOCK_LABEL: &str = "unknown block type";

/// Parsed block tag, open to values the core does not know.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Known(BlockType),
    Unknown(String),
}

impl BlockKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "task" => Self::Known(BlockType::Task),
            "section" => Self::Known(BlockType::Section),
            "note" => Self::Known(BlockType::Note),
            "todo" => Self::Known(BlockType::Todo),
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Known(kind) => kind.tag(),
            Self::Unknown(tag) => tag,
        }
    }
}

impl From<BlockType> for BlockKind {
    fn from(value: BlockType) -> Self {
        Self::Known(value)
    }
}

impl Display for BlockKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// One method per block variant plus the unknown-tag fallback.
pub trait BlockVisitor {
    type Output;

    fn visit_task(&mut self, block: &Block, fields: &TaskFields) -> Self::Output;
    fn visit_section(&mut self, block: &Block, fields: &SectionFields) -> Self::Output;
    fn visit_note(&mut self, block: &Block, fields: &NoteFields) -> Self::Output;
    fn visit_todo(&mut self, block: &Block, fields: &TodoFields) -> Self::Output;
    fn visit_unknown(&mut self, tag: &str) -> Self::Output;
}

pub fn dispatch<V: BlockVisitor>(block: &Block, visitor: &mut V) -> V::Output {
    match &block.content {
        BlockContent::Task(fields) => visitor.visit_task(block, fields),
        BlockContent::Section(fields) => visitor.visit_section(block, fields),
        BlockContent::Note(fields) => visitor.visit_note(block, fields),
        BlockContent::Todo(fields) => visitor.visit_todo(block, fields),
    }
}

/// Dispatches on a tag carried by the UI for `block`.
///
/// Falls back to `visit_unknown` when the tag is unrecognized or disagrees
/// with the stored variant.
pub fn dispatch_tagged<V: BlockVisitor>(tag: &str, block: &Block, visitor: &mut V) -> V::Output {
    match BlockKind::from_tag(tag) {
        BlockKind::Known(kind) if kind == block.kind() => dispatch(block, visitor),
        other => visitor.visit_unknown(other.tag()),
    }
}

/// One-line text rendering, used by the CLI tree printer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl BlockVisitor for PlainTextRenderer {
    type Output = String;

    fn visit_task(&mut self, _block: &Block, fields: &TaskFields) -> String {
        let marker = if fields.is_selected { ">" } else { " " };
        let check = if fields.is_complete { "x" } else { " " };
        format!("{marker}[{check}] {}", fields.title)
    }

    fn visit_section(&mut self, _block: &Block, fields: &SectionFields) -> String {
        format!("## {}", fields.title)
    }

    fn visit_note(&mut self, _block: &Block, fields: &NoteFields) -> String {
        format!("- {}", fields.title)
    }

    fn visit_todo(&mut self, _block: &Block, fields: &TodoFields) -> String {
        let check = if fields.is_complete { "x" } else { " " };
        let mut line = format!("[{check}] {}", fields.title);
        if let Some(priority) = &fields.priority_id {
            line.push_str(&format!(" !{priority}"));
        }
        for label in &fields.label_ids {
            line.push_str(&format!(" #{label}"));
        }
        line
    }

    fn visit_unknown(&mut self, tag: &str) -> String {
        format!("[{UNKNOWN_BLOCK_LABEL}: {tag}]")
    }
}

#[cfg(test)]
mod tests {
    use super::{dispatch, dispatch_tagged, BlockKind, PlainTextRenderer};
    use crate::model::block::{BlockContent, BlockType, NewBlock, TodoFields};
    use uuid::Uuid;

    #[test]
    fn from_tag_round_trips_known_kinds() {
        for kind in BlockType::ALL {
            assert_eq!(BlockKind::from_tag(kind.tag()), BlockKind::Known(kind));
        }
        assert_eq!(
            BlockKind::from_tag("kanban"),
            BlockKind::Unknown("kanban".to_string())
        );
    }

    #[test]
    fn renderer_formats_todo_metadata() {
        let draft = NewBlock::new(
            Uuid::new_v4(),
            BlockContent::Todo(TodoFields {
                title: "pay rent".to_string(),
                priority_id: Some("p1".to_string()),
                label_ids: vec!["home".to_string()],
                ..TodoFields::default()
            }),
        );
        let block = draft.into_record(Uuid::new_v4(), 0, 1).unwrap();
        assert_eq!(
            dispatch(&block, &mut PlainTextRenderer),
            "[ ] pay rent !p1 #home"
        );
    }

    #[test]
    fn unknown_tag_renders_fallback() {
        let block = NewBlock::note(Uuid::new_v4(), "n")
            .into_record(Uuid::new_v4(), 0, 1)
            .unwrap();
        assert_eq!(
            dispatch_tagged("kanban", &block, &mut PlainTextRenderer),
            "[unknown block type: kanban]"
        );
        assert_eq!(
            dispatch_tagged("todo", &block, &mut PlainTextRenderer),
            "[unknown block type: todo]"
        );
        assert_eq!(dispatch_tagged("note", &block, &mut PlainTextRenderer), "- n");
    }
}
