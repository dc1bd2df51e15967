//! Block domain model.
//!
//! # Responsibility
//! - Define the tagged union shared by task/section/note/todo items.
//! - Provide creation drafts and per-variant partial patches.
//!
//! # Invariants
//! - `parent_id` of a `Task` references a workspace; every other variant
//!   references a task.
//! - `order` is assigned by the store and only rewritten by the reorder path
//!   or sibling compaction after a delete.
//! - A patch only applies to a block of the same variant.

use crate::model::text::{
    normalize_description, normalize_id, normalize_ids, normalize_title, FieldError,
};
use crate::model::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Variant tag of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Task,
    Section,
    Note,
    Todo,
}

/// Level an entity must live at to parent a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLevel {
    Workspace,
    Task,
}

impl BlockType {
    pub const ALL: [BlockType; 4] = [Self::Task, Self::Section, Self::Note, Self::Todo];

    /// Wire tag, identical to the serde `type` value.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Section => "section",
            Self::Note => "note",
            Self::Todo => "todo",
        }
    }

    pub fn parent_level(self) -> ParentLevel {
        match self {
            Self::Task => ParentLevel::Workspace,
            Self::Section | Self::Note | Self::Todo => ParentLevel::Task,
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Self::Task => "Untitled task",
            Self::Section => "Untitled section",
            Self::Note => "Untitled note",
            Self::Todo => "Untitled todo",
        }
    }
}

impl Display for BlockType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    /// Owned by `SelectionPolicy`; ignored on create.
    pub is_selected: bool,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFields {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFields {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoFields {
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub due_date: Option<Timestamp>,
    pub priority_id: Option<String>,
    pub label_ids: Vec<String>,
    pub reminder_ids: Vec<String>,
    pub is_complete: bool,
}

/// Variant payload. Serialized inline with a `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    Task(TaskFields),
    Section(SectionFields),
    Note(NoteFields),
    Todo(TodoFields),
}

impl BlockContent {
    pub fn kind(&self) -> BlockType {
        match self {
            Self::Task(_) => BlockType::Task,
            Self::Section(_) => BlockType::Section,
            Self::Note(_) => BlockType::Note,
            Self::Todo(_) => BlockType::Todo,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Task(fields) => &fields.title,
            Self::Section(fields) => &fields.title,
            Self::Note(fields) => &fields.title,
            Self::Todo(fields) => &fields.title,
        }
    }

    /// Normalizes caller input for a fresh record. Selection is never inherited.
    fn normalized(self) -> Result<Self, FieldError> {
        let placeholder = self.kind().placeholder();
        let content = match self {
            Self::Task(fields) => Self::Task(TaskFields {
                title: normalize_title(&fields.title, placeholder),
                description: normalize_description(&fields.description),
                is_selected: false,
                is_complete: fields.is_complete,
            }),
            Self::Section(fields) => Self::Section(SectionFields {
                title: normalize_title(&fields.title, placeholder),
            }),
            Self::Note(fields) => Self::Note(NoteFields {
                title: normalize_title(&fields.title, placeholder),
            }),
            Self::Todo(fields) => Self::Todo(TodoFields {
                title: normalize_title(&fields.title, placeholder),
                description: normalize_description(&fields.description),
                due_date: fields.due_date,
                priority_id: fields
                    .priority_id
                    .as_deref()
                    .map(|value| normalize_id(value, "priority_id"))
                    .transpose()?,
                label_ids: normalize_ids(&fields.label_ids, "label_ids")?,
                reminder_ids: normalize_ids(&fields.reminder_ids, "reminder_ids")?,
                is_complete: fields.is_complete,
            }),
        };
        Ok(content)
    }
}

/// Stored item under a workspace (task) or task (section/note/todo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: EntityId,
    pub parent_id: EntityId,
    /// Sibling position; dense `0..N-1` within one parent.
    pub order: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(flatten)]
    pub content: BlockContent,
}

impl Block {
    pub fn kind(&self) -> BlockType {
        self.content.kind()
    }

    pub fn title(&self) -> &str {
        self.content.title()
    }

    pub fn as_task(&self) -> Option<&TaskFields> {
        match &self.content {
            BlockContent::Task(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_todo(&self) -> Option<&TodoFields> {
        match &self.content {
            BlockContent::Todo(fields) => Some(fields),
            _ => None,
        }
    }

    /// True only for a task carrying the selection flag.
    pub fn is_selected_task(&self) -> bool {
        self.as_task().is_some_and(|task| task.is_selected)
    }

    pub(crate) fn set_task_selected(&mut self, selected: bool) {
        if let BlockContent::Task(fields) = &mut self.content {
            fields.is_selected = selected;
        }
    }

    /// Applies `patch` atomically: on error the block is left untouched.
    pub(crate) fn apply_patch(&mut self, patch: BlockPatch) -> Result<(), BlockPatchError> {
        let stored = self.kind();
        let placeholder = stored.placeholder();
        let mut next = self.content.clone();
        match (&mut next, patch) {
            (BlockContent::Task(fields), BlockPatch::Task(patch)) => {
                if let Some(title) = patch.title {
                    fields.title = normalize_title(&title, placeholder);
                }
                if let Some(description) = patch.description {
                    fields.description = normalize_description(&description);
                }
                if let Some(is_complete) = patch.is_complete {
                    fields.is_complete = is_complete;
                }
            }
            (BlockContent::Section(fields), BlockPatch::Section(patch)) => {
                if let Some(title) = patch.title {
                    fields.title = normalize_title(&title, placeholder);
                }
            }
            (BlockContent::Note(fields), BlockPatch::Note(patch)) => {
                if let Some(title) = patch.title {
                    fields.title = normalize_title(&title, placeholder);
                }
            }
            (BlockContent::Todo(fields), BlockPatch::Todo(patch)) => {
                if let Some(title) = patch.title {
                    fields.title = normalize_title(&title, placeholder);
                }
                if let Some(description) = patch.description {
                    fields.description = normalize_description(&description);
                }
                if let Some(due_date) = patch.due_date {
                    fields.due_date = due_date;
                }
                if let Some(priority_id) = patch.priority_id {
                    fields.priority_id = priority_id
                        .as_deref()
                        .map(|value| normalize_id(value, "priority_id"))
                        .transpose()?;
                }
                if let Some(label_ids) = patch.label_ids {
                    fields.label_ids = normalize_ids(&label_ids, "label_ids")?;
                }
                if let Some(reminder_ids) = patch.reminder_ids {
                    fields.reminder_ids = normalize_ids(&reminder_ids, "reminder_ids")?;
                }
                if let Some(is_complete) = patch.is_complete {
                    fields.is_complete = is_complete;
                }
            }
            (_, patch) => {
                return Err(BlockPatchError::KindMismatch {
                    stored,
                    patch: patch.kind(),
                });
            }
        }
        self.content = next;
        Ok(())
    }
}

/// Caller-provided fields for a new block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlock {
    pub parent_id: EntityId,
    pub content: BlockContent,
}

impl NewBlock {
    pub fn new(parent_id: EntityId, content: BlockContent) -> Self {
        Self { parent_id, content }
    }

    pub fn task(workspace_id: EntityId, title: impl Into<String>) -> Self {
        Self::new(
            workspace_id,
            BlockContent::Task(TaskFields {
                title: title.into(),
                ..TaskFields::default()
            }),
        )
    }

    pub fn section(task_id: EntityId, title: impl Into<String>) -> Self {
        Self::new(
            task_id,
            BlockContent::Section(SectionFields {
                title: title.into(),
            }),
        )
    }

    pub fn note(task_id: EntityId, title: impl Into<String>) -> Self {
        Self::new(
            task_id,
            BlockContent::Note(NoteFields {
                title: title.into(),
            }),
        )
    }

    pub fn todo(task_id: EntityId, title: impl Into<String>) -> Self {
        Self::new(
            task_id,
            BlockContent::Todo(TodoFields {
                title: title.into(),
                ..TodoFields::default()
            }),
        )
    }

    pub fn kind(&self) -> BlockType {
        self.content.kind()
    }

    pub(crate) fn into_record(
        self,
        id: EntityId,
        order: i64,
        now: Timestamp,
    ) -> Result<Block, FieldError> {
        Ok(Block {
            id,
            parent_id: self.parent_id,
            order,
            created_at: now,
            updated_at: now,
            content: self.content.normalized()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_complete: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionPatch {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
}

/// Partial todo update. Double options distinguish "leave" from "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<Timestamp>>,
    pub priority_id: Option<Option<String>>,
    pub label_ids: Option<Vec<String>>,
    pub reminder_ids: Option<Vec<String>>,
    pub is_complete: Option<bool>,
}

/// Partial update targeting one block variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockPatch {
    Task(TaskPatch),
    Section(SectionPatch),
    Note(NotePatch),
    Todo(TodoPatch),
}

impl BlockPatch {
    /// Title-only patch for any variant.
    pub fn title(kind: BlockType, value: impl Into<String>) -> Self {
        let title = Some(value.into());
        match kind {
            BlockType::Task => Self::Task(TaskPatch {
                title,
                ..TaskPatch::default()
            }),
            BlockType::Section => Self::Section(SectionPatch { title }),
            BlockType::Note => Self::Note(NotePatch { title }),
            BlockType::Todo => Self::Todo(TodoPatch {
                title,
                ..TodoPatch::default()
            }),
        }
    }

    pub fn kind(&self) -> BlockType {
        match self {
            Self::Task(_) => BlockType::Task,
            Self::Section(_) => BlockType::Section,
            Self::Note(_) => BlockType::Note,
            Self::Todo(_) => BlockType::Todo,
        }
    }
}

/// Patch rejected before touching the stored block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockPatchError {
    KindMismatch { stored: BlockType, patch: BlockType },
    Field(FieldError),
}

impl Display for BlockPatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KindMismatch { stored, patch } => {
                write!(f, "cannot apply {patch} patch to {stored} block")
            }
            Self::Field(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BlockPatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(err) => Some(err),
            Self::KindMismatch { .. } => None,
        }
    }
}

impl From<FieldError> for BlockPatchError {
    fn from(value: FieldError) -> Self {
        Self::Field(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Block, BlockContent, BlockPatch, BlockPatchError, BlockType, NewBlock, TodoPatch};
    use uuid::Uuid;

    fn todo_block() -> Block {
        NewBlock::todo(Uuid::new_v4(), "  write   tests ")
            .into_record(Uuid::new_v4(), 0, 1_000)
            .unwrap()
    }

    #[test]
    fn new_task_is_never_selected() {
        let mut draft = NewBlock::task(Uuid::new_v4(), "t");
        if let BlockContent::Task(fields) = &mut draft.content {
            fields.is_selected = true;
        }
        let block = draft.into_record(Uuid::new_v4(), 0, 1).unwrap();
        assert!(!block.is_selected_task());
    }

    #[test]
    fn create_normalizes_title() {
        assert_eq!(todo_block().title(), "write tests");
    }

    #[test]
    fn patch_of_other_kind_is_rejected_without_changes() {
        let mut block = todo_block();
        let before = block.clone();
        let err = block
            .apply_patch(BlockPatch::title(BlockType::Note, "x"))
            .unwrap_err();
        assert_eq!(
            err,
            BlockPatchError::KindMismatch {
                stored: BlockType::Todo,
                patch: BlockType::Note
            }
        );
        assert_eq!(block, before);
    }

    #[test]
    fn failing_todo_patch_keeps_earlier_fields() {
        let mut block = todo_block();
        let before = block.clone();
        let patch = BlockPatch::Todo(TodoPatch {
            title: Some("renamed".to_string()),
            label_ids: Some(vec![" ".to_string()]),
            ..TodoPatch::default()
        });
        assert!(block.apply_patch(patch).is_err());
        assert_eq!(block, before);
    }

    #[test]
    fn todo_patch_can_clear_due_date() {
        let mut block = todo_block();
        block
            .apply_patch(BlockPatch::Todo(TodoPatch {
                due_date: Some(Some(5)),
                ..TodoPatch::default()
            }))
            .unwrap();
        assert_eq!(block.as_todo().unwrap().due_date, Some(5));

        block
            .apply_patch(BlockPatch::Todo(TodoPatch {
                due_date: Some(None),
                ..TodoPatch::default()
            }))
            .unwrap();
        assert_eq!(block.as_todo().unwrap().due_date, None);
    }
}
