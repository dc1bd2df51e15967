use crate::model::block::{BlockType, ParentLevel};
use crate::model::text::FieldError;
use crate::model::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by entity store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from entity store mutations and lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Target id (or referenced parent id) does not exist.
    NotFound(EntityId),
    /// Parent exists but lives at the wrong level for the block kind.
    InvalidParent {
        parent_id: EntityId,
        expected: ParentLevel,
    },
    /// Patch variant does not match the stored block variant.
    KindMismatch {
        id: EntityId,
        stored: BlockType,
        patch: BlockType,
    },
    /// Field failed a presence/shape check.
    InvalidField(FieldError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "entity not found: {id}"),
            Self::InvalidParent {
                parent_id,
                expected,
            } => write!(f, "parent {parent_id} is not a {expected:?}"),
            Self::KindMismatch { id, stored, patch } => {
                write!(f, "cannot apply {patch} patch to {stored} block {id}")
            }
            Self::InvalidField(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidField(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidParent { .. } => None,
            Self::KindMismatch { .. } => None,
        }
    }
}

impl From<FieldError> for StoreError {
    fn from(value: FieldError) -> Self {
        Self::InvalidField(value)
    }
}
