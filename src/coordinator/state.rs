/// What the editor is currently working on.
///
/// ```text
///              create / select / restore
/// ┌─────────────┐ ─────────────────────► ┌──────────────┐ ──┐ select other
/// │ NoSelection │                         │ Editing(id)  │ ◄─┘
/// └─────────────┘ ◄───────────────────── └──────────────┘
///        │          delete current / missing        ▲
///        │ load example                             │ save draft
///        ▼                                          │
/// ┌─────────────────┐ ──────────────────────────────┘
/// │ Draft{id, name} │
/// └─────────────────┘
/// ```
///
/// A draft is an example template loaded for editing but not yet persisted.
/// Its id is generated up front and becomes the document id when saved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NoSelection,
    Editing {
        id: String,
    },
    Draft {
        id: String,
        name: String,
    },
}

impl SessionState {
    /// Id of the persisted document being edited
    pub fn current_id(&self) -> Option<&str> {
        match self {
            Self::Editing { id } => Some(id),
            _ => None,
        }
    }

    /// Key the editor uses to tell documents apart, drafts included
    pub fn content_key(&self) -> Option<&str> {
        match self {
            Self::Editing { id } | Self::Draft { id, .. } => Some(id),
            Self::NoSelection => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::NoSelection)
    }
}
