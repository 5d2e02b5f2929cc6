#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    Object,
}

/// One row in a folder view: a distinct first-level segment found
/// under a prefix. Folder entries carry the prefix to descend into;
/// object entries terminate at their key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    kind: EntryKind,
    child_prefix: Option<String>,
}

impl Entry {
    pub fn folder(name: &str, child_prefix: String) -> Self {
        Entry {
            name: name.to_string(),
            kind: EntryKind::Folder,
            child_prefix: Some(child_prefix),
        }
    }

    pub fn object(name: &str) -> Self {
        Entry {
            name: name.to_string(),
            kind: EntryKind::Object,
            child_prefix: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    pub fn child_prefix(&self) -> Option<&str> {
        self.child_prefix.as_deref()
    }
}
