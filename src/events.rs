use std::fmt;
use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind};
use serde::{Deserialize, Serialize};

/// Filesystem operation in fsnotify naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventOp {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
}

impl EventOp {
    pub fn as_str(self) -> &'static str {
        match self {
            EventOp::Create => "CREATE",
            EventOp::Write => "WRITE",
            EventOp::Remove => "REMOVE",
            EventOp::Rename => "RENAME",
            EventOp::Chmod => "CHMOD",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "CREATE" => Some(EventOp::Create),
            "WRITE" => Some(EventOp::Write),
            "REMOVE" => Some(EventOp::Remove),
            "RENAME" => Some(EventOp::Rename),
            "CHMOD" => Some(EventOp::Chmod),
            _ => None,
        }
    }

    /// Map a notify event kind; access and catch-all kinds have no equivalent.
    pub fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(EventOp::Create),
            EventKind::Modify(ModifyKind::Name(_)) => Some(EventOp::Rename),
            EventKind::Modify(ModifyKind::Metadata(_)) => Some(EventOp::Chmod),
            EventKind::Modify(_) => Some(EventOp::Write),
            EventKind::Remove(_) => Some(EventOp::Remove),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
        }
    }
}

impl fmt::Display for EventOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single watcher event, rendered as `"<path>": <OP>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub op: EventOp,
}

impl WatchEvent {
    pub fn new<P: Into<PathBuf>>(path: P, op: EventOp) -> Self {
        Self {
            path: path.into(),
            op,
        }
    }

    /// Parse the raw `"<path>": <OP>` form. The quotes are optional.
    ///
    /// The path ends at the first colon and the op follows the last one, so a
    /// path containing `:` is truncated the same way [`raw_event_path`] does.
    pub fn parse(raw: &str) -> Option<Self> {
        let (_, op) = raw.rsplit_once(':')?;
        let op = EventOp::from_name(op)?;
        let path = raw_event_path(raw);
        if path.is_empty() {
            return None;
        }
        Some(Self::new(path, op))
    }

    /// One event per path in a notify event.
    pub fn from_notify(event: &notify::Event) -> Vec<Self> {
        match EventOp::from_notify(&event.kind) {
            Some(op) => event
                .paths
                .iter()
                .map(|path| Self::new(path.clone(), op))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Path component of a raw watcher event: everything before the first colon,
/// with quotes removed.
pub fn raw_event_path(raw: &str) -> String {
    let path = raw.split(':').next().unwrap_or_default();
    path.replace('"', "").trim().to_string()
}

impl fmt::Display for WatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": {}", self.path.display(), self.op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};

    #[test]
    fn test_parse_quoted_event() {
        let event = WatchEvent::parse(r#""views/index.tpl": WRITE"#).unwrap();
        assert_eq!(event.path, PathBuf::from("views/index.tpl"));
        assert_eq!(event.op, EventOp::Write);
        assert_eq!(event.to_string(), r#""views/index.tpl": WRITE"#);
    }

    #[test]
    fn test_parse_unquoted_event() {
        let event = WatchEvent::parse("main.go: CREATE").unwrap();
        assert_eq!(event.path, PathBuf::from("main.go"));
        assert_eq!(event.op, EventOp::Create);
    }

    #[test]
    fn test_parse_malformed_events() {
        assert!(WatchEvent::parse("main.go").is_none());
        assert!(WatchEvent::parse(r#""main.go": EXPLODE"#).is_none());
        assert!(WatchEvent::parse(r#""": WRITE"#).is_none());
    }

    #[test]
    fn test_path_ends_at_first_colon() {
        let raw = r#""/proj/a:b/index.tpl": WRITE"#;
        assert_eq!(raw_event_path(raw), "/proj/a");

        let event = WatchEvent::parse(raw).unwrap();
        assert_eq!(event.path, PathBuf::from("/proj/a"));
        assert_eq!(event.op, EventOp::Write);
    }

    #[test]
    fn test_notify_kinds() {
        assert_eq!(
            EventOp::from_notify(&EventKind::Create(CreateKind::File)),
            Some(EventOp::Create)
        );
        assert_eq!(
            EventOp::from_notify(&EventKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(EventOp::Write)
        );
        assert_eq!(
            EventOp::from_notify(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
            Some(EventOp::Rename)
        );
        assert_eq!(
            EventOp::from_notify(&EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions))),
            Some(EventOp::Chmod)
        );
        assert_eq!(
            EventOp::from_notify(&EventKind::Remove(RemoveKind::File)),
            Some(EventOp::Remove)
        );
        assert_eq!(EventOp::from_notify(&EventKind::Any), None);
    }

    #[test]
    fn test_from_notify_event() {
        let event = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/proj/a.go"))
            .add_path(PathBuf::from("/proj/b.go"));

        let events = WatchEvent::from_notify(&event);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].to_string(), r#""/proj/b.go": CREATE"#);
    }
}
