//! Recording observer.
//!
//! [`EventLog`] keeps every event a merge reports, with added and replaced
//! subtrees captured as minified markup at the time of the call.

use std::fmt;
use std::io::Write;

use super::ChangeObserver;
use crate::document::Document;
use crate::markup::PrintOptions;
use crate::node::{Name, NodeRef};

/// Kinds of change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Replaced,
    TextChanged,
    AttributeChanged,
    AttributeRemoved,
}

impl ChangeKind {
    /// Returns the label used when writing events.
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Added => "add",
            ChangeKind::Removed => "remove",
            ChangeKind::Replaced => "replace",
            ChangeKind::TextChanged => "text",
            ChangeKind::AttributeChanged => "set-attr",
            ChangeKind::AttributeRemoved => "remove-attr",
        }
    }
}

/// A single recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Added {
        parent: Vec<usize>,
        index: usize,
        markup: String,
    },
    Removed {
        path: Vec<usize>,
    },
    Replaced {
        path: Vec<usize>,
        markup: String,
    },
    TextChanged {
        path: Vec<usize>,
        old: String,
        new: String,
    },
    AttributeChanged {
        path: Vec<usize>,
        name: Name,
        old: Option<String>,
        new: String,
    },
    AttributeRemoved {
        path: Vec<usize>,
        name: Name,
    },
}

impl ChangeEvent {
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeEvent::Added { .. } => ChangeKind::Added,
            ChangeEvent::Removed { .. } => ChangeKind::Removed,
            ChangeEvent::Replaced { .. } => ChangeKind::Replaced,
            ChangeEvent::TextChanged { .. } => ChangeKind::TextChanged,
            ChangeEvent::AttributeChanged { .. } => ChangeKind::AttributeChanged,
            ChangeEvent::AttributeRemoved { .. } => ChangeKind::AttributeRemoved,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.kind().label();
        match self {
            ChangeEvent::Added {
                parent,
                index,
                markup,
            } => write!(f, "{label} {} {index} {markup}", format_path(parent)),
            ChangeEvent::Removed { path } => write!(f, "{label} {}", format_path(path)),
            ChangeEvent::Replaced { path, markup } => {
                write!(f, "{label} {} {markup}", format_path(path))
            }
            ChangeEvent::TextChanged { path, old, new } => {
                write!(f, "{label} {} {old:?} -> {new:?}", format_path(path))
            }
            ChangeEvent::AttributeChanged {
                path,
                name,
                old,
                new,
            } => match old {
                Some(old) => write!(f, "{label} {} {name} {old:?} -> {new:?}", format_path(path)),
                None => write!(f, "{label} {} {name} {new:?}", format_path(path)),
            },
            ChangeEvent::AttributeRemoved { path, name } => {
                write!(f, "{label} {} {name}", format_path(path))
            }
        }
    }
}

/// Observer that records every event it receives.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<ChangeEvent>,
}

impl EventLog {
    /// Creates a new empty log.
    pub fn new() -> Self {
        EventLog { events: Vec::new() }
    }

    /// Returns the recorded events in delivery order.
    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }

    /// Returns the number of recorded events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Counts events by kind.
    pub fn count_by_kind(&self, kind: ChangeKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Writes one line per event.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for event in &self.events {
            writeln!(writer, "{}", event)?;
        }
        Ok(())
    }
}

impl ChangeObserver for EventLog {
    fn on_node_added(&mut self, doc: &Document, parent: &[usize], index: usize, node: NodeRef) {
        self.events.push(ChangeEvent::Added {
            parent: parent.to_vec(),
            index,
            markup: render(doc, node),
        });
    }

    fn on_node_removed(&mut self, path: &[usize]) {
        self.events.push(ChangeEvent::Removed {
            path: path.to_vec(),
        });
    }

    fn on_node_replaced(&mut self, doc: &Document, path: &[usize], node: NodeRef) {
        self.events.push(ChangeEvent::Replaced {
            path: path.to_vec(),
            markup: render(doc, node),
        });
    }

    fn on_text_changed(&mut self, doc: &Document, path: &[usize], node: NodeRef, old: &str) {
        self.events.push(ChangeEvent::TextChanged {
            path: path.to_vec(),
            old: old.to_string(),
            new: doc.get(node).as_leaf().unwrap_or_default().to_string(),
        });
    }

    fn on_attribute_changed(&mut self, path: &[usize], name: &Name, old: Option<&str>, new: &str) {
        self.events.push(ChangeEvent::AttributeChanged {
            path: path.to_vec(),
            name: name.clone(),
            old: old.map(str::to_string),
            new: new.to_string(),
        });
    }

    fn on_attribute_removed(&mut self, path: &[usize], name: &Name) {
        self.events.push(ChangeEvent::AttributeRemoved {
            path: path.to_vec(),
            name: name.clone(),
        });
    }
}

fn render(doc: &Document, node: NodeRef) -> String {
    let mut out = String::new();
    doc.print_node(node, &mut out, PrintOptions::Minified);
    out
}

/// Formats a path as `/0/1/2`, the root as `/`.
fn format_path(path: &[usize]) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.iter().map(|i| format!("/{}", i)).collect()
}
