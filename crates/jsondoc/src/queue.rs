//! Render queue and link table
//!
//! The link table is the single owner of anchor identity for a run. Named
//! declarations are keyed by `(namespace, name)` so every reference to the
//! same declaration links to one table. Anonymous types are keyed by the
//! reference site that produced them, so two structurally equal inline
//! structs still get two tables.
//!
//! The queue is a plain FIFO worklist; items may be pushed while it is being
//! drained.

use crate::index::{NamespaceId, Scope};
use crate::types::TypeExpr;
use std::collections::{HashMap, HashSet, VecDeque};

/// Prefix of every type anchor
pub const ANCHOR_PREFIX: &str = "type-";

/// Identity of something that owns an anchor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkKey {
    /// Named declaration
    Declaration {
        namespace: NamespaceId,
        name: String,
    },
    /// Anonymous type at one reference site
    Site(u64),
}

impl LinkKey {
    /// Key of a named declaration
    pub fn declaration(namespace: NamespaceId, name: impl Into<String>) -> Self {
        LinkKey::Declaration {
            namespace,
            name: name.into(),
        }
    }
}

/// Anchor assignment for one run
#[derive(Debug, Default)]
pub struct LinkTable {
    anchors: HashMap<LinkKey, String>,
    used: HashSet<String>,
    counters: HashMap<String, usize>,
    next_site: u64,
}

impl LinkTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the anchor of `key`, assigning one derived from `name` if it
    /// has none yet. The flag is true when the anchor was just assigned.
    pub fn assign(&mut self, key: LinkKey, name: &str) -> (String, bool) {
        if let Some(anchor) = self.anchors.get(&key) {
            return (anchor.clone(), false);
        }
        let anchor = self.unique_anchor(&format!("{}{}", ANCHOR_PREFIX, slug(name)));
        self.anchors.insert(key, anchor.clone());
        (anchor, true)
    }

    /// Fresh key for an anonymous type site
    pub fn new_site(&mut self) -> LinkKey {
        self.next_site += 1;
        LinkKey::Site(self.next_site)
    }

    /// Reserve an anchor based on `base`.
    ///
    /// The first use of a base is the base itself; later uses get `-2`,
    /// `-3`, ... skipping anything already taken.
    pub fn unique_anchor(&mut self, base: &str) -> String {
        let counter = self.counters.entry(base.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = if *counter == 1 {
                base.to_string()
            } else {
                format!("{}-{}", base, counter)
            };
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

/// Make `name` usable inside an HTML id: anything but ASCII alphanumerics,
/// `_` and `-` becomes `-`
pub fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// One pending table
#[derive(Debug, Clone)]
pub struct RenderItem {
    /// Heading text after "Type "
    pub title: String,
    /// Anchor of the heading
    pub anchor: String,
    /// Type to tabulate
    pub ty: TypeExpr,
    /// Resolution context of `ty`
    pub scope: Scope,
    /// Doc comment of the declaration, if any
    pub doc: Option<String>,
}

/// FIFO worklist of render items
#[derive(Debug, Default)]
pub struct RenderQueue {
    items: VecDeque<RenderItem>,
}

impl RenderQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item
    pub fn enqueue(&mut self, item: RenderItem) {
        tracing::trace!(anchor = %item.anchor, title = %item.title, "queued type");
        self.items.push_back(item);
    }

    /// Take the oldest item
    pub fn pop(&mut self) -> Option<RenderItem> {
        self.items.pop_front()
    }

    /// Pending items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
