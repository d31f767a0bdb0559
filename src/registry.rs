//
//  registry.rs
//  Trawl
//
//  Created by hak (tharun)
//

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::module::{ModuleHandle, ModuleKey, ModuleName, SourceRef};

/// Why one module uses another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageTag {
    /// A literal import statement.
    Import,
    /// Required by convention, declared by a plugin.
    Plugin,
}

/// Usage edge data, kept for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct UsageEdge {
    pub tag: UsageTag,
    pub reason: String,
    pub source_ref: Option<SourceRef>,
}

/// Root modules plus the usage graph between all included modules.
pub struct ModuleRegistry {
    /// Directed usage graph: user -> used.
    graph: DiGraph<ModuleKey, UsageEdge>,
    /// Index: module identity -> node index.
    node_index: HashMap<ModuleKey, NodeIndex>,
    /// Roots in registration order.
    roots: Vec<ModuleHandle>,
    root_keys: HashSet<ModuleKey>,
    entry: Option<ModuleHandle>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
            roots: Vec::new(),
            root_keys: HashSet::new(),
            entry: None,
        }
    }

    // ─── Roots ──────────────────────────────────────────────────

    /// Register the program entry. It is a root as well.
    pub fn set_entry(&mut self, module: ModuleHandle) {
        self.add_root(&module);
        self.entry = Some(module);
    }

    pub fn entry(&self) -> Option<&ModuleHandle> {
        self.entry.as_ref()
    }

    /// Package the entry runs in, set only in package mode.
    pub fn entry_package(&self) -> Option<ModuleName> {
        self.entry
            .as_ref()
            .and_then(|m| m.runtime_package.clone())
    }

    /// Register an independent compilation unit. Safe to repeat; returns
    /// whether the module was not a root before.
    pub fn add_root(&mut self, module: &ModuleHandle) -> bool {
        let key = module.key();
        if !self.root_keys.insert(key.clone()) {
            return false;
        }
        self.ensure_node(key);
        self.roots.push(module.clone());
        true
    }

    pub fn roots(&self) -> &[ModuleHandle] {
        &self.roots
    }

    pub fn is_root(&self, key: &ModuleKey) -> bool {
        self.root_keys.contains(key)
    }

    // ─── Usage ──────────────────────────────────────────────────

    /// Record that `using` uses `module`. Repeating the same tag between
    /// the same pair is a no-op.
    pub fn add_used_module(
        &mut self,
        module: &ModuleHandle,
        using: &ModuleHandle,
        tag: UsageTag,
        reason: &str,
        source_ref: Option<SourceRef>,
    ) {
        let from = self.ensure_node(using.key());
        let to = self.ensure_node(module.key());

        if self
            .graph
            .edges_connecting(from, to)
            .any(|e| e.weight().tag == tag)
        {
            return;
        }

        self.graph.add_edge(
            from,
            to,
            UsageEdge {
                tag,
                reason: reason.to_string(),
                source_ref,
            },
        );
    }

    /// Modules that use `key`, with the edge that says why.
    pub fn users_of(&self, key: &ModuleKey) -> Vec<(&ModuleKey, &UsageEdge)> {
        self.neighbours(key, Direction::Incoming)
    }

    /// Modules `key` uses.
    pub fn used_by(&self, key: &ModuleKey) -> Vec<(&ModuleKey, &UsageEdge)> {
        self.neighbours(key, Direction::Outgoing)
    }

    pub fn usage_count(&self) -> usize {
        self.graph.edge_count()
    }

    // ─── Internal Helpers ───────────────────────────────────────

    fn ensure_node(&mut self, key: ModuleKey) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&key) {
            return idx;
        }
        let idx = self.graph.add_node(key.clone());
        self.node_index.insert(key, idx);
        idx
    }

    fn neighbours(&self, key: &ModuleKey, direction: Direction) -> Vec<(&ModuleKey, &UsageEdge)> {
        let Some(&idx) = self.node_index.get(key) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Incoming => e.source(),
                    Direction::Outgoing => e.target(),
                };
                (&self.graph[other], e.weight())
            })
            .collect()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
