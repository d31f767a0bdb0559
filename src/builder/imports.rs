//
//  imports.rs
//  Trawl
//
//  Created by hak (tharun)
//

//! Import statement extraction from a tree-sitter syntax tree.

use tree_sitter::{Node, Tree};

/// One `import` or `from ... import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// Dotted module path, empty for `from . import x`.
    pub module: String,
    /// Number of leading dots, 0 for absolute imports.
    pub level: usize,
    /// Names after `import` in a `from` statement. Empty for plain imports
    /// and star imports.
    pub names: Vec<String>,
    pub line: usize,
}

/// Every import in the tree, in source order. Imports nested in functions
/// or conditionals count too.
pub fn extract_imports(tree: &Tree, source: &[u8]) -> Vec<ImportStatement> {
    let mut imports = Vec::new();
    collect_imports(&tree.root_node(), source, &mut imports);
    imports
}

fn collect_imports(node: &Node, source: &[u8], imports: &mut Vec<ImportStatement>) {
    match node.kind() {
        "import_statement" => {
            let line = node.start_position().row + 1;
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                if let Some(module) = imported_path(&name, source) {
                    imports.push(ImportStatement {
                        module,
                        level: 0,
                        names: Vec::new(),
                        line,
                    });
                }
            }
            return;
        }
        "import_from_statement" => {
            if let Some(import) = from_import(node, source) {
                imports.push(import);
            }
            return;
        }
        _ => {}
    }

    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            collect_imports(&child, source, imports);
        }
    }
}

fn from_import(node: &Node, source: &[u8]) -> Option<ImportStatement> {
    let module_node = node.child_by_field_name("module_name")?;

    let (module, level) = if module_node.kind() == "relative_import" {
        let mut level = 0;
        let mut module = String::new();
        for i in 0..module_node.child_count() {
            let Some(child) = module_node.child(i) else {
                continue;
            };
            match child.kind() {
                "import_prefix" => level = node_text(&child, source).matches('.').count(),
                "dotted_name" => module = node_text(&child, source),
                _ => {}
            }
        }
        (module, level)
    } else {
        (node_text(&module_node, source), 0)
    };

    let mut cursor = node.walk();
    let names = node
        .children_by_field_name("name", &mut cursor)
        .filter_map(|n| imported_path(&n, source))
        .collect();

    Some(ImportStatement {
        module,
        level,
        names,
        line: node.start_position().row + 1,
    })
}

/// `a.b` for both `a.b` and `a.b as c`.
fn imported_path(node: &Node, source: &[u8]) -> Option<String> {
    let target = match node.kind() {
        "aliased_import" => node.child_by_field_name("name")?,
        "dotted_name" => *node,
        _ => return None,
    };
    let text: String = node_text(&target, source)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    (!text.is_empty()).then_some(text)
}

fn node_text(node: &Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

/// Line of the first syntax error in the tree, if there is one.
pub fn first_error_line(tree: &Tree) -> Option<usize> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                if child.has_error() {
                    stack.push(child);
                }
            }
        }
    }

    Some(root.start_position().row + 1)
}
