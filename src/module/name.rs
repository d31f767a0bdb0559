//
//  name.rs
//  Trawl
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hierarchical dotted module name, e.g. `package.sub.leaf`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleName(String);

impl ModuleName {
    /// Name the program entry module runs under.
    pub const MAIN: &'static str = "__main__";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn main() -> Self {
        Self::new(Self::MAIN)
    }

    /// Build `package.name`, or just `name` outside of any package.
    pub fn in_package(name: &str, package: Option<&ModuleName>) -> Self {
        match package {
            Some(package) => package.child(name),
            None => Self::new(name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last component: `a.b.c` -> `c`.
    pub fn basename(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Enclosing package: `a.b.c` -> `a.b`, `None` for top level names.
    pub fn package_name(&self) -> Option<ModuleName> {
        self.0
            .rsplit_once('.')
            .map(|(package, _)| ModuleName::new(package))
    }

    /// First component: `a.b.c` -> `a`.
    pub fn top_level(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }

    pub fn child(&self, name: &str) -> ModuleName {
        ModuleName::new(format!("{}.{}", self.0, name))
    }

    pub fn is_main(&self) -> bool {
        self.0 == Self::MAIN
    }

    /// Whether this name lives strictly below `package`.
    pub fn is_below(&self, package: &str) -> bool {
        self.0.len() > package.len()
            && self.0.starts_with(package)
            && self.0.as_bytes()[package.len()] == b'.'
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename_and_package() {
        let name = ModuleName::new("a.b.c");
        assert_eq!(name.basename(), "c");
        assert_eq!(name.package_name(), Some(ModuleName::new("a.b")));
        assert_eq!(name.top_level(), "a");

        let top = ModuleName::new("solo");
        assert_eq!(top.basename(), "solo");
        assert_eq!(top.package_name(), None);
    }

    #[test]
    fn test_in_package() {
        let pkg = ModuleName::new("plugins");
        assert_eq!(ModuleName::in_package("x", Some(&pkg)).as_str(), "plugins.x");
        assert_eq!(ModuleName::in_package("x", None).as_str(), "x");
    }

    #[test]
    fn test_is_below() {
        let name = ModuleName::new("numpy.core.multiarray");
        assert!(name.is_below("numpy"));
        assert!(name.is_below("numpy.core"));
        assert!(!name.is_below("numpy.core.multiarray"));
        assert!(!ModuleName::new("numpyx.core").is_below("numpy"));
    }

    #[test]
    fn test_main() {
        assert!(ModuleName::main().is_main());
        assert!(!ModuleName::new("pkg.__main__").is_main());
        assert_eq!(ModuleName::new("pkg.__main__").basename(), ModuleName::MAIN);
    }
}
