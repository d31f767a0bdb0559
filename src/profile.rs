//! Inclusion feedback recorded by a profiled run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::hooks::ProfileFeedback;
use crate::module::{ModuleKind, ModuleName};

/// `{ "included": [...], "excluded": [...] }`. A name in both lists is
/// excluded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileData {
    pub included: HashSet<ModuleName>,
    pub excluded: HashSet<ModuleName>,
}

impl ProfileData {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let data: Self = serde_json::from_str(&contents)?;
        debug!(
            path = %path.display(),
            included = data.included.len(),
            excluded = data.excluded.len(),
            "loaded profile data"
        );
        Ok(data)
    }
}

impl ProfileFeedback for ProfileData {
    fn decide_inclusion(&self, name: &ModuleName, _kind: ModuleKind) -> Option<bool> {
        if self.excluded.contains(name) {
            Some(false)
        } else if self.included.contains(name) {
            Some(true)
        } else {
            None
        }
    }
}
