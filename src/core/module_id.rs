//! Module identification.
//!
//! Module names are compared constantly during graph resolution, so they
//! are interned once and compared by pointer afterwards. The resolver maps
//! IDs to graph node indices and never does string lookups on the hot path.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{LazyLock, RwLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

static NAMES: LazyLock<RwLock<HashSet<&'static str>>> =
    LazyLock::new(|| RwLock::new(HashSet::new()));

/// Intern a name, leaking at most one allocation per distinct string.
fn intern(name: &str) -> &'static str {
    if let Some(&existing) = NAMES.read().unwrap().get(name) {
        return existing;
    }

    let mut names = NAMES.write().unwrap();
    // Another thread may have interned it between the locks
    if let Some(&existing) = names.get(name) {
        return existing;
    }

    let leaked: &'static str = String::from(name).leak();
    names.insert(leaked);
    leaked
}

/// A unique identifier for a module (interned name).
///
/// `ModuleId` is Copy; all IDs with the same name share one allocation,
/// so equality is a pointer comparison.
#[derive(Clone, Copy)]
pub struct ModuleId(&'static str);

impl ModuleId {
    /// Create a module ID from a name.
    pub fn new(name: impl AsRef<str>) -> Self {
        ModuleId(intern(name.as_ref()))
    }

    /// Get the module name.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl PartialEq for ModuleId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for ModuleId {}

impl PartialOrd for ModuleId {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModuleId {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(other.0)
    }
}

impl Hash for ModuleId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(s: &str) -> Self {
        ModuleId::new(s)
    }
}

impl From<String> for ModuleId {
    fn from(s: String) -> Self {
        ModuleId::new(s)
    }
}

impl Serialize for ModuleId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ModuleId::new(s))
    }
}

/// Check whether a string is a well-formed module name.
///
/// Names must be non-empty and free of path separators and whitespace,
/// since they double as directory names and map keys.
pub fn is_valid_module_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
