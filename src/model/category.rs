use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A category assigned to a transaction, e.g. `{ "name": "Groceries", "icon": "🛒" }`.
///
/// This is also the exact shape the inference service is asked to return.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Category {
    name: String,
    /// A short string, usually a single emoji.
    icon: String,
}

impl Category {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.icon.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.icon, self.name)
        }
    }
}
