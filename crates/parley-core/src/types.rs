use serde::{Deserialize, Serialize};

/// Information about the person using the system, exposed read-only to
/// action handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub surname: String,
    pub name: String,
    pub nicknames: Vec<String>,
    pub age: Option<u32>,
    pub email: String,
    pub address: String,
}

impl UserInfo {
    /// The name a handler should address the user with: the first nickname if
    /// any, else the given name.
    pub fn preferred_name(&self) -> &str {
        self.nicknames
            .first()
            .map(String::as_str)
            .unwrap_or(self.name.as_str())
    }
}
