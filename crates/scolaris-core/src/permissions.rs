//! Permission tokens of the form `section:action`.
//!
//! A role owns one or more permission sets; the permissions of a user are the
//! union of every set attached to their role. Checks are plain set
//! membership on the token string.
//!
//! # Example
//!
//! ```ignore
//! use scolaris_core::permissions::{self, PermissionSet};
//!
//! let mut set = PermissionSet::from_tokens(["grade:read", "grade:create"]);
//! assert!(set.has("grade", "read"));
//! assert!(set.has_any(&[permissions::GRADE_DELETE, permissions::GRADE_CREATE]));
//! set.add("grade:update")?;
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const ACTIONS: [&str; 4] = ["create", "read", "update", "delete"];

pub const SECTIONS: [&str; 17] = [
    "user",
    "role",
    "permission",
    "filiere",
    "niveau",
    "groupe",
    "module",
    "room",
    "event",
    "attendance",
    "session",
    "grade",
    "absence",
    "bulletin",
    "document",
    "resource",
    "opportunity",
];

pub const USER_READ: &str = "user:read";
pub const USER_UPDATE: &str = "user:update";
pub const USER_DELETE: &str = "user:delete";

pub const ROLE_CREATE: &str = "role:create";
pub const ROLE_READ: &str = "role:read";
pub const ROLE_UPDATE: &str = "role:update";
pub const ROLE_DELETE: &str = "role:delete";

pub const PERMISSION_CREATE: &str = "permission:create";
pub const PERMISSION_READ: &str = "permission:read";
pub const PERMISSION_UPDATE: &str = "permission:update";
pub const PERMISSION_DELETE: &str = "permission:delete";

pub const FILIERE_CREATE: &str = "filiere:create";
pub const FILIERE_READ: &str = "filiere:read";
pub const FILIERE_UPDATE: &str = "filiere:update";
pub const FILIERE_DELETE: &str = "filiere:delete";

pub const NIVEAU_CREATE: &str = "niveau:create";
pub const NIVEAU_READ: &str = "niveau:read";
pub const NIVEAU_UPDATE: &str = "niveau:update";
pub const NIVEAU_DELETE: &str = "niveau:delete";

pub const GROUPE_CREATE: &str = "groupe:create";
pub const GROUPE_READ: &str = "groupe:read";
pub const GROUPE_UPDATE: &str = "groupe:update";
pub const GROUPE_DELETE: &str = "groupe:delete";

pub const MODULE_CREATE: &str = "module:create";
pub const MODULE_READ: &str = "module:read";
pub const MODULE_UPDATE: &str = "module:update";
pub const MODULE_DELETE: &str = "module:delete";

pub const ROOM_CREATE: &str = "room:create";
pub const ROOM_READ: &str = "room:read";
pub const ROOM_UPDATE: &str = "room:update";
pub const ROOM_DELETE: &str = "room:delete";

pub const EVENT_CREATE: &str = "event:create";
pub const EVENT_READ: &str = "event:read";
pub const EVENT_UPDATE: &str = "event:update";
pub const EVENT_DELETE: &str = "event:delete";

pub const ATTENDANCE_CREATE: &str = "attendance:create";
pub const ATTENDANCE_READ: &str = "attendance:read";
pub const ATTENDANCE_UPDATE: &str = "attendance:update";
pub const ATTENDANCE_DELETE: &str = "attendance:delete";

pub const SESSION_CREATE: &str = "session:create";
pub const SESSION_READ: &str = "session:read";
pub const SESSION_UPDATE: &str = "session:update";
pub const SESSION_DELETE: &str = "session:delete";

pub const GRADE_CREATE: &str = "grade:create";
pub const GRADE_READ: &str = "grade:read";
pub const GRADE_UPDATE: &str = "grade:update";
pub const GRADE_DELETE: &str = "grade:delete";

pub const ABSENCE_CREATE: &str = "absence:create";
pub const ABSENCE_READ: &str = "absence:read";
pub const ABSENCE_UPDATE: &str = "absence:update";
pub const ABSENCE_DELETE: &str = "absence:delete";

pub const BULLETIN_READ: &str = "bulletin:read";

pub const DOCUMENT_CREATE: &str = "document:create";
pub const DOCUMENT_READ: &str = "document:read";
pub const DOCUMENT_UPDATE: &str = "document:update";
pub const DOCUMENT_DELETE: &str = "document:delete";

pub const RESOURCE_CREATE: &str = "resource:create";
pub const RESOURCE_READ: &str = "resource:read";
pub const RESOURCE_UPDATE: &str = "resource:update";
pub const RESOURCE_DELETE: &str = "resource:delete";

pub const OPPORTUNITY_CREATE: &str = "opportunity:create";
pub const OPPORTUNITY_UPDATE: &str = "opportunity:update";
pub const OPPORTUNITY_DELETE: &str = "opportunity:delete";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPermission(pub String);

impl fmt::Display for InvalidPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid permission format: {}", self.0)
    }
}

impl std::error::Error for InvalidPermission {}

/// A parsed `section:action` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission<'a> {
    pub section: &'a str,
    pub action: &'a str,
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c == '_')
}

impl<'a> Permission<'a> {
    pub fn parse(token: &'a str) -> Result<Self, InvalidPermission> {
        let mut parts = token.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(section), Some(action), None)
                if is_valid_part(section) && is_valid_part(action) =>
            {
                Ok(Self { section, action })
            }
            _ => Err(InvalidPermission(token.to_string())),
        }
    }
}

pub fn is_valid_token(token: &str) -> bool {
    Permission::parse(token).is_ok()
}

/// Validates every token and returns them sorted and deduplicated.
pub fn normalize_tokens<I, S>(tokens: I) -> Result<Vec<String>, InvalidPermission>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = BTreeSet::new();
    for token in tokens {
        let token = token.as_ref().trim();
        Permission::parse(token)?;
        set.insert(token.to_string());
    }
    Ok(set.into_iter().collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionMode {
    #[default]
    Any,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    tokens: BTreeSet<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from trusted tokens, silently dropping malformed entries.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| is_valid_token(t))
            .collect();
        Self { tokens }
    }

    /// Union with another collection of tokens.
    pub fn merge<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tokens.extend(Self::from_tokens(tokens).tokens);
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn has(&self, section: &str, action: &str) -> bool {
        self.contains(&format!("{}:{}", section, action))
    }

    pub fn has_any(&self, tokens: &[&str]) -> bool {
        tokens.iter().any(|t| self.contains(t))
    }

    pub fn has_all(&self, tokens: &[&str]) -> bool {
        tokens.iter().all(|t| self.contains(t))
    }

    pub fn check(&self, required: &[&str], mode: PermissionMode) -> bool {
        match mode {
            PermissionMode::Any => self.has_any(required),
            PermissionMode::All => self.has_all(required),
        }
    }

    /// Returns `Ok(true)` when the token was newly inserted.
    pub fn add(&mut self, token: &str) -> Result<bool, InvalidPermission> {
        let token = token.trim();
        Permission::parse(token)?;
        Ok(self.tokens.insert(token.to_string()))
    }

    /// Returns `true` when the token was present.
    pub fn remove(&mut self, token: &str) -> bool {
        self.tokens.remove(token.trim())
    }

    pub fn by_section(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for token in &self.tokens {
            if let Ok(p) = Permission::parse(token) {
                map.entry(p.section.to_string())
                    .or_default()
                    .push(p.action.to_string());
            }
        }
        map
    }

    pub fn has_section_access(&self, section: &str) -> bool {
        self.tokens
            .iter()
            .filter_map(|t| Permission::parse(t).ok())
            .any(|p| p.section == section)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tokens.into_iter().collect()
    }
}

fn crud(section: &str) -> impl Iterator<Item = String> + '_ {
    ACTIONS.iter().map(move |a| format!("{}:{}", section, a))
}

/// Every token known to the API.
pub fn admin_permissions() -> Vec<String> {
    SECTIONS.iter().flat_map(|s| crud(s)).collect()
}

pub fn teacher_permissions() -> Vec<String> {
    let mut tokens: Vec<String> = ["session", "grade", "absence", "attendance"]
        .iter()
        .flat_map(|s| crud(s))
        .collect();
    tokens.extend(
        [
            USER_READ,
            FILIERE_READ,
            NIVEAU_READ,
            GROUPE_READ,
            MODULE_READ,
            ROOM_READ,
            EVENT_READ,
            BULLETIN_READ,
            DOCUMENT_CREATE,
            DOCUMENT_READ,
            RESOURCE_CREATE,
            RESOURCE_READ,
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    tokens
}

pub fn student_permissions() -> Vec<String> {
    [
        FILIERE_READ,
        NIVEAU_READ,
        GROUPE_READ,
        MODULE_READ,
        ROOM_READ,
        EVENT_READ,
        SESSION_READ,
        DOCUMENT_READ,
        RESOURCE_READ,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
