use git2::{Mailmap, Repository, Signature, Time};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorIdentity {
    pub name: String,
    pub email: String,
    /// Stable grouping key: lower-cased email, or lower-cased name when the
    /// email is empty.
    pub key: String,
}

impl AuthorIdentity {
    fn new(name: String, email: String) -> Self {
        let key = if email.trim().is_empty() {
            name.trim().to_lowercase()
        } else {
            email.trim().to_lowercase()
        };
        Self { name, email, key }
    }
}

/// Maps raw author identities to canonical ones through the repository
/// mailmap. Without a mailmap every identity resolves to itself.
pub struct AuthorResolver {
    mailmap: Option<Mailmap>,
}

impl AuthorResolver {
    /// Load `.mailmap` (and `mailmap.file` / `mailmap.blob` config) for `repo`.
    pub fn from_repo(repo: &Repository) -> Self {
        match repo.mailmap() {
            Ok(mailmap) => Self::with_mailmap(mailmap),
            Err(e) => {
                tracing::debug!("no usable mailmap, author aliasing disabled: {e}");
                Self::identity()
            }
        }
    }

    pub fn identity() -> Self {
        Self { mailmap: None }
    }

    pub fn with_mailmap(mailmap: Mailmap) -> Self {
        Self {
            mailmap: Some(mailmap),
        }
    }

    pub fn resolve(&self, name: &str, email: &str) -> AuthorIdentity {
        if let Some(resolved) = self.lookup(name, email) {
            return resolved;
        }
        AuthorIdentity::new(name.to_string(), email.to_string())
    }

    fn lookup(&self, name: &str, email: &str) -> Option<AuthorIdentity> {
        let mailmap = self.mailmap.as_ref()?;
        let sig = Signature::new(name, email, &Time::new(0, 0)).ok()?;
        let resolved = mailmap.resolve_signature(&sig).ok()?;
        Some(AuthorIdentity::new(
            resolved.name().unwrap_or(name).to_string(),
            resolved.email().unwrap_or(email).to_string(),
        ))
    }
}

#[cfg(test)]
#[path = "authors_test.rs"]
mod tests;
