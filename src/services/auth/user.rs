use async_trait::async_trait;
use serde::Serialize;

use crate::repos::user_repo::RepoError;

/// The principal behind a token's `sub`, as the host application knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl User {
    pub fn from_subject(subject: impl Into<String>) -> Self {
        Self {
            id: subject.into(),
            user_name: None,
            image_url: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UserResolveError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Resolves a subject to a user. Supplied by the host application.
///
/// `Ok(None)` means "no such user"; the request is still authenticated.
#[async_trait]
pub trait UserResolver: Send + Sync {
    async fn resolve(&self, subject: &str) -> Result<Option<User>, UserResolveError>;
}

/// Fallback when no user store is configured: the user is just the subject id.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectUserResolver;

#[async_trait]
impl UserResolver for SubjectUserResolver {
    async fn resolve(&self, subject: &str) -> Result<Option<User>, UserResolveError> {
        Ok(Some(User::from_subject(subject)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subject_resolver_echoes_the_subject() {
        let user = SubjectUserResolver.resolve("user-1").await.unwrap();
        assert_eq!(user, Some(User::from_subject("user-1")));
    }

    #[test]
    fn absent_profile_fields_are_not_serialized() {
        let json = serde_json::to_value(User::from_subject("user-1")).unwrap();
        assert_eq!(json, serde_json::json!({"id": "user-1"}));
    }
}
