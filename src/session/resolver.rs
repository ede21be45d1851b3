//! Session identity resolution and recovery

use crate::error::SessionError;
use crate::session::identity::{ClientId, SessionData};
use crate::storage::StorageLocator;
use log::{info, warn};

/// Returns the session's client id, creating one if the session has none.
pub fn resolve_identity(session: &mut SessionData) -> ClientId {
    if let Some(id) = &session.client_id {
        return id.clone();
    }

    let id = ClientId::generate();
    info!("New client created: {}", id);
    session.client_id = Some(id.clone());
    id
}

/// Switches the session to an existing client id.
///
/// The candidate must be exactly [`ClientId::LEN`] characters and a storage
/// root must already exist for it. On failure the session is left as it was.
pub async fn recover_identity(
    session: &mut SessionData,
    locator: &StorageLocator,
    candidate: &str,
) -> Result<ClientId, SessionError> {
    let id = ClientId::parse(candidate)?;

    if !locator.root_exists(&id).await {
        warn!("Session recovery refused, no storage for {:?}", candidate);
        return Err(SessionError::InvalidClientId(candidate.to_string()));
    }

    info!("Session recovered for client {}", id);
    session.client_id = Some(id.clone());
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resolve_creates_identity_once() {
        let mut session = SessionData::default();
        let first = resolve_identity(&mut session);
        let second = resolve_identity(&mut session);
        assert_eq!(first, second);
        assert_eq!(session.client_id, Some(first));
    }

    #[tokio::test]
    async fn recover_rejects_unknown_id_and_keeps_session() {
        let dir = tempdir().unwrap();
        let locator = StorageLocator::new(dir.path());
        let mut session = SessionData::default();
        let original = resolve_identity(&mut session);

        let result = recover_identity(&mut session, &locator, "deadbeef").await;
        assert!(result.is_err());
        assert_eq!(session.client_id, Some(original));
    }

    #[tokio::test]
    async fn recover_rejects_wrong_length_without_creating_identity() {
        let dir = tempdir().unwrap();
        let locator = StorageLocator::new(dir.path());
        let mut session = SessionData::default();

        assert!(recover_identity(&mut session, &locator, "short").await.is_err());
        assert!(session.client_id.is_none());
    }

    #[tokio::test]
    async fn recover_accepts_existing_root() {
        let dir = tempdir().unwrap();
        let locator = StorageLocator::new(dir.path());
        let existing = ClientId::parse("cafe0123").unwrap();
        locator.client_root(&existing).await.unwrap();

        let mut session = SessionData::default();
        resolve_identity(&mut session);
        let recovered = recover_identity(&mut session, &locator, "cafe0123")
            .await
            .unwrap();
        assert_eq!(recovered, existing);
        assert_eq!(session.client_id, Some(existing));
    }
}
