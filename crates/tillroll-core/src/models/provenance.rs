//! Caller-supplied identity and provenance for parsed receipts.
//!
//! The normalization pipeline never reads the clock or generates ids. The
//! constructors here are conveniences for callers (the CLI, an upload
//! handler) that want the usual defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner id used when an upload carries no user id.
pub const ANONYMOUS_OWNER: &str = "anonymous";

/// Where a document came from and who it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Storage key basename or file name of the source image.
    pub source: String,

    /// Owner of the receipt.
    pub owner_id: String,

    /// When the image was uploaded.
    pub upload_time: DateTime<Utc>,
}

impl Provenance {
    pub fn new(
        source: impl Into<String>,
        owner_id: impl Into<String>,
        upload_time: DateTime<Utc>,
    ) -> Self {
        Self {
            source: source.into(),
            owner_id: owner_id.into(),
            upload_time,
        }
    }

    /// Derive provenance from an object storage key of the form
    /// `{owner}/{name}`.
    ///
    /// The owner is the first path segment and the source is the basename.
    /// Keys with an empty first segment belong to [`ANONYMOUS_OWNER`].
    pub fn from_storage_key(key: &str, upload_time: DateTime<Utc>) -> Self {
        let owner = key.split('/').next().unwrap_or_default();
        let owner = if owner.is_empty() { ANONYMOUS_OWNER } else { owner };
        let source = key.rsplit('/').next().unwrap_or(key);

        Self::new(source, owner, upload_time)
    }
}

/// Opaque identifier for a parsed receipt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptIdentity {
    pub id: String,
}

impl ReceiptIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// A fresh random (v4) identity.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

/// Build the object key an uploaded receipt image is stored under:
/// `{owner}/{YYYYmmddTHHMMSSZ}_{hex}.jpg`.
///
/// [`Provenance::from_storage_key`] recovers `owner` from the result.
pub fn upload_key(owner_id: &str, uploaded_at: DateTime<Utc>, nonce: Uuid) -> String {
    let owner = if owner_id.is_empty() { ANONYMOUS_OWNER } else { owner_id };
    format!(
        "{}/{}_{}.jpg",
        owner,
        uploaded_at.format("%Y%m%dT%H%M%SZ"),
        nonce.simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_from_storage_key() {
        let p = Provenance::from_storage_key("user-42/20240309T140507Z_abc.jpg", at());
        assert_eq!(p.owner_id, "user-42");
        assert_eq!(p.source, "20240309T140507Z_abc.jpg");
        assert_eq!(p.upload_time, at());
    }

    #[test]
    fn test_from_storage_key_without_owner_segment() {
        let p = Provenance::from_storage_key("receipt.jpg", at());
        assert_eq!(p.owner_id, "receipt.jpg");
        assert_eq!(p.source, "receipt.jpg");

        let p = Provenance::from_storage_key("/receipt.jpg", at());
        assert_eq!(p.owner_id, ANONYMOUS_OWNER);
    }

    #[test]
    fn test_upload_key_round_trips_owner() {
        let nonce = Uuid::nil();
        let key = upload_key("alice", at(), nonce);
        assert_eq!(
            key,
            "alice/20240309T140507Z_00000000000000000000000000000000.jpg"
        );

        let p = Provenance::from_storage_key(&key, at());
        assert_eq!(p.owner_id, "alice");
    }

    #[test]
    fn test_upload_key_defaults_owner() {
        let key = upload_key("", at(), Uuid::nil());
        assert!(key.starts_with("anonymous/"));
    }

    #[test]
    fn test_generated_identities_differ() {
        assert_ne!(ReceiptIdentity::generate(), ReceiptIdentity::generate());
    }
}
