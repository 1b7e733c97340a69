//! # Proof-of-Delivery Object Store
//!
//! The binary-object store holding proof-of-delivery images is an external
//! collaborator; [`ProofStore`] is the seam. Upload is a blocking,
//! potentially slow call that must complete — with its resulting reference
//! available — *before* the invoice's status transition commits. On upload
//! failure the invoice stays PENDING and the caller retries.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

/// A proof-of-delivery payload to upload.
#[derive(Debug, Clone)]
pub struct ProofUpload {
    /// MIME type of the payload (e.g. `image/jpeg`).
    pub content_type: String,
    /// Raw payload bytes.
    pub bytes: Vec<u8>,
}

/// Errors from the proof object store.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The payload is empty.
    #[error("empty proof payload")]
    Empty,

    /// The backend refused or failed the upload. Retryable.
    #[error("upload failed: {0}")]
    Upload(String),
}

/// The proof object store seam.
pub trait ProofStore: Send + Sync {
    /// Upload a proof payload, returning an opaque reference URI.
    ///
    /// Blocking; returns only once the payload is durably stored.
    fn put(&self, upload: ProofUpload) -> Result<String, ProofError>;
}

/// In-memory proof store for tests and embedding.
#[derive(Default)]
pub struct InMemoryProofStore {
    objects: RwLock<HashMap<String, ProofUpload>>,
}

impl InMemoryProofStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of proofs currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Whether `proof_ref` points at a stored proof.
    pub fn contains(&self, proof_ref: &str) -> bool {
        self.objects
            .read()
            .expect("lock poisoned")
            .contains_key(proof_ref)
    }
}

impl ProofStore for InMemoryProofStore {
    fn put(&self, upload: ProofUpload) -> Result<String, ProofError> {
        if upload.bytes.is_empty() {
            return Err(ProofError::Empty);
        }
        let proof_ref = format!("mem://proofs/{}", uuid::Uuid::new_v4());
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(proof_ref.clone(), upload);
        Ok(proof_ref)
    }
}
