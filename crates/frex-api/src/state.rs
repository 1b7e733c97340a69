//! # Application State
//!
//! Shared state for the Axum application: the authorization guard, the auth
//! service, the three fulfillment engines, and the read-side store handles.
//! Handlers hold no business logic — they authorize, delegate to the state's
//! services, and map errors.

use std::sync::Arc;

use frex_auth::{AuthService, AuthorizationGuard, TokenService};
use frex_fulfillment::{
    InMemoryProofStore, InvoiceResolutionEngine, ProofStore, ShipmentCompletionEvaluator,
    ShipmentRegistry,
};
use frex_store::{InMemoryStore, InvoiceStore, ShipmentStore};

use crate::config::AppConfig;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Bearer-token verification and role predicates.
    pub guard: Arc<AuthorizationGuard>,
    /// Login and registration flows.
    pub auth: Arc<AuthService>,
    /// Shipment + invoice creation.
    pub registry: Arc<ShipmentRegistry>,
    /// Invoice resolution.
    pub resolution: Arc<InvoiceResolutionEngine>,
    /// Shipment finalization (automatic and manual).
    pub completion: Arc<ShipmentCompletionEvaluator>,
    /// Shipment read access for listing routes.
    pub shipments: Arc<dyn ShipmentStore>,
    /// Invoice read access for listing routes.
    pub invoices: Arc<dyn InvoiceStore>,
    /// Proof-of-delivery object store.
    pub proofs: Arc<dyn ProofStore>,
}

impl AppState {
    /// Wire the full service graph over the in-memory store.
    pub fn in_memory(config: &AppConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let tokens = TokenService::new(config.token_secret.clone());

        let guard = Arc::new(AuthorizationGuard::new(tokens.clone()));
        let auth = Arc::new(AuthService::new(store.clone(), tokens, config.ttls));

        let registry = Arc::new(ShipmentRegistry::new(store.clone()));
        let completion = Arc::new(ShipmentCompletionEvaluator::new(
            store.clone(),
            store.clone(),
        ));
        let resolution = Arc::new(InvoiceResolutionEngine::new(
            store.clone(),
            store.clone(),
            completion.clone(),
        ));

        Self {
            guard,
            auth,
            registry,
            resolution,
            completion,
            shipments: store.clone(),
            invoices: store,
            proofs: Arc::new(InMemoryProofStore::new()),
        }
    }
}
