//! Shared authentication and authorization core for task-platform services.
//!
//! Every service consumes this crate instead of keeping its own copy of the
//! token pipeline. The issuing service uses the full surface; everything
//! else uses the verify-only half:
//!
//! - [`keys`]: PEM key material (private half stays with the issuer)
//! - [`token::codec`]: pure signed-token encode/decode
//! - [`token::issuer`]: access/refresh pair issuance and rotation
//! - [`revocation`]: shared revocation list, checked on every request
//! - [`token::verifier`]: signature, then expiry, then revocation
//! - [`authz`]: memoized board/table/task access decisions
//! - [`filter`]: bearer extraction for HTTP and WebSocket pipelines

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authz;
pub mod config;
pub mod error;
pub mod filter;
pub mod keys;
pub mod metrics;
pub mod revocation;
pub mod token;

// Re-exports for convenience
pub use authz::{AccessDecision, AccessResolver, AclLoader, ResourceAcl};
pub use config::AuthConfig;
pub use error::{AuthError, RejectionKind};
pub use keys::{JwtAlgorithm, SigningKeys, VerifyingKeys};
pub use revocation::{RevocationRecord, RevocationStore};
pub use token::{
    Claims, Identity, RefreshFlow, TokenIssuer, TokenPair, TokenUse, TokenVerifier, VerifiedClaims,
};
