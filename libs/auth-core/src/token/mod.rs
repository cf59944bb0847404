//! Token lifecycle: claims, codec, issuance, verification, refresh.

pub mod claims;
pub mod codec;
pub mod issuer;
pub mod refresh;
pub mod verifier;

pub use claims::{Claims, Identity, TokenUse};
pub use codec::TokenCodec;
pub use issuer::{RotatedPair, TokenIssuer, TokenPair};
pub use refresh::RefreshFlow;
pub use verifier::{TokenVerifier, VerifiedClaims};
