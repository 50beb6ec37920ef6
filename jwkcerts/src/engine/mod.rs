//! Providers of the cryptographic primitives the generator orchestrates.

use std::future::Future;

use crate::{
    error::Result,
    model::{Certificate, PrivateKey, PublicKey, Subject},
};

mod native;
mod openssl;

pub use native::NativeEngine;
pub use openssl::OpenSslEngine;

/// RSA key generation, public key extraction, self-signed issuance and
/// certificate fingerprinting.
///
/// Every method reports failure as [`crate::Error::EngineInvocation`].
pub trait CryptoEngine: Send + Sync {
    fn generate_private_key(&self, bits: usize) -> impl Future<Output = Result<PrivateKey>> + Send;

    fn derive_public_key(
        &self,
        private_key: &PrivateKey,
    ) -> impl Future<Output = Result<PublicKey>> + Send;

    /// Returns the PEM text of a certificate for `subject`, signed by
    /// `private_key`.
    fn issue_self_signed(
        &self,
        private_key: &PrivateKey,
        subject: &Subject,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Returns a line of the form `SHA1 Fingerprint=AA:BB:...`.
    fn fingerprint(&self, certificate: &Certificate)
        -> impl Future<Output = Result<String>> + Send;
}

/// Engine chosen at runtime.
#[derive(Debug, Clone)]
pub enum Engine {
    Native(NativeEngine),
    OpenSsl(OpenSslEngine),
}

impl Default for Engine {
    fn default() -> Self {
        Self::Native(NativeEngine)
    }
}

impl CryptoEngine for Engine {
    async fn generate_private_key(&self, bits: usize) -> Result<PrivateKey> {
        match self {
            Self::Native(engine) => engine.generate_private_key(bits).await,
            Self::OpenSsl(engine) => engine.generate_private_key(bits).await,
        }
    }

    async fn derive_public_key(&self, private_key: &PrivateKey) -> Result<PublicKey> {
        match self {
            Self::Native(engine) => engine.derive_public_key(private_key).await,
            Self::OpenSsl(engine) => engine.derive_public_key(private_key).await,
        }
    }

    async fn issue_self_signed(&self, private_key: &PrivateKey, subject: &Subject) -> Result<String> {
        match self {
            Self::Native(engine) => engine.issue_self_signed(private_key, subject).await,
            Self::OpenSsl(engine) => engine.issue_self_signed(private_key, subject).await,
        }
    }

    async fn fingerprint(&self, certificate: &Certificate) -> Result<String> {
        match self {
            Self::Native(engine) => engine.fingerprint(certificate).await,
            Self::OpenSsl(engine) => engine.fingerprint(certificate).await,
        }
    }
}
