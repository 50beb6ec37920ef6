//! Generates an RSA-2048 key pair and a self-signed X.509 certificate, and
//! stores them under `generated/<token>/`, where the token is derived from the
//! certificate's SHA-1 fingerprint.
//!
//! ```no_run
//! # async fn demo() -> jwkcerts::Result<()> {
//! use jwkcerts::{CertificateGenerator, NativeEngine};
//!
//! let (generated, dir) = CertificateGenerator::new(NativeEngine).run().await?;
//! println!("{} -> {}", generated.fingerprint, dir.display());
//! # Ok(())
//! # }
//! ```

pub mod engine;
mod error;
mod generator;
mod model;

pub use engine::{CryptoEngine, Engine, NativeEngine, OpenSslEngine};
pub use error::{Error, Operation, Result};
pub use generator::{
    derive_directory_token, CertificateGenerator, CERTIFICATE_FILE, DEFAULT_OUTPUT_DIR,
    DEFAULT_TIMEOUT, KEY_BITS, PRIVATE_KEY_FILE, PUBLIC_KEY_FILE,
};
pub use model::{
    Certificate, DirectoryToken, Fingerprint, GeneratedCertificate, KeyPair, PrivateKey,
    PublicKey, Subject,
};
