use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use futures_util::{try_join, TryFutureExt};
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::{
    engine::CryptoEngine,
    error::{Error, Operation, Result},
    model::{
        Certificate, DirectoryToken, Fingerprint, GeneratedCertificate, KeyPair, PrivateKey,
        PublicKey, Subject,
    },
};

pub const KEY_BITS: usize = 2048;
pub const DEFAULT_OUTPUT_DIR: &str = "generated";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const PUBLIC_KEY_FILE: &str = "public.pem";
pub const PRIVATE_KEY_FILE: &str = "private.pem";
pub const CERTIFICATE_FILE: &str = "x509.cert";

/// Creates an RSA key pair and a self-signed certificate, then stores them
/// under a directory named after the certificate fingerprint.
pub struct CertificateGenerator<E> {
    engine: E,
    subject: Subject,
    output_dir: PathBuf,
    timeout: Duration,
}

impl<E: CryptoEngine> CertificateGenerator<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            subject: Subject::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Directory in which per-certificate directories are created.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Upper bound for each individual engine call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    async fn bounded<T>(&self, op: Operation, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| Error::engine(op, format!("timed out after {:?}", self.timeout)))?
    }

    pub async fn generate_private_key(&self) -> Result<PrivateKey> {
        self.bounded(
            Operation::GeneratePrivateKey,
            self.engine.generate_private_key(KEY_BITS),
        )
        .await
    }

    pub async fn derive_public_key(&self, private_key: &PrivateKey) -> Result<PublicKey> {
        self.bounded(
            Operation::DerivePublicKey,
            self.engine.derive_public_key(private_key),
        )
        .await
    }

    pub async fn issue_self_signed_certificate(
        &self,
        private_key: &PrivateKey,
    ) -> Result<Certificate> {
        let pem = self
            .bounded(
                Operation::IssueCertificate,
                self.engine.issue_self_signed(private_key, &self.subject),
            )
            .await?;
        Certificate::from_pem(pem)
    }

    pub async fn compute_fingerprint(&self, certificate: &Certificate) -> Result<Fingerprint> {
        let output = self
            .bounded(
                Operation::ComputeFingerprint,
                self.engine.fingerprint(certificate),
            )
            .await?;
        Fingerprint::parse(&output)
    }

    /// Creates `<output_dir>/<token>` and writes the three output files into
    /// it. Fails if that directory already exists; nothing is rolled back if
    /// a later write fails.
    pub async fn persist(&self, generated: &GeneratedCertificate) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| Error::filesystem(&self.output_dir, e))?;

        let dir = self.output_dir.join(generated.token.as_str());
        fs::create_dir(&dir).await.map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::DirectoryExists(dir.clone()),
            _ => Error::filesystem(&dir, e),
        })?;

        info!("Writing to {}", dir.display());
        for (name, contents) in [
            (PUBLIC_KEY_FILE, generated.key_pair.public_key.as_pem()),
            (PRIVATE_KEY_FILE, generated.key_pair.private_key.as_pem()),
            (CERTIFICATE_FILE, generated.certificate.as_pem()),
        ] {
            let path = dir.join(name);
            fs::write(&path, contents)
                .await
                .map_err(|e| Error::filesystem(&path, e))?;
        }
        Ok(dir)
    }

    /// Runs the whole pipeline once and returns what was generated together
    /// with the directory it was written to.
    #[instrument(skip_all, fields(output_dir = %self.output_dir.display()))]
    pub async fn run(&self) -> Result<(GeneratedCertificate, PathBuf)> {
        let private_key = self.generate_private_key().await?;
        debug!("Generated private key");

        // Fingerprinting only needs the certificate, so it does not wait for
        // the public key.
        let (public_key, (certificate, fingerprint)) = try_join!(
            self.derive_public_key(&private_key),
            self.issue_self_signed_certificate(&private_key)
                .and_then(|certificate| async move {
                    let fingerprint = self.compute_fingerprint(&certificate).await?;
                    Ok::<_, Error>((certificate, fingerprint))
                }),
        )?;
        debug!(%fingerprint, "Certificate issued");

        let token = derive_directory_token(&fingerprint);
        let generated = GeneratedCertificate {
            key_pair: KeyPair {
                private_key,
                public_key,
            },
            certificate,
            fingerprint,
            token,
        };
        let dir = self.persist(&generated).await?;
        Ok((generated, dir))
    }
}

pub fn derive_directory_token(fingerprint: &Fingerprint) -> DirectoryToken {
    DirectoryToken::from(fingerprint)
}
