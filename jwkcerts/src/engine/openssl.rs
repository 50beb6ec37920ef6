use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, instrument};

use super::CryptoEngine;
use crate::{
    error::{Error, Operation, Result},
    model::{Certificate, PrivateKey, PublicKey, Subject},
};

/// Engine that drives an `openssl` executable.
///
/// Key material is only ever passed on stdin.
#[derive(Debug, Clone)]
pub struct OpenSslEngine {
    program: PathBuf,
}

impl Default for OpenSslEngine {
    fn default() -> Self {
        Self::new("openssl")
    }
}

impl OpenSslEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    #[instrument(skip(self, stdin), fields(program = %self.program.display()))]
    async fn invoke(&self, op: Operation, args: &[&str], stdin: Option<&str>) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::engine(op, format!("cannot run {}: {e}", self.program.display())))?;

        let input = child.stdin.take();
        let feed = async move {
            if let (Some(mut pipe), Some(data)) = (input, stdin) {
                pipe.write_all(data.as_bytes()).await?;
                pipe.shutdown().await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| Error::engine(op, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::engine(
                op,
                format!("{} ({})", stderr.trim(), output.status),
            ));
        }
        // A child that exits successfully without draining stdin is fine.
        if let Err(e) = fed {
            debug!("stdin closed early: {e}");
        }

        String::from_utf8(output.stdout)
            .map_err(|_| Error::engine(op, "output is not valid UTF-8"))
    }
}

impl CryptoEngine for OpenSslEngine {
    async fn generate_private_key(&self, bits: usize) -> Result<PrivateKey> {
        let bits = bits.to_string();
        let pem = self
            .invoke(Operation::GeneratePrivateKey, &["genrsa", &bits], None)
            .await?;
        Ok(PrivateKey::from_pem(pem))
    }

    async fn derive_public_key(&self, private_key: &PrivateKey) -> Result<PublicKey> {
        let pem = self
            .invoke(
                Operation::DerivePublicKey,
                &["rsa", "-RSAPublicKey_out"],
                Some(private_key.as_pem()),
            )
            .await?;
        Ok(PublicKey::from_pem(pem))
    }

    async fn issue_self_signed(&self, private_key: &PrivateKey, subject: &Subject) -> Result<String> {
        let subj = subject.to_openssl_arg();
        self.invoke(
            Operation::IssueCertificate,
            &["req", "-new", "-x509", "-subj", &subj, "-key", "/dev/stdin"],
            Some(private_key.as_pem()),
        )
        .await
    }

    async fn fingerprint(&self, certificate: &Certificate) -> Result<String> {
        self.invoke(
            Operation::ComputeFingerprint,
            &["x509", "-noout", "-fingerprint"],
            Some(certificate.as_pem()),
        )
        .await
    }
}
