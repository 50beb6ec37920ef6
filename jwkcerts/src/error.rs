use std::{fmt, io, path::PathBuf};

/// The engine capability that was being exercised when a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GeneratePrivateKey,
    DerivePublicKey,
    IssueCertificate,
    ComputeFingerprint,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GeneratePrivateKey => "private key generation",
            Self::DerivePublicKey => "public key derivation",
            Self::IssueCertificate => "certificate issuance",
            Self::ComputeFingerprint => "fingerprint computation",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{operation} failed: {detail}")]
    EngineInvocation { operation: Operation, detail: String },
    #[error("unexpected engine output: {0}")]
    Parse(String),
    #[error("output directory {} already exists", .0.display())]
    DirectoryExists(PathBuf),
    #[error("failed to write {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn engine(operation: Operation, detail: impl fmt::Display) -> Self {
        Self::EngineInvocation {
            operation,
            detail: detail.to_string(),
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
