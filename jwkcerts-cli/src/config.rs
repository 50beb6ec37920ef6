use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use jwkcerts::{CertificateGenerator, Engine, NativeEngine, OpenSslEngine};
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};

#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineConfig {
    #[default]
    Native,
    Openssl {
        #[serde(default = "default_program")]
        program: PathBuf,
    },
}

impl EngineConfig {
    fn engine(&self) -> Engine {
        match self {
            Self::Native => Engine::Native(NativeEngine),
            Self::Openssl { program } => Engine::OpenSsl(OpenSslEngine::new(program)),
        }
    }
}

#[serde_as]
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    output_dir: PathBuf,
    #[serde_as(as = "DurationSeconds<u64>")]
    timeout: Duration,
    engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(jwkcerts::DEFAULT_OUTPUT_DIR),
            timeout: jwkcerts::DEFAULT_TIMEOUT,
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    /// Reads the configuration file, falling back to defaults when it does
    /// not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).context("Failed to parse configuration file"),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).context("Failed to read configuration file"),
        }
    }

    pub fn generator(&self) -> CertificateGenerator<Engine> {
        CertificateGenerator::new(self.engine.engine())
            .with_output_dir(&self.output_dir)
            .with_timeout(self.timeout)
    }
}

fn default_program() -> PathBuf {
    PathBuf::from("openssl")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = toml::from_str::<Config>("").unwrap();
        assert_eq!(config.output_dir, Path::new("generated"));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.engine, EngineConfig::Native);
    }

    #[test]
    fn parses_openssl_engine() {
        let config = toml::from_str::<Config>(
            r#"
            output_dir = "out"
            timeout = 5

            [engine]
            type = "openssl"
            program = "/usr/local/bin/openssl"
            "#,
        )
        .unwrap();
        assert_eq!(config.output_dir, Path::new("out"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(
            config.engine,
            EngineConfig::Openssl {
                program: PathBuf::from("/usr/local/bin/openssl")
            }
        );

        let generator = config.generator();
        assert_eq!(generator.output_dir(), Path::new("out"));
        match generator.engine() {
            Engine::OpenSsl(engine) => {
                assert_eq!(engine.program(), Path::new("/usr/local/bin/openssl"))
            }
            other => panic!("unexpected engine: {other:?}"),
        }
    }

    #[test]
    fn openssl_program_defaults_to_path_lookup() {
        let config = toml::from_str::<Config>("engine = { type = \"openssl\" }").unwrap();
        assert_eq!(
            config.engine,
            EngineConfig::Openssl {
                program: PathBuf::from("openssl")
            }
        );
    }

    #[test]
    fn rejects_unknown_engine() {
        assert!(toml::from_str::<Config>("engine = { type = \"gpg\" }").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/jwkcerts.toml").unwrap();
        assert_eq!(config.engine, EngineConfig::Native);
    }
}
