use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(
            std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        ))
        .init();

    let config = config::Config::load("jwkcerts.toml")?;
    let generator = config.generator();

    let (generated, dir) = generator
        .run()
        .await
        .context("Failed to generate certificate")?;
    info!(
        fingerprint = %generated.fingerprint,
        "Wrote {}",
        dir.display()
    );

    Ok(())
}

/// Uses the `RUST_LOG` directives when they parse, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn honours_rust_log() {
        assert_eq!(
            log_filter(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            log_filter(Some("warn")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }
}
