//! Command implementations for the drain CLI

pub mod mine;
pub mod show;
pub mod tail;

use std::path::Path;

use anyhow::{Context, Result, bail};
use tokio::signal;

/// Wait for Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never fires; the other one still does.
pub(crate) async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Whether stdout output should be colored
pub(crate) fn use_color(no_color: bool) -> bool {
    !no_color && atty::is(atty::Stream::Stdout)
}

/// Fail early on paths that cannot be tailed
pub(crate) fn check_files(files: &[impl AsRef<Path>]) -> Result<()> {
    for path in files {
        let path = path.as_ref();
        let meta = std::fs::metadata(path)
            .with_context(|| format!("cannot open '{}'", path.display()))?;
        if !meta.is_file() {
            bail!("'{}' is not a regular file", path.display());
        }
    }
    Ok(())
}
