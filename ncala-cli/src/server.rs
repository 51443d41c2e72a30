//! Server command - start the match server
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to ncala-server crate)
//! - Level 4: configuration validation

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use ncala_server::{normalize_base_path, run_server, ServerConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ServerArgs {
    /// Port number to listen on
    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Path prefix to mount the app under, e.g. /ncala
    #[arg(long, env = "BASE_PATH", default_value = "")]
    pub base_path: String,

    /// Directory containing the browser client's static files
    #[arg(long, default_value = "public")]
    pub static_dir: PathBuf,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
///
/// 1. Configure server
/// 2. Start server (blocking)
pub fn run(args: ServerArgs) -> Result<()> {
    let config = configure_server(&args)?;

    tracing::info!("Starting NCALA match server on port {}", config.port);

    start_server(config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Configure server from command arguments
fn configure_server(args: &ServerArgs) -> Result<ServerConfig> {
    validate_static_dir(&args.static_dir)?;

    Ok(ServerConfig {
        port: args.port,
        static_dir: args.static_dir.to_string_lossy().to_string(),
        base_path: normalize_base_path(&args.base_path),
    })
}

/// Start the server (blocking)
fn start_server(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config).await })
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Validate that static directory exists
fn validate_static_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tracing::warn!(
            "Static directory does not exist: {}. Server will start but may not serve files.",
            path.display()
        );
    } else if !path.is_dir() {
        anyhow::bail!(
            "Static path exists but is not a directory: {}",
            path.display()
        );
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_server_normalizes_base_path() {
        let args = ServerArgs {
            port: 3000,
            base_path: "ncala/".to_string(),
            static_dir: PathBuf::from("test_static"),
        };

        let config = configure_server(&args).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_path, "/ncala");
        assert_eq!(config.static_dir, "test_static");
    }

    #[test]
    fn test_validate_static_dir_nonexistent() {
        // Should not error, just warn
        let result = validate_static_dir(Path::new("/nonexistent/path"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_static_path_must_be_a_directory() {
        let result = validate_static_dir(Path::new("Cargo.toml"));
        assert!(result.is_err());
    }
}
