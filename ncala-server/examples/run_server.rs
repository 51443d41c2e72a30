//! Example to run the NCALA server standalone
//!
//! Run with: cargo run -p ncala-server --example run_server

use ncala_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig {
        port: 3000,
        static_dir: "public".to_string(),
        base_path: String::new(),
    };

    println!("Starting NCALA server on port {}", config.port);
    println!("Static files from: {}", config.static_dir);
    println!("Socket endpoint ws://localhost:{}/ws", config.port);

    run_server(config).await
}
