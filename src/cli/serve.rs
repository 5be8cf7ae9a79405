//! HTTP API server command

use illustcoach_core::{
    api::{ApiServer, ApiServerConfig},
    error::Result,
};
use std::net::SocketAddr;
use tracing::{debug, warn};

use super::helpers::{build_session, load_config, GlobalOptions};

/// Handle API server startup command
pub async fn handle(opts: &GlobalOptions, addr: Option<String>) -> Result<()> {
    debug!("Starting HTTP API server...");

    let mut config = load_config(opts)?;
    if let Some(addr) = addr {
        config.listen_addr = addr
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("Invalid address '{}': {}", addr, e))?;
    }
    if !config.has_api_key() {
        warn!("No API key configured; /evaluate will answer 412 until one is set");
    }

    let server_config = ApiServerConfig::from(&config);
    let db_path = config.db_path.clone();
    let session = build_session(config)?;

    println!();
    println!("🎨 Illustcoach API Server");
    println!();
    println!("   Address:  http://{}", server_config.addr);
    println!("   Database: {}", db_path.display());
    println!();
    println!("   Endpoints:");
    println!("   - GET  /health        - Health check");
    println!("   - GET  /modes         - Evaluation modes");
    println!("   - POST /evaluate      - Evaluate an illustration");
    println!("   - GET  /history       - Past evaluations, newest first");
    println!("   - GET  /history/trend - Score trend");
    println!();

    ApiServer::new(server_config, session).serve().await?;
    Ok(())
}
