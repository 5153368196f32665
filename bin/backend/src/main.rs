//! Game Server Binary
//!
//! Hosts rock-paper-scissors games over WebSocket on BIND_ADDR
//! (e.g. 0.0.0.0:8888), persisting to DB_URL when set.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rps_core::log();
    rps_core::kys();
    rps_hosting::run().await
}
