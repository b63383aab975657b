//! adfp Server - HTTP REST API for competitor ad image comparison
//!
//! Exposes the `compare` orchestrator over HTTP: fetch up to ten competitor
//! image URLs, fingerprint them, and report how close they are to each other
//! and to the creatives generated for a campaign.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public Endpoints (No Authentication)
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe (reference store present)
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Protected Endpoints (API Key Required)
//!
//! - `POST /api/v1/images/compare` - Fingerprint and compare competitor images
//! - `POST /api/v1/images/distance` - Distance between two hex fingerprints
//!
//! Keys go in `X-API-Key` or `Authorization: Bearer <key>`.

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
