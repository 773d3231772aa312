// lib.rs - nestloader library root

//! # nestloader - NeST subnetwork loader for NDEx
//!
//! Extracts the molecular assemblies of the NeST map (Nested Systems in
//! Tumors) and publishes one interaction subnetwork per assembly on NDEx.
//!
//! The pipeline is a single pass:
//!
//! 1. download the NeST model (CX2) from NDEx
//! 2. load the IAS interaction-score table (TSV, local file or URL)
//! 3. for every assembly node below the size cutoff, build a network with
//!    one node per gene and one edge per gene pair found in the score table
//! 4. style and annotate each network, then create or update it on the
//!    configured NDEx account
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use nestloader::prelude::*;
//!
//! let args = Args {
//!     nest: nestloader::loader::DEFAULT_NEST_UUID.to_string(),
//!     ias_score: "/data/IAS_score.tsv".to_string(),
//!     maxsize: 100,
//!     conf: None,
//!     profile: "ndexnestloader".to_string(),
//!     visibility: "PUBLIC".to_string(),
//!     dryrun: true,
//! };
//! let validated = validate_args(&args)?;
//! let mut loader = NestLoader::new(&args, validated);
//! loader.run()?;
//! # Ok::<(), String>(())
//! ```

pub mod cli;
pub mod config;
pub mod cx2;
pub mod ias;
pub mod loader;
pub mod ndex;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::config::NdexCredentials;
    pub use crate::cx2::{Cx2Network, NestStyle};
    pub use crate::ias::IasScoreMap;
    pub use crate::loader::NestLoader;
    pub use crate::ndex::NdexClient;
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use cx2::Cx2Network;
pub use ias::IasScoreMap;
pub use loader::NestLoader;
pub use ndex::NdexClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!("nestloader v{} - NeST subnetwork loader for NDEx", VERSION)
}
