//! Adapters layer: in-process implementations of the ports.
//!
//! Real deployments bind the ports to a chain RPC client, the vendor FHE
//! SDK, and a browser/hardware wallet. These adapters stand in for all
//! three so the flows can run in tests and local development:
//! - `devnet`: single-node in-memory chain with contract semantics
//! - `fhe_sim`: deterministic FHE simulator (not secure, not homomorphic)
//! - `wallet`: static wallet with a flip-able connection state

mod devnet;
mod fhe_sim;
mod wallet;

pub use devnet::{DevnetChain, DevnetTx};
pub use fhe_sim::SimulatedFhe;
pub use wallet::StaticWallet;
