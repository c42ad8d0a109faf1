//! Typed async client for the Tezos node RPC endpoints that expose contracts
//! and big-map storage.
//!
//! Each query formats one path under `chains/main/blocks/{block}/context`,
//! issues a GET through a [`Transport`] and decodes the JSON response.
//!
//! # Features
//!
//! - **`types` and `micheline` modules**: addresses, hashes, block references
//!   and Micheline expression trees. Available with no additional features.
//! - **`client` feature** (enabled by default): [`HttpTransport`], a
//!   `reqwest` based transport, and ready made [`ContractQueryClient`]
//!   constructors for public networks.
//!
//! # Quick start
//!
//! ```no_run
//! use tezos_contracts_rpc::{BlockId, ContractQueryClient};
//!
//! #[tokio::main]
//! async fn main() -> tezos_contracts_rpc::client::Result<()> {
//!     let client = ContractQueryClient::mainnet();
//!     let info = client.get_bigmap_info(149772, BlockId::Head).await?;
//!     println!("big map holds {} bytes", info.total_bytes);
//!     Ok(())
//! }
//! ```

pub mod client;
mod contracts;
pub mod micheline;
pub mod transport;
pub mod types;

pub use client::{ContractQueryClient, Error, RpcError};
pub use micheline::{Code, Prim, Script};
pub use transport::Transport;
pub use types::*;

#[cfg(feature = "client")]
pub use transport::{HttpTransport, HttpTransportBuilder};
