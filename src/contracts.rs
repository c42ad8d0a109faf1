//! Contract and big-map queries.
//!
//! See <https://tezos.gitlab.io/active/rpc.html> for the endpoint reference.

use serde::Deserialize;

use crate::client::{ContractQueryClient, Result};
use crate::micheline::{Prim, Script};
use crate::transport::Transport;
use crate::types::{Address, BigmapInfo, BlockId, Contracts, Entrypoints, ExprHash};

#[derive(Deserialize)]
struct EntrypointsResponse {
    entrypoints: Entrypoints,
}

fn contracts_path(block: &BlockId) -> String {
    format!("chains/main/blocks/{block}/context/contracts")
}

fn contract_path(block: &BlockId, addr: &Address, item: &str) -> String {
    format!("chains/main/blocks/{block}/context/contracts/{addr}/{item}")
}

fn bigmap_path(block: &BlockId, bigmap: i64) -> String {
    format!("chains/main/blocks/{block}/context/raw/json/big_maps/index/{bigmap}")
}

impl<T: Transport> ContractQueryClient<T> {
    // ── Contracts ────────────────────────────────────────────────

    /// Returns all contracts known at `block`.
    pub async fn get_contracts(&self, block: impl Into<BlockId>) -> Result<Contracts> {
        self.get(&contracts_path(&block.into())).await
    }

    /// Returns all contracts known at `height`.
    pub async fn get_contracts_height(&self, height: i64) -> Result<Contracts> {
        self.get_contracts(BlockId::level(height)).await
    }

    /// Returns a contract's balance in mutez at `block`.
    ///
    /// The node sends the balance as a decimal string.
    pub async fn get_contract_balance(
        &self,
        addr: &Address,
        block: impl Into<BlockId>,
    ) -> Result<i64> {
        let balance: String = self
            .get(&contract_path(&block.into(), addr, "balance"))
            .await?;
        Ok(balance.parse()?)
    }

    /// Returns a contract's balance in mutez at `height`.
    pub async fn get_contract_balance_height(&self, addr: &Address, height: i64) -> Result<i64> {
        self.get_contract_balance(addr, BlockId::level(height)).await
    }

    /// Returns the code and storage of an originated contract at head.
    pub async fn get_contract_script(&self, addr: &Address) -> Result<Script> {
        self.get(&contract_path(&BlockId::Head, addr, "script"))
            .await
    }

    /// Returns a contract's storage at `block`.
    pub async fn get_contract_storage(
        &self,
        addr: &Address,
        block: impl Into<BlockId>,
    ) -> Result<Prim> {
        self.get(&contract_path(&block.into(), addr, "storage"))
            .await
    }

    /// Returns a contract's storage at `height`.
    pub async fn get_contract_storage_height(&self, addr: &Address, height: i64) -> Result<Prim> {
        self.get_contract_storage(addr, BlockId::level(height))
            .await
    }

    /// Returns a contract's entrypoints and their parameter types at head.
    pub async fn get_contract_entrypoints(&self, addr: &Address) -> Result<Entrypoints> {
        let response: EntrypointsResponse = self
            .get(&contract_path(&BlockId::Head, addr, "entrypoints"))
            .await?;
        Ok(response.entrypoints)
    }

    // ── Big maps ─────────────────────────────────────────────────

    /// Returns the hashes of every key ever written to `bigmap` as of
    /// `block`, including keys that have since been removed.
    pub async fn get_bigmap_keys(
        &self,
        bigmap: i64,
        block: impl Into<BlockId>,
    ) -> Result<Vec<ExprHash>> {
        let path = format!("{}/contents", bigmap_path(&block.into(), bigmap));
        self.get(&path).await
    }

    /// Returns the key hashes of `bigmap` at head.
    pub async fn get_active_bigmap_keys(&self, bigmap: i64) -> Result<Vec<ExprHash>> {
        self.get_bigmap_keys(bigmap, BlockId::Head).await
    }

    /// Returns the value stored under `hash` in `bigmap` at `block`.
    pub async fn get_bigmap_value(
        &self,
        bigmap: i64,
        hash: &ExprHash,
        block: impl Into<BlockId>,
    ) -> Result<Prim> {
        let path = format!("{}/contents/{hash}", bigmap_path(&block.into(), bigmap));
        self.get(&path).await
    }

    /// Returns the value stored under `hash` in `bigmap` at head.
    pub async fn get_active_bigmap_value(&self, bigmap: i64, hash: &ExprHash) -> Result<Prim> {
        self.get_bigmap_value(bigmap, hash, BlockId::Head).await
    }

    /// Returns the value stored under `hash` in `bigmap` at `height`.
    pub async fn get_bigmap_value_height(
        &self,
        bigmap: i64,
        hash: &ExprHash,
        height: i64,
    ) -> Result<Prim> {
        self.get_bigmap_value(bigmap, hash, BlockId::level(height))
            .await
    }

    /// Returns the key and value types and total size of `bigmap` at `block`.
    pub async fn get_bigmap_info(
        &self,
        bigmap: i64,
        block: impl Into<BlockId>,
    ) -> Result<BigmapInfo> {
        self.get(&bigmap_path(&block.into(), bigmap)).await
    }

    /// Returns the key and value types and total size of `bigmap` at head.
    pub async fn get_active_bigmap_info(&self, bigmap: i64) -> Result<BigmapInfo> {
        self.get_bigmap_info(bigmap, BlockId::Head).await
    }
}
