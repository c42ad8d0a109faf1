//! Example: Query a Tezos Mainnet contract and one of its big maps.
//!
//! Run with: cargo run --example mainnet

use std::time::Duration;

use tezos_contracts_rpc::{Address, BlockId, ContractQueryClient, HttpTransport, client::Result};

// tzBTC token contract and its ledger big map.
const TZBTC: &str = "KT1PWx2mnDueood7fEmfbBDKx1D9BAnnXitn";
const TZBTC_LEDGER: i64 = 31;

#[tokio::main]
async fn main() -> Result<()> {
    let transport = HttpTransport::builder("https://rpc.tzbeta.net")
        .timeout(Duration::from_secs(30))
        .user_agent("tezos-contracts-rpc/mainnet-demo")
        .build()?;
    let client = ContractQueryClient::new(transport);
    let contract: Address = TZBTC.parse()?;

    println!("=== Tezos Mainnet contract RPC ===\n");

    // 1. Balance
    println!("1. Fetching balance...");
    let balance = client.get_contract_balance(&contract, BlockId::Head).await?;
    println!("   Balance: {balance} mutez");
    println!();

    // 2. Script
    println!("2. Fetching script...");
    let script = client.get_contract_script(&contract).await?;
    println!("   Parameter type: {:?}", script.param_type().prim_name());
    println!("   Storage type: {:?}", script.storage_type().prim_name());
    println!("   Views: {}", script.code.views.len());
    println!();

    // 3. Entrypoints
    println!("3. Fetching entrypoints...");
    let entrypoints = client.get_contract_entrypoints(&contract).await?;
    for name in entrypoints.keys() {
        println!("   - {name}");
    }
    println!();

    // 4. Big map
    println!("4. Fetching big map {TZBTC_LEDGER}...");
    let info = client.get_active_bigmap_info(TZBTC_LEDGER).await?;
    println!("   Key type: {:?}", info.key_type.prim_name());
    println!("   Value type: {:?}", info.value_type.prim_name());
    println!("   Total bytes: {}", info.total_bytes);
    let keys = client.get_active_bigmap_keys(TZBTC_LEDGER).await?;
    println!("   Keys: {}", keys.len());
    if let Some(first) = keys.first() {
        let value = client.get_active_bigmap_value(TZBTC_LEDGER, first).await?;
        println!("   {first}: {}", serde_json::to_string(&value)?);
    }

    println!("\n=== Done! ===");
    Ok(())
}
