//! `vidgate gateways` – list gateways in the order they are probed.

use anyhow::Result;
use vidgate_core::config::VidgateConfig;
use vidgate_core::gateway::GatewayList;

pub fn run_gateways(cfg: &VidgateConfig) -> Result<()> {
    let gateways = GatewayList::new(cfg.gateways.iter())?;
    println!("{:<4} {}", "#", "BASE");
    for (i, base) in gateways.bases().iter().enumerate() {
        println!("{:<4} {}", i, base);
    }
    match &cfg.relay_base {
        Some(relay) => println!("relay: {}", relay),
        None => println!("relay: disabled"),
    }
    Ok(())
}
