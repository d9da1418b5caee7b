//! Accept bills on a real device and dump everything it sends back
//!
//! ```text
//! CCNET_PORT=/dev/ttyUSB0 CCNET_BILLS=0x7C RUST_LOG=ccnet=debug \
//!     cargo run -p ccnet --example accept_bills
//! ```

use std::time::Duration;

use anyhow::Context;
use ccnet::{available_ports, BillTypes, Device, SerialConfig, SerialTransport};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = match std::env::var("CCNET_PORT") {
        Ok(port) => port,
        Err(_) => available_ports()?
            .into_iter()
            .next()
            .context("no serial port found, set CCNET_PORT")?,
    };

    let config: SerialConfig = std::env::var("CCNET_SERIAL")
        .unwrap_or_else(|_| "9600-8-N-1".to_string())
        .parse()?;

    let bills = std::env::var("CCNET_BILLS").unwrap_or_else(|_| "0x7C".to_string());
    let bills = u8::from_str_radix(bills.trim_start_matches("0x"), 16)
        .with_context(|| format!("invalid CCNET_BILLS {:?}", bills))?;
    let bills = BillTypes::from(bills);

    println!("Opening {} ({}), enabling slots {:?}...", port, config, bills.slots().collect::<Vec<_>>());

    let device = Device::new();
    device.on_receive(|bytes| println!("<- {:02X?}", &bytes[..]));
    device.on_poll_error(|e| eprintln!("Polling stopped: {}", e));

    device
        .start_accepting(SerialTransport::new(port).with_config(config), bills)
        .await?;
    println!("✓ Accepting bills, Ctrl-C to stop");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = async {
            while device.is_polling() {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        } => {}
    }

    if device.is_open() {
        device.close().await?;
    }
    println!("✓ Closed after {} frames", device.frames_sent());

    Ok(())
}
