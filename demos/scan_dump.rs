use bledump::{BleScanner, Result, ScanConfig, ScanSession};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("📡 bledump Scan Example");

    // Optional target address as the first argument, e.g. 18:7E:B9:6A:B8:5D
    let mut config = ScanConfig::default();
    if let Some(address) = std::env::args().nth(1) {
        info!("🎯 Target device: {}", address);
        config = config.with_target_address(address);
    }

    let scanner = match BleScanner::new().await {
        Ok(scanner) => scanner,
        Err(e) => {
            error!("❌ Failed to initialize Bluetooth: {}", e);
            return Err(e);
        }
    };
    let mut session = ScanSession::new(config.clone())?;

    info!(
        "🔍 Scanning for {} seconds (max {} devices)...",
        config.scan_timeout_ms / 1000,
        config.max_devices
    );

    let (sender, receiver) = mpsc::unbounded_channel();
    let (scanned, events) = tokio::join!(scanner.scan(&config, sender), session.run(receiver));
    let scanned = scanned?;

    for event in &events {
        println!("\n{event}");
    }

    let summary = session.finish();
    println!("\n📊 Scan Summary:");
    println!("  Advertisements: {scanned}");
    println!("  Devices: {}", summary.devices.len());
    for device in &summary.devices {
        match device.rssi {
            Some(rssi) => println!("    {} {} ({rssi} dBm, {})", device.address, device.name, device.signal),
            None => println!("    {} {}", device.address, device.name),
        }
    }

    for address in summary.targets {
        info!("🔗 Dumping services of {}", address);
        match scanner.dump_services(&config, address).await {
            Ok(services) => {
                println!("\n🧩 Services of {address}:");
                for service in services {
                    println!("{service}");
                }
            }
            Err(e) if e.is_connection_error() => warn!("⚠️  Could not connect: {}", e),
            Err(e) => return Err(e),
        }
    }

    info!("🎉 Scan completed!");
    Ok(())
}
