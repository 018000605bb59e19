use bledump::{describe_record, parse_ad_structures, Result, FLAG_BITS};
use tracing::{info, warn};

/// A captured AirTag advertisement in lost mode
const SAMPLE: [u8; 17] = [
    0x02, 0x01, 0x06, // flags
    0x03, 0x03, 0x0F, 0x18, // battery service
    0x02, 0x0A, 0xF4, // tx power
    0x07, 0xFF, 0x4C, 0x00, 0x0D, 0x02, 0xDE, // apple manufacturer data
];

fn parse_hex(input: &str) -> Option<Vec<u8>> {
    input
        .split(|c: char| c == '-' || c == ':' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| u8::from_str_radix(part, 16).ok())
        .collect()
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("🔬 bledump Payload Decoder Example");

    // Raw advertising payload as hex, e.g. "02-01-06-03-03-0F-18"
    let payload = match std::env::args().nth(1) {
        Some(arg) => parse_hex(&arg).unwrap_or_else(|| {
            warn!("⚠️  Could not parse {:?} as hex, using the sample payload", arg);
            SAMPLE.to_vec()
        }),
        None => SAMPLE.to_vec(),
    };

    let records = parse_ad_structures(&payload)?;
    println!("\n📦 {} AD structure(s):", records.len());
    for record in &records {
        match describe_record(record) {
            Ok(line) => println!("  {line}"),
            Err(e) => println!("  {}: invalid ({e})", record.ad_type),
        }
    }

    println!("\n🚩 Flag bits:");
    for bit in &FLAG_BITS {
        println!("  bit {}: {} ({})", bit.bit, bit.name, bit.description);
    }

    Ok(())
}
