// Battery probe: READ-ONLY check of the battery ADC channel
//
// Usage: cargo run --example battery_probe -- [iio dir] [samples]
// Example: cargo run --example battery_probe -- /sys/bus/iio/devices/iio:device0 10

use std::thread::sleep;
use std::time::Duration;

use tiny4wd_runtime::battery::{Adc, IioAdc, raw_to_volts};
use tiny4wd_runtime::config::{ADC_DIR, BatteryConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("debug".parse().unwrap()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let dir = args.next().unwrap_or_else(|| ADC_DIR.to_string());
    let samples: usize = match args.next() {
        Some(n) => n.parse()?,
        None => 5,
    };

    let config = BatteryConfig::default();
    let mut adc = IioAdc::new(&dir);

    println!("Tiny 4WD battery probe (READ-ONLY)");
    println!("ADC: {}", adc.channel_path(config.channel).display());
    println!(
        "Scaling: full_scale={} vref={}V divider={}",
        config.full_scale, config.vref, config.divider_ratio
    );
    println!();

    for i in 0..samples {
        match adc.read(config.channel) {
            Ok(raw) => println!(
                "  [{}] raw={:5}  battery={:.2}V",
                i,
                raw,
                raw_to_volts(raw, &config)
            ),
            Err(e) => println!("  [{}] ERROR - {}", i, e),
        }
        sleep(Duration::from_millis(500));
    }

    println!();
    println!("Compare against a multimeter on the battery terminals; adjust divider_ratio if they disagree.");
    Ok(())
}
