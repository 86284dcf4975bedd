//! Zones command implementation

use std::fmt::Write as _;

use crate::calibration::load_context;
use crate::cli::LogLevel;
use crate::config::{load_config, ConfigArgs};
use crate::zones::{ZoneBounds, ZoneMap};

pub fn run_zones(args: ConfigArgs, level: LogLevel) -> Result<(), String> {
    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let context = load_context(&spec).map_err(|e| format!("Failed to load model: {e}"))?;

    if level != LogLevel::Quiet {
        println!("Manning file: {}", context.manning_path().display());
    }
    print!("{}", format_zones(context.zones(), &spec.zones));
    Ok(())
}

pub(crate) fn format_zones(zones: &ZoneMap, bounds: &ZoneBounds) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<20} {:<12} {:<10} {:<24}",
        "ZONE", "PARAMETER", "BASE", "ELEMENTS", "BOUNDS"
    );
    let _ = writeln!(out, "{}", "-".repeat(76));
    for zone in zones.zones() {
        let domain = bounds.for_zone(zone.id);
        let range = match domain.step {
            Some(step) => format!("[{}, {}] step {}", domain.low, domain.high, step),
            None => format!("[{}, {}]", domain.low, domain.high),
        };
        let _ = writeln!(
            out,
            "{:<6} {:<20} {:<12} {:<10} {:<24}",
            zone.id,
            zone.parameter_name(),
            zone.base_value,
            zone.elements.len(),
            range
        );
    }
    let _ = writeln!(
        out,
        "\n{} zone(s) over {} element(s)",
        zones.len(),
        zones.n_elements()
    );
    out
}
