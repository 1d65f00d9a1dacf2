//! Check command implementation.

use anyhow::Result;
use std::path::Path;

use crate::config::Config;
use crate::store;
use crate::validation::validate_ipv4;

/// Run the check command
pub fn run(ip_str: &str, config_path: &Path) -> Result<()> {
    let ip = validate_ipv4(ip_str.trim())?;
    let value = ip.to_string();

    let config = Config::load_or_default(config_path)?;

    let mut hits = Vec::new();
    for feed in &config.feeds {
        let path = feed.store_path(&config.data_dir);
        let indicators = store::load(&path, feed.store_format, false)?;
        if indicators.contains_key(&value) {
            hits.push(feed.name.clone());
        }
    }

    println!();
    if hits.is_empty() {
        println!("IP {} is NOT recorded", value);
    } else {
        println!("IP {} is recorded in: {}", value, hits.join(", "));
    }
    println!();

    Ok(())
}
