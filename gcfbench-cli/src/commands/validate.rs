// SPDX-License-Identifier: Apache-2.0

//! `gcfbench validate` command - Validate a run configuration file.

use gcfbench_core::RunConfig;

pub async fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating run configuration");

    match RunConfig::load(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Run Settings:");
            println!("  Base name:        {}", config.base_name);
            println!("  Instances:        {}", config.instances);
            if config.regions.is_empty() {
                println!("  Regions:          (deployer default)");
            } else {
                println!("  Regions:          {}", config.regions.join(", "));
            }
            println!("  Runtime:          {}", config.runtime);
            println!("  Entry point:      {}", config.entry_point);
            println!(
                "  Probe requests:   {} cold, {} warm",
                config.cold_requests, config.warm_requests
            );
            println!(
                "  Results artifact: {}/{}",
                config.results_dir.display(),
                config.results_file
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
