//! `framepull config` – show the effective configuration.

use anyhow::Result;
use framepull_core::config::{self, FramepullConfig};
use std::path::Path;

pub fn run_config(explicit: Option<&Path>, cfg: &FramepullConfig) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", path.display());
    print!("{}", cfg.to_toml()?);
    if let Err(e) = cfg.validate() {
        println!("# warning: {}", e);
    }
    Ok(())
}
