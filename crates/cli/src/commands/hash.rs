use anyhow::{Context, Result};
use nidscope_core::nid::{compute_nid, format_nid};

/// Print the NID of each name.
pub fn hash_command(names: &[String]) -> Result<()> {
    for name in names {
        let nid = compute_nid(name).with_context(|| format!("Failed to hash '{name}'"))?;
        println!("{} {}", format_nid(&nid), name);
    }
    Ok(())
}
