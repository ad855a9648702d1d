use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Decodes hex-pair program text. Whitespace is ignored and `#` starts a
/// comment that runs to the end of the line.
pub fn parse_program(text: &str) -> Result<Vec<u8>> {
    let digits: String = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(|line| line.chars())
        .filter(|c| !c.is_whitespace())
        .collect();
    if digits.is_empty() {
        bail!("program contains no bytes");
    }
    hex::decode(&digits).context("program is not valid hex")
}

pub fn load_program(path: &Path) -> Result<Vec<u8>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read program {}", path.display()))?;
    parse_program(&text).with_context(|| format!("Failed to parse program {}", path.display()))
}
