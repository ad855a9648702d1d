use std::fs;
use std::path::Path;

use log::info;
use types::{DiskError, DiskGeometry, Tsb};

use crate::{Block, Disk, block_index};

/// Successor bytes written for the end of a chain.
const NO_SUCCESSOR: [u8; 3] = [0xFF, 0xFF, 0xFF];

impl Disk {
    /// Writes the block table as one `t:s:b <hex>` line per block. The hex
    /// holds the in-use byte, three successor bytes and the payload.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DiskError> {
        let mut out = String::new();
        for (tsb, block) in self.block_table() {
            out.push_str(&format!("{} {}\n", tsb, hex::encode(encode_block(block))));
        }
        fs::write(path.as_ref(), out).map_err(|e| DiskError::Io(e.to_string()))?;
        info!("disk saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Loads a block table written by `save`. Every block of `geometry`
    /// must be present exactly once, and the headers must describe
    /// well-formed, disjoint file chains.
    pub fn load(path: impl AsRef<Path>, geometry: DiskGeometry) -> Result<Self, DiskError> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| DiskError::Io(e.to_string()))?;
        let mut disk = Disk::new(geometry)?;
        let mut seen = vec![false; geometry.total_blocks()];

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let corrupt =
                |why: String| DiskError::Corrupt(format!("line {}: {}", line_no + 1, why));
            let (key, value) = line
                .split_once(' ')
                .ok_or_else(|| corrupt("missing block payload".to_string()))?;
            let tsb: Tsb = key.parse().map_err(corrupt)?;
            let raw = hex::decode(value.trim()).map_err(|e| corrupt(e.to_string()))?;
            let block = decode_block(&raw, geometry, tsb).map_err(corrupt)?;
            let index = block_index(geometry, tsb)
                .ok_or_else(|| corrupt(format!("{} is off the disk", tsb)))?;
            if seen[index] {
                return Err(corrupt(format!("{} appears twice", tsb)));
            }
            seen[index] = true;
            disk.replace_block(tsb, block);
        }

        if seen.iter().any(|s| !s) {
            return Err(DiskError::Corrupt("block table is incomplete".to_string()));
        }
        disk.check_consistency()?;
        info!("disk loaded from {}", path.as_ref().display());
        Ok(disk)
    }
}

fn encode_block(block: &Block) -> Vec<u8> {
    let mut raw = Vec::with_capacity(DiskGeometry::HEADER_SIZE + block.data.len());
    raw.push(block.in_use as u8);
    raw.extend_from_slice(&block.successor.map(Tsb::to_bytes).unwrap_or(NO_SUCCESSOR));
    raw.extend_from_slice(&block.data);
    raw
}

fn decode_block(raw: &[u8], geometry: DiskGeometry, tsb: Tsb) -> Result<Block, String> {
    if raw.len() != geometry.block_size {
        return Err(format!(
            "{} holds {} bytes, expected {}",
            tsb,
            raw.len(),
            geometry.block_size
        ));
    }
    let successor_bytes = [raw[1], raw[2], raw[3]];
    let successor = if successor_bytes == NO_SUCCESSOR {
        None
    } else {
        let next = Tsb::from_bytes(successor_bytes);
        if block_index(geometry, next).is_none() {
            return Err(format!("{} links to {} which is off the disk", tsb, next));
        }
        Some(next)
    };
    Ok(Block {
        in_use: raw[0] != 0,
        successor,
        data: raw[DiskGeometry::HEADER_SIZE..].to_vec(),
    })
}
