//! Simulated block-structured disk: a directory track of named entries,
//! each pointing at a singly-linked chain of data blocks.

mod block;
mod persist;

pub use block::Block;

use log::{debug, info};
use types::{DiskError, DiskGeometry, Tsb};

/// How much of the disk a format touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatMode {
    /// Reset availability and successor pointers only.
    Quick,
    /// Also zero every payload byte.
    Full,
}

/// Represents the disk storage manager of the simulated machine.
///
/// EDUCATIONAL PURPOSE: This struct shows how a very small file system
/// can be built from nothing but fixed-size blocks:
/// - Track 0 is the directory. Each in-use directory block holds one file
///   name and points at the first data block of that file.
/// - The remaining tracks are the data region. A file's bytes are spread
///   over a chain of data blocks, each naming its successor.
/// - Block 0:0:0 is the master boot record and is never handed out.
///
/// DIRECTORY ENTRY LAYOUT: the payload holds the zero-terminated file name
/// at the front and the file length as a little-endian u32 in its last
/// four bytes, so reads return exactly what was written.
///
/// INVARIANT: a block is in use exactly when it is the MBR, a directory
/// entry, or a member of some entry's chain, and every free block has no
/// successor. All chain mutation goes through this type so the invariant
/// is kept in one place.
#[derive(Clone, Debug)]
pub struct Disk {
    geometry: DiskGeometry,
    blocks: Vec<Block>,
}

pub const MBR: Tsb = Tsb::new(0, 0, 0);

const LENGTH_BYTES: usize = 4;

impl Disk {
    /// Creates a freshly formatted disk. Fails when `geometry` cannot
    /// hold a directory track, a data track and one-byte file names.
    pub fn new(geometry: DiskGeometry) -> Result<Self, DiskError> {
        geometry.validate().map_err(DiskError::InvalidGeometry)?;
        let blocks = (0..geometry.total_blocks())
            .map(|_| Block::free(geometry.payload_size()))
            .collect();
        let mut disk = Self { geometry, blocks };
        disk.format(FormatMode::Full);
        Ok(disk)
    }

    pub fn geometry(&self) -> DiskGeometry {
        self.geometry
    }

    /// Returns every block to the free state; only the MBR stays in use.
    pub fn format(&mut self, mode: FormatMode) {
        for block in self.blocks.iter_mut() {
            block.in_use = false;
            block.successor = None;
            if mode == FormatMode::Full {
                block.data.fill(0);
            }
        }
        self.blocks[0].in_use = true;
        info!("disk formatted ({:?})", mode);
    }

    /// Creates an empty file owning one data block.
    pub fn create(&mut self, name: &str) -> Result<(), DiskError> {
        self.validate_name(name)?;
        if self.find_entry(name).is_some() {
            return Err(DiskError::NameAlreadyExists(name.to_string()));
        }
        let dir = self.free_directory_block().ok_or(DiskError::DiskFull)?;
        let data = self
            .free_data_blocks(1)
            .and_then(|found| found.first().copied())
            .ok_or(DiskError::DiskFull)?;

        let entry = self.encode_entry(name, 0);
        let data_block = self.block_mut(data);
        data_block.in_use = true;
        data_block.successor = None;
        data_block.data.fill(0);

        let dir_block = self.block_mut(dir);
        dir_block.in_use = true;
        dir_block.successor = Some(data);
        dir_block.data = entry;

        debug!("created '{}' at {} -> {}", name, dir, data);
        Ok(())
    }

    /// Replaces the contents of `name` with `bytes`.
    ///
    /// The chain is grown or shrunk to exactly the blocks needed (at least
    /// one). Growth is checked before anything is written, so a `DiskFull`
    /// failure leaves the file and the disk untouched.
    pub fn write(&mut self, name: &str, bytes: &[u8]) -> Result<(), DiskError> {
        let entry = self
            .find_entry(name)
            .ok_or_else(|| DiskError::NameNotFound(name.to_string()))?;
        let payload = self.geometry.payload_size();
        let needed = bytes.len().div_ceil(payload).max(1);

        let mut chain = self.chain(entry);
        if chain.len() < needed {
            let extra = self
                .free_data_blocks(needed - chain.len())
                .ok_or(DiskError::DiskFull)?;
            let mut tail = chain.last().copied().unwrap_or(entry);
            for tsb in extra {
                self.block_mut(tail).successor = Some(tsb);
                let block = self.block_mut(tsb);
                block.in_use = true;
                block.successor = None;
                chain.push(tsb);
                tail = tsb;
            }
            debug!("'{}' grew to {} blocks", name, chain.len());
        }

        for (i, tsb) in chain.iter().take(needed).enumerate() {
            let start = i * payload;
            let end = (start + payload).min(bytes.len());
            let block = self.block_mut(*tsb);
            block.data.fill(0);
            if start < end {
                block.data[..end - start].copy_from_slice(&bytes[start..end]);
            }
        }

        if chain.len() > needed {
            let last = chain[needed - 1];
            let excess = chain[needed];
            self.block_mut(last).successor = None;
            self.free_chain(excess, self.blocks.len());
            debug!("'{}' shrank to {} blocks", name, needed);
        }

        let entry_data = self.encode_entry(name, bytes.len());
        self.block_mut(entry).data = entry_data;
        Ok(())
    }

    pub fn write_text(&mut self, name: &str, text: &str) -> Result<(), DiskError> {
        self.write(name, text.as_bytes())
    }

    /// Reads back exactly the bytes last written to `name`.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, DiskError> {
        let entry = self
            .find_entry(name)
            .ok_or_else(|| DiskError::NameNotFound(name.to_string()))?;
        let len = self.entry_len(entry);
        let mut out = Vec::with_capacity(len);
        for tsb in self.chain(entry) {
            if out.len() >= len {
                break;
            }
            out.extend_from_slice(&self.block_ref(tsb).data);
        }
        if out.len() < len {
            return Err(DiskError::Corrupt(format!(
                "'{}' claims {} bytes but its chain holds {}",
                name,
                len,
                out.len()
            )));
        }
        out.truncate(len);
        Ok(out)
    }

    /// Reads `name` as text, stopping at the first zero byte.
    pub fn read_text(&self, name: &str) -> Result<String, DiskError> {
        let bytes = self.read(name)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(bytes[..end].iter().map(|&b| b as char).collect())
    }

    /// Frees the file's whole chain, then its directory entry.
    pub fn delete(&mut self, name: &str) -> Result<(), DiskError> {
        let entry = self
            .find_entry(name)
            .ok_or_else(|| DiskError::NameNotFound(name.to_string()))?;
        self.free_chain(entry, self.blocks.len());
        debug!("deleted '{}'", name);
        Ok(())
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), DiskError> {
        self.validate_name(new)?;
        let entry = self
            .find_entry(old)
            .ok_or_else(|| DiskError::NameNotFound(old.to_string()))?;
        if self.find_entry(new).is_some() {
            return Err(DiskError::NameAlreadyExists(new.to_string()));
        }
        let len = self.entry_len(entry);
        let data = self.encode_entry(new, len);
        self.block_mut(entry).data = data;
        Ok(())
    }

    /// Copies `src` to a new file `dst`. Either the whole copy lands or the
    /// disk is left unchanged.
    pub fn copy(&mut self, src: &str, dst: &str) -> Result<(), DiskError> {
        self.validate_name(dst)?;
        let bytes = self.read(src)?;
        if self.find_entry(dst).is_some() {
            return Err(DiskError::NameAlreadyExists(dst.to_string()));
        }
        let needed = bytes.len().div_ceil(self.geometry.payload_size()).max(1);
        if self.free_directory_block().is_none() || self.free_data_blocks(needed).is_none() {
            return Err(DiskError::DiskFull);
        }
        self.create(dst)?;
        self.write(dst, &bytes)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.find_entry(name).is_some()
    }

    /// Directory block holding the entry for `name`.
    pub fn locate(&self, name: &str) -> Option<Tsb> {
        self.find_entry(name)
    }

    pub fn file_size(&self, name: &str) -> Result<usize, DiskError> {
        self.find_entry(name)
            .map(|entry| self.entry_len(entry))
            .ok_or_else(|| DiskError::NameNotFound(name.to_string()))
    }

    /// Names of all visible files (names starting with `.` are hidden).
    pub fn list(&self) -> Vec<String> {
        self.list_all()
            .into_iter()
            .filter(|name| !name.starts_with('.'))
            .collect()
    }

    /// Names of all files, hidden ones included, in directory order.
    pub fn list_all(&self) -> Vec<String> {
        self.directory_tsbs()
            .filter(|tsb| self.block_ref(*tsb).in_use)
            .map(|tsb| self.entry_name(tsb))
            .collect()
    }

    pub fn block(&self, tsb: Tsb) -> Option<&Block> {
        self.index(tsb).map(|i| &self.blocks[i])
    }

    /// Every block with its coordinate, in track/sector/block order.
    pub fn block_table(&self) -> Vec<(Tsb, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, block)| (self.tsb_at(i), block))
            .collect()
    }

    pub fn used_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.in_use).count()
    }

    pub fn free_data_block_count(&self) -> usize {
        self.data_tsbs()
            .filter(|tsb| !self.block_ref(*tsb).in_use)
            .count()
    }

    pub(crate) fn replace_block(&mut self, tsb: Tsb, block: Block) {
        if let Some(i) = self.index(tsb) {
            self.blocks[i] = block;
        }
    }

    /// Checks that block headers agree with the directory: every in-use
    /// entry owns a chain of in-use data blocks, no block sits in two
    /// chains, nothing else is in use, and free blocks have no successor.
    pub(crate) fn check_consistency(&self) -> Result<(), DiskError> {
        let corrupt = |why: String| Err(DiskError::Corrupt(why));
        let data_start = self.geometry.blocks_per_track();
        let mut owned = vec![false; self.blocks.len()];

        let mbr = self.block_ref(MBR);
        if !mbr.in_use || mbr.successor.is_some() {
            return corrupt(format!("master boot record {} was modified", MBR));
        }
        owned[0] = true;

        for entry in self.directory_tsbs() {
            let block = self.block_ref(entry);
            if !block.in_use {
                continue;
            }
            if let Some(i) = self.index(entry) {
                owned[i] = true;
            }
            let mut next = block.successor;
            if next.is_none() {
                return corrupt(format!("directory entry {} has no data block", entry));
            }
            while let Some(tsb) = next {
                let Some(i) = self.index(tsb).filter(|i| *i >= data_start) else {
                    return corrupt(format!(
                        "chain of {} leaves the data region at {}",
                        entry, tsb
                    ));
                };
                if owned[i] {
                    return corrupt(format!("{} is linked into more than one chain", tsb));
                }
                if !self.blocks[i].in_use {
                    return corrupt(format!("chain of {} runs through free block {}", entry, tsb));
                }
                owned[i] = true;
                next = self.blocks[i].successor;
            }
        }

        for (i, block) in self.blocks.iter().enumerate() {
            let tsb = self.tsb_at(i);
            if block.in_use && !owned[i] {
                return corrupt(format!("{} is in use but belongs to no file", tsb));
            }
            if !block.in_use && block.successor.is_some() {
                return corrupt(format!("free block {} still has a successor", tsb));
            }
        }
        Ok(())
    }

    fn validate_name(&self, name: &str) -> Result<(), DiskError> {
        let max = self.geometry.payload_size().saturating_sub(LENGTH_BYTES + 1);
        if name.is_empty() || name.len() > max || !name.is_ascii() || name.bytes().any(|b| b == 0) {
            return Err(DiskError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    fn index(&self, tsb: Tsb) -> Option<usize> {
        block_index(self.geometry, tsb)
    }

    fn tsb_at(&self, index: usize) -> Tsb {
        let g = &self.geometry;
        let block = index % g.blocks as usize;
        let sector = (index / g.blocks as usize) % g.sectors as usize;
        let track = index / g.blocks_per_track();
        Tsb::new(track as u8, sector as u8, block as u8)
    }

    fn block_ref(&self, tsb: Tsb) -> &Block {
        &self.blocks[self.index(tsb).unwrap_or(0)]
    }

    fn block_mut(&mut self, tsb: Tsb) -> &mut Block {
        let i = self.index(tsb).unwrap_or(0);
        &mut self.blocks[i]
    }

    fn directory_tsbs(&self) -> impl Iterator<Item = Tsb> + '_ {
        (1..self.geometry.blocks_per_track()).map(|i| self.tsb_at(i))
    }

    fn data_tsbs(&self) -> impl Iterator<Item = Tsb> + '_ {
        (self.geometry.blocks_per_track()..self.blocks.len()).map(|i| self.tsb_at(i))
    }

    fn find_entry(&self, name: &str) -> Option<Tsb> {
        self.directory_tsbs()
            .find(|tsb| self.block_ref(*tsb).in_use && self.entry_name(*tsb) == name)
    }

    fn free_directory_block(&self) -> Option<Tsb> {
        self.directory_tsbs().find(|tsb| !self.block_ref(*tsb).in_use)
    }

    /// First `count` free data blocks, or None if the region has fewer.
    fn free_data_blocks(&self, count: usize) -> Option<Vec<Tsb>> {
        let found: Vec<Tsb> = self
            .data_tsbs()
            .filter(|tsb| !self.block_ref(*tsb).in_use)
            .take(count)
            .collect();
        (found.len() == count).then_some(found)
    }

    /// Data blocks reachable from a directory entry, in file order.
    fn chain(&self, entry: Tsb) -> Vec<Tsb> {
        let mut out = Vec::new();
        let mut next = self.block_ref(entry).successor;
        while let Some(tsb) = next {
            // a loop in a corrupt image must not hang the reader
            if out.len() >= self.blocks.len() || self.index(tsb).is_none() {
                break;
            }
            out.push(tsb);
            next = self.block_ref(tsb).successor;
        }
        out
    }

    /// Frees `tsb` and everything after it, deepest block first.
    fn free_chain(&mut self, tsb: Tsb, budget: usize) {
        if budget == 0 || self.index(tsb).is_none() || tsb == MBR {
            return;
        }
        if let Some(next) = self.block_ref(tsb).successor {
            self.free_chain(next, budget - 1);
        }
        let block = self.block_mut(tsb);
        block.in_use = false;
        block.successor = None;
        block.data.fill(0);
    }

    fn encode_entry(&self, name: &str, len: usize) -> Vec<u8> {
        let payload = self.geometry.payload_size();
        let mut data = vec![0u8; payload];
        data[..name.len()].copy_from_slice(name.as_bytes());
        data[payload - LENGTH_BYTES..].copy_from_slice(&(len as u32).to_le_bytes());
        data
    }

    fn entry_name(&self, entry: Tsb) -> String {
        let data = &self.block_ref(entry).data;
        let name_area = &data[..data.len() - LENGTH_BYTES];
        let end = name_area.iter().position(|&b| b == 0).unwrap_or(name_area.len());
        name_area[..end].iter().map(|&b| b as char).collect()
    }

    fn entry_len(&self, entry: Tsb) -> usize {
        let data = &self.block_ref(entry).data;
        let mut raw = [0u8; LENGTH_BYTES];
        raw.copy_from_slice(&data[data.len() - LENGTH_BYTES..]);
        u32::from_le_bytes(raw) as usize
    }
}

/// Position of `tsb` in track/sector/block order, None when it lies off
/// the disk.
pub(crate) fn block_index(geometry: DiskGeometry, tsb: Tsb) -> Option<usize> {
    let g = geometry;
    if tsb.track >= g.tracks || tsb.sector >= g.sectors || tsb.block >= g.blocks {
        return None;
    }
    Some(
        (tsb.track as usize * g.sectors as usize + tsb.sector as usize) * g.blocks as usize
            + tsb.block as usize,
    )
}
