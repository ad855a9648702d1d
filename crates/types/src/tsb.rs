use core::fmt;
use core::str::FromStr;

/// Track:Sector:Block coordinate of a single disk block.
///
/// EDUCATIONAL: Real disks address data by cylinder/head/sector. The
/// simulated disk keeps the same idea with three small indices, and the
/// directory and every data chain link blocks together through these
/// coordinates instead of raw pointers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tsb {
    pub track: u8,
    pub sector: u8,
    pub block: u8,
}

impl Tsb {
    pub const fn new(track: u8, sector: u8, block: u8) -> Self {
        Self { track, sector, block }
    }

    /// Header bytes used by the persisted block encoding.
    pub fn to_bytes(self) -> [u8; 3] {
        [self.track, self.sector, self.block]
    }

    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }
}

impl fmt::Debug for Tsb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.track, self.sector, self.block)
    }
}

impl fmt::Display for Tsb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.track, self.sector, self.block)
    }
}

impl FromStr for Tsb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 3 {
            return Err(format!("malformed tsb '{}'", s));
        }
        let mut out = [0u8; 3];
        for (slot, part) in out.iter_mut().zip(parts) {
            *slot = part
                .parse::<u8>()
                .map_err(|e| format!("malformed tsb '{}': {}", s, e))?;
        }
        Ok(Tsb::from_bytes(out))
    }
}
