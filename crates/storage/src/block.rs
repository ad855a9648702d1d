use types::Tsb;

/// One fixed-size disk block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub in_use: bool,
    /// Next block of the same file, None at the end of a chain.
    pub successor: Option<Tsb>,
    pub data: Vec<u8>,
}

impl Block {
    pub fn free(payload_size: usize) -> Self {
        Self {
            in_use: false,
            successor: None,
            data: vec![0u8; payload_size],
        }
    }
}
