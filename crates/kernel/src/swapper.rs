use log::{debug, info};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use storage::Disk;
use types::{DiskError, Location, PartitionId, Pid, ProcessState, SwapError, Tsb};

use crate::memory_manager::MemoryManager;
use crate::pcb::Pcb;
use crate::process_manager::ProcessManager;

/// Hidden disk file holding the swapped image of `pid`.
pub fn swap_file_name(pid: Pid) -> String {
    format!(".swap{}", pid)
}

/// Picks which occupied partition to evict.
pub trait VictimSelector {
    /// Returns one of `candidates`, or None to refuse.
    fn select(&mut self, candidates: &[PartitionId]) -> Option<PartitionId>;
}

/// Uniform random choice among the candidates.
#[derive(Debug)]
pub struct RandomVictim {
    rng: SmallRng,
}

impl RandomVictim {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomVictim {
    fn default() -> Self {
        Self::new()
    }
}

impl VictimSelector for RandomVictim {
    fn select(&mut self, candidates: &[PartitionId]) -> Option<PartitionId> {
        candidates.choose(&mut self.rng).copied()
    }
}

/// Moves process images between memory partitions and the disk.
///
/// EDUCATIONAL PURPOSE: When more processes exist than partitions, some of
/// them must live on disk. Rolling out writes a victim's whole partition
/// to a hidden `.swap<pid>` file before the partition is freed; rolling in
/// reads the file back, evicting someone else first if memory is full,
/// and deletes the file once the image is resident again. Because the
/// full partition is saved, a process resumes with exactly the memory it
/// left with.
pub struct Swapper {
    selector: Box<dyn VictimSelector>,
}

impl Swapper {
    pub fn new(selector: Box<dyn VictimSelector>) -> Self {
        Self { selector }
    }

    /// Writes `image`, zero-padded to a full partition, to the swap file of
    /// `pid`. Nothing is left behind on failure.
    pub fn store_image(
        &mut self,
        pid: Pid,
        image: &[u8],
        partition_size: usize,
        disk: &mut Disk,
    ) -> Result<Tsb, DiskError> {
        let name = swap_file_name(pid);
        let mut padded = image.to_vec();
        padded.resize(partition_size.max(image.len()), 0);

        disk.create(&name)?;
        if let Err(e) = disk.write(&name, &padded) {
            // the entry was just created, so deleting it cannot miss
            let _ = disk.delete(&name);
            return Err(e);
        }
        debug!("stored {} byte image of pid {} as '{}'", padded.len(), pid, name);
        disk.locate(&name)
            .ok_or_else(|| DiskError::NameNotFound(name.clone()))
    }

    /// Evicts a partition owned by a queued process other than `incoming`
    /// and returns the freed partition.
    ///
    /// The victim's image is fully on disk before its partition is
    /// cleared. A disk that cannot take the image is fatal: the caller
    /// needed the room and nothing else can free it.
    pub fn roll_out(
        &mut self,
        incoming: Pid,
        procs: &mut ProcessManager,
        mem: &mut MemoryManager,
        disk: &mut Disk,
    ) -> Result<PartitionId, SwapError> {
        let candidates: Vec<PartitionId> = mem
            .occupied()
            .into_iter()
            .filter(|(_, pid)| *pid != incoming && procs.queued(*pid).is_some())
            .map(|(id, _)| id)
            .collect();
        let victim_part = self
            .selector
            .select(&candidates)
            .filter(|id| candidates.contains(id))
            .ok_or(SwapError::NoVictim)?;
        let victim_pid = mem
            .partition(victim_part)
            .and_then(|p| p.occupant)
            .ok_or(SwapError::NoVictim)?;

        let image = mem.read_image(victim_part)?;
        let tsb = self
            .store_image(victim_pid, &image, image.len(), disk)
            .map_err(|e| SwapError::Fatal(format!("cannot swap out pid {}: {}", victim_pid, e)))?;
        mem.clear(victim_part)?;

        if let Some(victim) = procs.queued_mut(victim_pid) {
            victim.location = Location::InDisk;
            victim.swapped = true;
            victim.tsb = Some(tsb);
            if victim.state == ProcessState::Resident {
                victim.state = ProcessState::Swapped;
            }
        }
        info!("rolled out pid {} from partition {} to {}", victim_pid, victim_part, tsb);
        Ok(victim_part)
    }

    /// Brings the swapped image of `pcb` back into memory.
    pub fn roll_in(
        &mut self,
        pcb: &mut Pcb,
        procs: &mut ProcessManager,
        mem: &mut MemoryManager,
        disk: &mut Disk,
    ) -> Result<(), SwapError> {
        let name = swap_file_name(pcb.pid);
        let mut image = disk.read(&name)?;
        image.truncate(mem.partition_size());

        let part = match mem.find_free_partition(image.len()) {
            Some(part) => part,
            None => self.roll_out(pcb.pid, procs, mem, disk)?,
        };
        mem.load(part, &image, pcb.pid)?;
        disk.delete(&name)?;

        pcb.location = Location::Partition(part);
        pcb.swapped = false;
        pcb.tsb = None;
        info!("rolled in pid {} to partition {}", pcb.pid, part);
        Ok(())
    }
}
