use kernel::MemoryManager;
use types::{Config, MemoryError, PartitionId};
use vm::Instruction;

fn manager() -> MemoryManager {
    MemoryManager::new(&Config::default())
}

#[test]
fn partitions_tile_memory_without_overlap() {
    let mem = manager();
    let parts = mem.partitions();

    assert_eq!(mem.memory().size(), 768);
    assert_eq!(parts.len(), 3);
    for (i, part) in parts.iter().enumerate() {
        assert_eq!(part.base, i * 256);
        assert_eq!(part.limit, 256);
        assert!(part.is_free());
    }
}

#[test]
fn first_fit_skips_occupied_partitions() {
    let mut mem = manager();
    assert_eq!(mem.find_free_partition(10), Some(PartitionId(0)));

    mem.load(PartitionId(0), &[1, 2, 3], 7).unwrap();
    assert_eq!(mem.find_free_partition(10), Some(PartitionId(1)));
    assert_eq!(mem.find_free_partition(257), None);
    assert_eq!(mem.occupied(), vec![(PartitionId(0), 7)]);
}

#[test]
fn load_zero_fills_the_rest_of_the_partition() {
    let mut mem = manager();
    mem.load(PartitionId(1), &[0xFF; 256], 1).unwrap();
    mem.load(PartitionId(1), &[0xAB, 0xCD], 2).unwrap();

    let image = mem.read_image(PartitionId(1)).unwrap();
    assert_eq!(&image[..2], &[0xAB, 0xCD]);
    assert!(image[2..].iter().all(|&b| b == 0));
    assert_eq!(mem.partition(PartitionId(1)).and_then(|p| p.occupant), Some(2));
}

#[test]
fn oversized_image_is_refused() {
    let mut mem = manager();
    assert_eq!(
        mem.load(PartitionId(0), &[0u8; 300], 1),
        Err(MemoryError::ImageTooLarge { len: 300, limit: 256 })
    );
    assert_eq!(
        mem.load(PartitionId(9), &[0u8; 1], 1),
        Err(MemoryError::NoSuchPartition(PartitionId(9)))
    );
    assert!(mem.partitions().iter().all(|p| p.is_free()));
}

#[test]
fn refused_load_keeps_the_previous_occupant() {
    let mut mem = manager();
    mem.load(PartitionId(0), &[5; 8], 3).unwrap();

    assert!(mem.load(PartitionId(0), &[0u8; 257], 4).is_err());

    assert_eq!(mem.partition(PartitionId(0)).and_then(|p| p.occupant), Some(3));
    assert_eq!(&mem.read_image(PartitionId(0)).unwrap()[..8], &[5; 8]);
}

#[test]
fn clear_frees_and_zeroes() {
    let mut mem = manager();
    mem.load(PartitionId(2), &[9; 16], 4).unwrap();

    mem.clear(PartitionId(2)).unwrap();

    assert!(mem.partition(PartitionId(2)).unwrap().is_free());
    assert!(mem.memory().mem().iter().all(|&b| b == 0));
}

#[test]
fn translate_respects_the_limit() {
    let mem = manager();
    let part = mem.partition(PartitionId(1)).unwrap();

    assert_eq!(part.translate(0), Some(256));
    assert_eq!(part.translate(255), Some(511));
    assert_eq!(part.translate(256), None);
}

#[test]
fn instruction_at_decodes_inside_the_partition() {
    let mut mem = manager();
    mem.load(PartitionId(0), &[0xEA, 0x8D, 0x10, 0x00], 1).unwrap();

    assert_eq!(mem.instruction_at(PartitionId(0), 0), Some(Instruction::NoOp));
    assert_eq!(
        mem.instruction_at(PartitionId(0), 1),
        Some(Instruction::StoreAcc { addr: 0x10 })
    );
    assert_eq!(mem.instruction_at(PartitionId(0), 300), None);
}
