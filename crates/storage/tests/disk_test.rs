use std::path::PathBuf;

use storage::{Disk, FormatMode, MBR};
use types::{DiskError, DiskGeometry, Tsb};

/// Two tracks of four blocks with a 12 byte payload: three directory
/// entries and four data blocks.
fn tiny() -> DiskGeometry {
    DiskGeometry {
        tracks: 2,
        sectors: 1,
        blocks: 4,
        block_size: 16,
    }
}

fn temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("disk_test_{}_{}.img", tag, std::process::id()))
}

#[test]
fn create_write_read_delete_reuses_slot() {
    let mut disk = Disk::new(DiskGeometry::default()).unwrap();

    disk.create("note").unwrap();
    disk.write_text("note", "hi").unwrap();
    assert_eq!(disk.read_text("note").unwrap(), "hi");
    assert_eq!(disk.read("note").unwrap(), b"hi".to_vec());

    disk.delete("note").unwrap();
    assert!(!disk.exists("note"));
    disk.create("note").unwrap();
    assert_eq!(disk.read("note").unwrap(), Vec::<u8>::new());
}

#[test]
fn new_disk_only_reserves_the_boot_record() {
    let disk = Disk::new(DiskGeometry::default()).unwrap();

    assert_eq!(disk.used_blocks(), 1);
    assert!(disk.block(MBR).unwrap().in_use);
    assert_eq!(disk.free_data_block_count(), 3 * 8 * 8);
    assert!(disk.list().is_empty());
}

#[test]
fn names_are_unique() {
    let mut disk = Disk::new(DiskGeometry::default()).unwrap();
    disk.create("a").unwrap();
    let used = disk.used_blocks();

    assert_eq!(
        disk.create("a"),
        Err(DiskError::NameAlreadyExists("a".to_string()))
    );
    assert_eq!(disk.used_blocks(), used);
}

#[test]
fn invalid_names_are_rejected() {
    let mut disk = Disk::new(DiskGeometry::default()).unwrap();
    let too_long = "x".repeat(56);

    assert!(matches!(disk.create(""), Err(DiskError::InvalidName(_))));
    assert!(matches!(disk.create(&too_long), Err(DiskError::InvalidName(_))));
    assert!(disk.create(&"x".repeat(55)).is_ok());
}

#[test]
fn missing_file_operations_report_the_name() {
    let mut disk = Disk::new(DiskGeometry::default()).unwrap();
    let missing = DiskError::NameNotFound("ghost".to_string());

    assert_eq!(disk.read("ghost"), Err(missing.clone()));
    assert_eq!(disk.write("ghost", b"x"), Err(missing.clone()));
    assert_eq!(disk.delete("ghost"), Err(missing));
}

#[test]
fn multi_block_file_round_trips_exactly() {
    let mut disk = Disk::new(DiskGeometry::default()).unwrap();
    // payload is 60 bytes, so 150 bytes span three blocks and end in zeros
    let mut bytes: Vec<u8> = (0..150u32).map(|i| (i % 251) as u8).collect();
    bytes[149] = 0;
    disk.create("big").unwrap();
    let before = disk.used_blocks();

    disk.write("big", &bytes).unwrap();

    assert_eq!(disk.read("big").unwrap(), bytes);
    assert_eq!(disk.file_size("big").unwrap(), 150);
    assert_eq!(disk.used_blocks(), before + 2);
}

#[test]
fn shrinking_a_file_frees_its_tail() {
    let mut disk = Disk::new(DiskGeometry::default()).unwrap();
    disk.create("f").unwrap();
    disk.write("f", &[7u8; 200]).unwrap();
    let grown = disk.used_blocks();

    disk.write_text("f", "short").unwrap();

    assert_eq!(disk.read_text("f").unwrap(), "short");
    assert_eq!(disk.used_blocks(), grown - 3);
    for (_, block) in disk.block_table() {
        if !block.in_use {
            assert_eq!(block.successor, None);
        }
    }
}

#[test]
fn write_that_does_not_fit_changes_nothing() {
    let mut disk = Disk::new(tiny()).unwrap();
    disk.create("a").unwrap();
    disk.write_text("a", "keep").unwrap();
    let used = disk.used_blocks();

    // four data blocks exist and one is taken; 50 bytes would need five
    assert_eq!(disk.write("a", &[1u8; 50]), Err(DiskError::DiskFull));

    assert_eq!(disk.read_text("a").unwrap(), "keep");
    assert_eq!(disk.used_blocks(), used);
}

#[test]
fn directory_track_fills_up() {
    let mut disk = Disk::new(tiny()).unwrap();
    disk.create("a").unwrap();
    disk.create("b").unwrap();
    disk.create("c").unwrap();

    assert_eq!(disk.create("d"), Err(DiskError::DiskFull));
    assert_eq!(disk.list(), vec!["a", "b", "c"]);
}

#[test]
fn dot_files_are_hidden_from_list() {
    let mut disk = Disk::new(DiskGeometry::default()).unwrap();
    disk.create("visible").unwrap();
    disk.create(".swap1").unwrap();

    assert_eq!(disk.list(), vec!["visible"]);
    assert_eq!(disk.list_all(), vec!["visible", ".swap1"]);
}

#[test]
fn rename_keeps_contents() {
    let mut disk = Disk::new(DiskGeometry::default()).unwrap();
    disk.create("old").unwrap();
    disk.create("other").unwrap();
    disk.write_text("old", "payload").unwrap();

    assert_eq!(
        disk.rename("old", "other"),
        Err(DiskError::NameAlreadyExists("other".to_string()))
    );
    disk.rename("old", "new").unwrap();

    assert!(!disk.exists("old"));
    assert_eq!(disk.read_text("new").unwrap(), "payload");
}

#[test]
fn copy_duplicates_the_chain() {
    let mut disk = Disk::new(DiskGeometry::default()).unwrap();
    disk.create("src").unwrap();
    disk.write("src", &[9u8; 100]).unwrap();

    disk.copy("src", "dst").unwrap();
    disk.write_text("src", "changed").unwrap();

    assert_eq!(disk.read("dst").unwrap(), vec![9u8; 100]);
}

#[test]
fn copy_without_room_leaves_no_partial_file() {
    let mut disk = Disk::new(tiny()).unwrap();
    disk.create("src").unwrap();
    disk.write("src", &[1u8; 30]).unwrap();
    let used = disk.used_blocks();

    assert_eq!(disk.copy("src", "dst"), Err(DiskError::DiskFull));
    assert!(!disk.exists("dst"));
    assert_eq!(disk.used_blocks(), used);
}

#[test]
fn quick_format_keeps_payload_bytes() {
    let mut disk = Disk::new(DiskGeometry::default()).unwrap();
    disk.create("f").unwrap();
    disk.write_text("f", "data").unwrap();
    let first_data = Tsb::new(1, 0, 0);

    disk.format(FormatMode::Quick);
    assert!(disk.list().is_empty());
    assert_eq!(disk.used_blocks(), 1);
    assert_eq!(&disk.block(first_data).unwrap().data[..4], b"data");

    disk.format(FormatMode::Full);
    assert!(disk.block(first_data).unwrap().data.iter().all(|&b| b == 0));
}

#[test]
fn save_and_load_restore_the_same_files() {
    let path = temp_path("roundtrip");
    let mut disk = Disk::new(DiskGeometry::default()).unwrap();
    disk.create("a").unwrap();
    disk.write("a", &[3u8; 130]).unwrap();
    disk.create(".hidden").unwrap();

    disk.save(&path).unwrap();
    let loaded = Disk::load(&path, DiskGeometry::default()).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.list_all(), disk.list_all());
    assert_eq!(loaded.read("a").unwrap(), vec![3u8; 130]);
    assert_eq!(loaded.used_blocks(), disk.used_blocks());
}

#[test]
fn saved_lines_use_tsb_keys_and_end_of_chain_marker() {
    let path = temp_path("format");
    let disk = Disk::new(tiny()).unwrap();

    disk.save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let first = text.lines().next().unwrap();
    assert_eq!(first, format!("0:0:0 01ffffff{}", "00".repeat(12)));
    assert_eq!(text.lines().count(), 8);
}

#[test]
fn load_rejects_incomplete_tables() {
    let path = temp_path("corrupt");
    std::fs::write(&path, format!("0:0:0 01ffffff{}\n", "00".repeat(12))).unwrap();

    let result = Disk::load(&path, tiny());
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(DiskError::Corrupt(_))));
}

#[test]
fn load_of_missing_file_is_an_io_error() {
    let result = Disk::load(temp_path("missing"), tiny());
    assert!(matches!(result, Err(DiskError::Io(_))));
}

/// Saves `disk`, rewrites the line for `key` with `edit`, and loads it back.
fn load_edited(
    disk: &Disk,
    tag: &str,
    key: &str,
    edit: impl Fn(&str) -> String,
) -> Result<Disk, DiskError> {
    let path = temp_path(tag);
    disk.save(&path).unwrap();
    let text: String = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|line| {
            if line.starts_with(&format!("{} ", key)) {
                format!("{}\n", edit(line))
            } else {
                format!("{}\n", line)
            }
        })
        .collect();
    std::fs::write(&path, text).unwrap();
    let result = Disk::load(&path, disk.geometry());
    std::fs::remove_file(&path).unwrap();
    result
}

#[test]
fn load_rejects_cross_linked_chains() {
    let mut disk = Disk::new(tiny()).unwrap();
    disk.create("a").unwrap();
    disk.write_text("a", "secret").unwrap();

    // 1:0:0 holds "secret" but is marked free
    let result = load_edited(&disk, "free_link", "1:0:0", |line| line.replacen(" 01", " 00", 1));
    assert!(matches!(result, Err(DiskError::Corrupt(_))));

    disk.create("b").unwrap();
    // point b's directory entry at a's first data block
    let result = load_edited(&disk, "shared", "0:0:2", |line| {
        line.replacen(" 01010001", " 01010000", 1)
    });
    assert!(matches!(result, Err(DiskError::Corrupt(_))));
}

#[test]
fn load_rejects_stray_headers() {
    let disk = Disk::new(tiny()).unwrap();

    // a free block may not point anywhere
    let result = load_edited(&disk, "dangling", "1:0:2", |line| {
        line.replacen(" 00ffffff", " 00010003", 1)
    });
    assert!(matches!(result, Err(DiskError::Corrupt(_))));

    // nor may a block be in use without belonging to a file
    let result = load_edited(&disk, "orphan", "1:0:3", |line| line.replacen(" 00", " 01", 1));
    assert!(matches!(result, Err(DiskError::Corrupt(_))));
}

#[test]
fn consistent_edits_still_load() {
    let mut disk = Disk::new(tiny()).unwrap();
    disk.create("a").unwrap();
    disk.write_text("a", "secret").unwrap();

    // changing payload bytes only keeps the chains intact
    let loaded = load_edited(&disk, "payload", "1:0:0", |line| {
        line.replacen("736563", "534543", 1)
    })
    .unwrap();
    assert_eq!(loaded.read_text("a").unwrap(), "SECret");
}

#[test]
fn new_rejects_unusable_geometry() {
    for geometry in [
        DiskGeometry { block_size: 2, ..tiny() },
        DiskGeometry { tracks: 1, ..tiny() },
        DiskGeometry { blocks: 0, ..tiny() },
    ] {
        assert!(matches!(Disk::new(geometry), Err(DiskError::InvalidGeometry(_))));
    }
}
