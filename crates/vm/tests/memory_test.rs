use vm::Memory;

#[test]
fn write_slice_refuses_ranges_past_the_end() {
    let mut mem = Memory::new(8);

    assert!(mem.write_slice(6, &[1, 2]));
    assert!(!mem.write_slice(7, &[3, 4]));
    assert!(!mem.write_slice(usize::MAX, &[5]));

    assert_eq!(mem.mem(), &[0, 0, 0, 0, 0, 0, 1, 2]);
}
