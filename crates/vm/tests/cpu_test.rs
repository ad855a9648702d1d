mod common;

use common::TestBus;
use vm::{Cpu, Instruction, Syscall};

fn running_cpu() -> Cpu {
    let mut cpu = Cpu::new();
    cpu.executing = true;
    cpu
}

/// Runs until BRK is reported or `max` cycles pass.
fn run(cpu: &mut Cpu, bus: &mut TestBus, max: usize) {
    for _ in 0..max {
        cpu.cycle(bus);
        if bus.syscalls.contains(&Syscall::Exit) || !bus.faults.is_empty() {
            break;
        }
    }
}

#[test]
fn load_store_compare_program() {
    let program = [0xA9, 0x05, 0x8D, 0x00, 0x00, 0xAE, 0x00, 0x00, 0xEC, 0x00, 0x00, 0x00];
    let mut bus = TestBus::with_program(&program, 256);
    let mut cpu = running_cpu();

    run(&mut cpu, &mut bus, 10);

    assert_eq!(cpu.acc, 5);
    assert_eq!(bus.mem[0], 5);
    assert_eq!(cpu.x_reg, 5);
    assert!(cpu.z_flag);
    assert_eq!(bus.syscalls, vec![Syscall::Exit]);
    assert_eq!(bus.trace.len(), 5);
}

#[test]
fn add_with_carry_wraps_at_byte_boundary() {
    // LDA #$F0; STA $0010; ADC $0010; BRK
    let program = [0xA9, 0xF0, 0x8D, 0x10, 0x00, 0x6D, 0x10, 0x00, 0x00];
    let mut bus = TestBus::with_program(&program, 32);
    let mut cpu = running_cpu();

    run(&mut cpu, &mut bus, 10);

    assert_eq!(cpu.acc, 0xE0);
}

#[test]
fn increment_wraps_and_writes_back() {
    let program = [0xEE, 0x04, 0x00, 0x00, 0xFF];
    let mut bus = TestBus::with_program(&program, 16);
    let mut cpu = running_cpu();

    assert_eq!(cpu.cycle(&mut bus), Some(Instruction::Increment { addr: 4 }));
    assert_eq!(bus.mem[4], 0x00);
    assert_eq!(cpu.pc, 3);
}

#[test]
fn branch_taken_wraps_modulo_limit() {
    // LDX #1; CPX $0010 (holds 0, so z = 0); BNE $F0
    let program = [0xA2, 0x01, 0xEC, 0x10, 0x00, 0xD0, 0xF0];
    let mut bus = TestBus::with_program(&program, 256);
    let mut cpu = running_cpu();

    cpu.cycle(&mut bus);
    cpu.cycle(&mut bus);
    assert!(!cpu.z_flag);
    cpu.cycle(&mut bus);

    // (7 + 0xF0) mod 256
    assert_eq!(cpu.pc, (7 + 0xF0) % 256);
}

#[test]
fn branch_backwards_through_wraparound() {
    // loop: INC $0020; LDX #3; CPX $0020; BNE back to INC
    // BNE sits at 8, next pc is 10, target 0 => offset 256 - 10 = 0xF6
    let program = [
        0xEE, 0x20, 0x00, 0xA2, 0x03, 0xEC, 0x20, 0x00, 0xD0, 0xF6, 0x00,
    ];
    let mut bus = TestBus::with_program(&program, 256);
    let mut cpu = running_cpu();

    run(&mut cpu, &mut bus, 100);

    assert_eq!(bus.mem[0x20], 3);
    assert_eq!(bus.syscalls, vec![Syscall::Exit]);
}

#[test]
fn branch_not_taken_falls_through() {
    let program = [0xA2, 0x00, 0xEC, 0x10, 0x00, 0xD0, 0x05, 0xEA];
    let mut bus = TestBus::with_program(&program, 32);
    let mut cpu = running_cpu();

    cpu.cycle(&mut bus);
    cpu.cycle(&mut bus);
    assert!(cpu.z_flag);
    cpu.cycle(&mut bus);
    assert_eq!(cpu.pc, 7);
}

#[test]
fn print_integer_syscall() {
    let program = [0xA2, 0x01, 0xA0, 0x2A, 0xFF, 0x00];
    let mut bus = TestBus::with_program(&program, 32);
    let mut cpu = running_cpu();

    run(&mut cpu, &mut bus, 10);

    assert_eq!(bus.syscalls, vec![Syscall::PrintInteger(42), Syscall::Exit]);
}

#[test]
fn print_string_syscall_reads_until_terminator() {
    let mut program = vec![0xA2, 0x02, 0xA0, 0x10, 0xFF, 0x00];
    program.resize(0x10, 0);
    program.extend_from_slice(b"hi there\0");
    let mut bus = TestBus::with_program(&program, 64);
    let mut cpu = running_cpu();

    run(&mut cpu, &mut bus, 10);

    assert_eq!(
        bus.syscalls,
        vec![Syscall::PrintString("hi there".to_string()), Syscall::Exit]
    );
}

#[test]
fn unknown_syscall_selector_is_ignored() {
    let program = [0xA2, 0x07, 0xFF, 0x00];
    let mut bus = TestBus::with_program(&program, 16);
    let mut cpu = running_cpu();

    run(&mut cpu, &mut bus, 10);

    assert_eq!(bus.syscalls, vec![Syscall::Exit]);
}

#[test]
fn out_of_bounds_store_faults_without_writing() {
    // LDA #$07; STA $0100 with a 16 byte partition
    let program = [0xA9, 0x07, 0x8D, 0x00, 0x01];
    let mut bus = TestBus::with_program(&program, 16);
    let before = bus.mem.clone();
    let mut cpu = running_cpu();

    cpu.cycle(&mut bus);
    assert_eq!(cpu.cycle(&mut bus), None);

    assert_eq!(bus.faults, vec![0x100]);
    assert_eq!(cpu.pc, 2, "pc must not advance past a faulting instruction");
    assert_eq!(bus.mem, before);
}

#[test]
fn operand_fetch_past_limit_faults() {
    // AD at the last byte: its operands lie outside the partition
    let mut program = vec![0xEA; 7];
    program.push(0xAD);
    let mut bus = TestBus::with_program(&program, 8);
    let mut cpu = running_cpu();

    run(&mut cpu, &mut bus, 20);

    assert_eq!(bus.faults, vec![8]);
    assert_eq!(cpu.pc, 7);
}

#[test]
fn invalid_opcode_is_reported() {
    let program = [0xEA, 0x42];
    let mut bus = TestBus::with_program(&program, 8);
    let mut cpu = running_cpu();

    cpu.cycle(&mut bus);
    assert_eq!(cpu.cycle(&mut bus), None);

    assert_eq!(bus.syscalls, vec![Syscall::InvalidOpcode { pc: 1, opcode: 0x42 }]);
}

#[test]
fn idle_cpu_does_nothing() {
    let mut bus = TestBus::with_program(&[0xA9, 0x01], 8);
    let mut cpu = Cpu::new();

    assert_eq!(cpu.cycle(&mut bus), None);
    assert_eq!(cpu.acc, 0);
    assert!(bus.trace.is_empty());
}

#[test]
fn registers_round_trip_through_snapshot() {
    let mut cpu = running_cpu();
    cpu.pc = 9;
    cpu.acc = 1;
    cpu.x_reg = 2;
    cpu.y_reg = 3;
    cpu.z_flag = true;
    let saved = cpu.registers();
    assert!(cpu.snapshot().executing);
    assert_eq!(cpu.snapshot().registers, saved);

    cpu.reset();
    assert!(!cpu.executing);
    assert_eq!(cpu.pc, 0);

    cpu.restore(&saved);
    assert_eq!(cpu.registers(), saved);
}
