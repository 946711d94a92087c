use crate::{
    decode::OpCodes,
    emulator::Emulator,
    error::Chip8Error,
    memory::{MAX_PROGRAM_SIZE, PROGRAM_START},
};

fn emulator_with(program: &[u16]) -> Emulator {
    let rom: Vec<u8> = program.iter().flat_map(|op| op.to_be_bytes()).collect();
    let mut emu = Emulator::with_seed(0xC8);
    emu.load_rom(&rom).unwrap();
    emu
}

fn run(emu: &mut Emulator, cycles: usize) {
    for _ in 0..cycles {
        emu.step().unwrap();
    }
}

#[test]
fn set_register_for_every_x() {
    for x in 0..16u16 {
        let mut emu = emulator_with(&[0x6000 | (x << 8) | 0x5A]);
        emu.step().unwrap();
        assert_eq!(emu.registers()[x as usize], 0x5A);
        assert_eq!(emu.program_counter(), PROGRAM_START + 2);
        assert_eq!(emu.current_opcode(), 0x6000 | (x << 8) | 0x5A);
    }
}

#[test]
fn add_constant_wraps_without_flag() {
    let mut emu = emulator_with(&[0x62FF, 0x7203]);
    run(&mut emu, 2);
    assert_eq!(emu.registers()[2], 0x02);
    assert_eq!(emu.registers()[0xF], 0);
}

#[test]
fn add_registers_sets_carry() {
    let mut emu = emulator_with(&[0x60FF, 0x6102, 0x8014]);
    run(&mut emu, 3);
    assert_eq!(emu.registers()[0], 0x01);
    assert_eq!(emu.registers()[0xF], 1);

    let mut emu = emulator_with(&[0x6010, 0x6102, 0x8014]);
    run(&mut emu, 3);
    assert_eq!(emu.registers()[0], 0x12);
    assert_eq!(emu.registers()[0xF], 0);
}

#[test]
fn subtract_sets_no_borrow_flag() {
    let mut emu = emulator_with(&[0x6001, 0x6102, 0x8015]);
    run(&mut emu, 3);
    assert_eq!(emu.registers()[0], 0xFF);
    assert_eq!(emu.registers()[0xF], 0);

    let mut emu = emulator_with(&[0x6005, 0x6102, 0x8015]);
    run(&mut emu, 3);
    assert_eq!(emu.registers()[0], 0x03);
    assert_eq!(emu.registers()[0xF], 1);

    // equal operands leave the flag clear
    let mut emu = emulator_with(&[0x6007, 0x6107, 0x8015]);
    run(&mut emu, 3);
    assert_eq!(emu.registers()[0], 0x00);
    assert_eq!(emu.registers()[0xF], 0);
}

#[test]
fn subtract_backward() {
    let mut emu = emulator_with(&[0x6005, 0x6102, 0x8017]);
    run(&mut emu, 3);
    assert_eq!(emu.registers()[0], 0xFD);
    assert_eq!(emu.registers()[0xF], 0);

    let mut emu = emulator_with(&[0x6002, 0x6105, 0x8017]);
    run(&mut emu, 3);
    assert_eq!(emu.registers()[0], 0x03);
    assert_eq!(emu.registers()[0xF], 1);

    let mut emu = emulator_with(&[0x6007, 0x6107, 0x8017]);
    run(&mut emu, 3);
    assert_eq!(emu.registers()[0], 0x00);
    assert_eq!(emu.registers()[0xF], 0);
}

#[test]
fn bitwise_ops() {
    let mut emu = emulator_with(&[
        0x60F0, 0x610F, 0x8010, // V0 = V1
        0x62F0, 0x8211, // V2 |= V1
        0x63FC, 0x8312, // V3 &= V1
        0x64FF, 0x8413, // V4 ^= V1
    ]);
    run(&mut emu, 9);
    let v = emu.registers();
    assert_eq!(v[0], 0x0F);
    assert_eq!(v[2], 0xFF);
    assert_eq!(v[3], 0x0C);
    assert_eq!(v[4], 0xF0);
}

#[test]
fn shifts_store_dropped_bit() {
    let mut emu = emulator_with(&[0x6005, 0x8006]);
    run(&mut emu, 2);
    assert_eq!(emu.registers()[0], 0x02);
    assert_eq!(emu.registers()[0xF], 1);

    let mut emu = emulator_with(&[0x6081, 0x800E]);
    run(&mut emu, 2);
    assert_eq!(emu.registers()[0], 0x02);
    assert_eq!(emu.registers()[0xF], 1);

    let mut emu = emulator_with(&[0x6040, 0x800E]);
    run(&mut emu, 2);
    assert_eq!(emu.registers()[0], 0x80);
    assert_eq!(emu.registers()[0xF], 0);
}

#[test]
fn skips() {
    // 3XKK taken, 4XKK not taken, 5XY0 taken, 9XY0 not taken
    let mut emu = emulator_with(&[0x6A07, 0x6B07, 0x3A07]);
    run(&mut emu, 3);
    assert_eq!(emu.program_counter(), 0x208);

    let mut emu = emulator_with(&[0x6A07, 0x4A07]);
    run(&mut emu, 2);
    assert_eq!(emu.program_counter(), 0x204);

    let mut emu = emulator_with(&[0x6A07, 0x6B07, 0x5AB0]);
    run(&mut emu, 3);
    assert_eq!(emu.program_counter(), 0x208);

    let mut emu = emulator_with(&[0x6A07, 0x6B07, 0x9AB0]);
    run(&mut emu, 3);
    assert_eq!(emu.program_counter(), 0x206);

    let mut emu = emulator_with(&[0x6A07, 0x4A08]);
    run(&mut emu, 2);
    assert_eq!(emu.program_counter(), 0x206);
}

#[test]
fn jumps() {
    let mut emu = emulator_with(&[0x1234]);
    emu.step().unwrap();
    assert_eq!(emu.program_counter(), 0x234);

    let mut emu = emulator_with(&[0x6010, 0xB300]);
    run(&mut emu, 2);
    assert_eq!(emu.program_counter(), 0x310);
}

#[test]
fn call_and_return_round_trip() {
    // 0x200: CALL 0x206; 0x202: LD V0, 1; 0x204: JP 0x204; 0x206: RET
    let mut emu = emulator_with(&[0x2206, 0x6001, 0x1204, 0x00EE]);
    assert_eq!(emu.stack_pointer(), 0);

    emu.step().unwrap();
    assert_eq!(emu.program_counter(), 0x206);
    assert_eq!(emu.stack(), &[0x202u16]);
    assert_eq!(emu.stack_pointer(), 1);

    emu.step().unwrap();
    assert_eq!(emu.program_counter(), 0x202);
    assert_eq!(emu.stack_pointer(), 0);
    assert!(emu.stack().is_empty());

    emu.step().unwrap();
    assert_eq!(emu.registers()[0], 1);
}

#[test]
fn stack_overflow_is_reported() {
    // recursive call into itself
    let mut emu = emulator_with(&[0x2200]);
    run(&mut emu, 16);
    assert_eq!(emu.stack_pointer(), 16);
    assert_eq!(emu.step(), Err(Chip8Error::StackOverflow { pc: 0x200 }));
    assert_eq!(emu.stack_pointer(), 16);
}

#[test]
fn return_with_empty_stack_is_reported() {
    let mut emu = emulator_with(&[0x00EE]);
    assert_eq!(emu.step(), Err(Chip8Error::StackUnderflow { pc: 0x200 }));
}

#[test]
fn fetch_out_of_memory_is_reported() {
    let mut emu = emulator_with(&[0x1FFF]);
    emu.step().unwrap();
    assert_eq!(
        emu.step(),
        Err(Chip8Error::ProgramCounterOutOfBounds { pc: 0xFFF })
    );
}

#[test]
fn index_instructions() {
    let mut emu = emulator_with(&[0xA123, 0x6010, 0xF01E]);
    run(&mut emu, 3);
    assert_eq!(emu.index_register(), 0x133);

    let mut emu = emulator_with(&[0x600A, 0xF029]);
    run(&mut emu, 2);
    assert_eq!(emu.index_register(), 0x50 + 5 * 0xA);
}

#[test]
fn add_to_index_has_no_flag() {
    let mut emu = emulator_with(&[0xAFFF, 0x6001, 0xF01E]);
    run(&mut emu, 3);
    assert_eq!(emu.index_register(), 0x1000);
    assert_eq!(emu.registers()[0xF], 0);
}

#[test]
fn bcd() {
    let mut emu = emulator_with(&[0x609C, 0xA300, 0xF033]);
    run(&mut emu, 3);
    let mem = emu.memory();
    assert_eq!([mem.get(0x300), mem.get(0x301), mem.get(0x302)], [1, 5, 6]);
    assert_eq!(emu.index_register(), 0x300);

    let mut emu = emulator_with(&[0x6007, 0xA300, 0xF033]);
    run(&mut emu, 3);
    let mem = emu.memory();
    assert_eq!([mem.get(0x300), mem.get(0x301), mem.get(0x302)], [0, 0, 7]);
}

#[test]
fn store_and_load_registers_inclusive() {
    let mut emu = emulator_with(&[0x6011, 0x6122, 0x6233, 0x6344, 0xA300, 0xF255]);
    run(&mut emu, 6);
    let mem = emu.memory();
    assert_eq!(
        [mem.get(0x300), mem.get(0x301), mem.get(0x302), mem.get(0x303)],
        [0x11, 0x22, 0x33, 0x00]
    );

    let mut emu = emulator_with(&[0xA206, 0xF165, 0x1204, 0xBEEF]);
    run(&mut emu, 2);
    assert_eq!(emu.registers()[0], 0xBE);
    assert_eq!(emu.registers()[1], 0xEF);
    assert_eq!(emu.registers()[2], 0x00);
    assert_eq!(emu.index_register(), 0x206);
}

#[test]
fn random_is_masked_and_reproducible() {
    let mut a = emulator_with(&[0xC00F, 0xC1FF, 0xC200]);
    let mut b = emulator_with(&[0xC00F, 0xC1FF, 0xC200]);
    run(&mut a, 3);
    run(&mut b, 3);
    assert_eq!(a.registers(), b.registers());
    assert_eq!(a.registers()[0] & 0xF0, 0);
    assert_eq!(a.registers()[2], 0);
}

#[test]
fn draw_font_glyph() {
    // draw "0" at (0, 0)
    let mut emu = emulator_with(&[0x6000, 0xF029, 0xD005]);
    run(&mut emu, 3);
    let fb = emu.display();
    assert_eq!(fb.rows().next().unwrap()[..8], [1u8, 1, 1, 1, 0, 0, 0, 0]);
    assert_eq!(fb.pixel(0, 1), 1);
    assert_eq!(fb.pixel(3, 1), 1);
    assert_eq!(fb.pixel(1, 1), 0);
    assert_eq!(emu.registers()[0xF], 0);
    assert_eq!(emu.index_register(), 0x50);
}

#[test]
fn draw_twice_restores_display_and_reports_collision() {
    let program = [0x6A3E, 0x6B1E, 0xA050, 0xDAB5, 0xDAB5];
    let mut emu = emulator_with(&program);
    run(&mut emu, 4);
    assert_eq!(emu.registers()[0xF], 0);
    // third glyph row wrapped to the left and top edges
    assert_eq!(emu.display().pixel(62, 0), 1);
    assert_eq!(emu.display().pixel(1, 0), 1);
    assert_eq!(emu.display().pixel(0, 0), 0);

    emu.step().unwrap();
    assert_eq!(emu.registers()[0xF], 1);
    assert!(emu.display().as_slice().iter().all(|&p| p == 0));
}

#[test]
fn draw_tallest_sprite() {
    // 15 rows of 0x80 starting at 0x300, drawn at (0, 0)
    let mut program = vec![0xA300, 0x6000, 0xD00F, 0x1206];
    program.resize(0x80, 0x0000);
    program.extend([0x8080u16; 8]);
    let mut emu = emulator_with(&program);
    run(&mut emu, 3);
    for y in 0..15 {
        assert_eq!(emu.display().pixel(0, y), 1, "row {y}");
    }
    assert_eq!(emu.display().pixel(0, 15), 0);
    assert_eq!(emu.registers()[0xF], 0);
}

#[test]
fn draw_blank_sprite_twice_never_collides() {
    // sprite at 0x300 is all zeroes
    let mut emu = emulator_with(&[0xA300, 0xD003, 0xD003]);
    run(&mut emu, 3);
    assert_eq!(emu.registers()[0xF], 0);
}

#[test]
fn clear_screen() {
    let mut emu = emulator_with(&[0xA050, 0xD005, 0x00E0]);
    run(&mut emu, 2);
    assert!(emu.display().as_slice().iter().any(|&p| p == 1));
    emu.step().unwrap();
    assert!(emu.display().as_slice().iter().all(|&p| p == 0));
}

#[test]
fn key_skips() {
    let mut emu = emulator_with(&[0x6005, 0xE09E]);
    emu.keypad_mut().set(0x5, true);
    run(&mut emu, 2);
    assert_eq!(emu.program_counter(), 0x206);

    let mut emu = emulator_with(&[0x6005, 0xE0A1]);
    emu.keypad_mut().set(0x5, true);
    run(&mut emu, 2);
    assert_eq!(emu.program_counter(), 0x204);

    let mut emu = emulator_with(&[0x6005, 0xE0A1]);
    run(&mut emu, 2);
    assert_eq!(emu.program_counter(), 0x206);
}

#[test]
fn get_key_waits_until_pressed() {
    let mut emu = emulator_with(&[0xF30A, 0x6001]);
    for _ in 0..5 {
        assert_eq!(emu.step(), Ok(OpCodes::GetKey(3)));
        assert_eq!(emu.program_counter(), 0x200);
    }

    emu.keypad_mut().set(0x2, true);
    emu.keypad_mut().set(0x9, true);
    emu.step().unwrap();
    assert_eq!(emu.registers()[3], 0x9);
    assert_eq!(emu.program_counter(), 0x202);
}

#[test]
fn timers_tick_once_per_step() {
    let mut emu = emulator_with(&[0x6003, 0xF015, 0xF018, 0xF107, 0x1208]);
    run(&mut emu, 3);
    // both set to 3, delay already ticked once more than sound
    assert_eq!(emu.delay_timer(), 1);
    assert_eq!(emu.sound_timer(), 2);

    emu.step().unwrap();
    assert_eq!(emu.registers()[1], 1);
    assert_eq!(emu.delay_timer(), 0);

    run(&mut emu, 5);
    assert_eq!(emu.delay_timer(), 0);
    assert_eq!(emu.sound_timer(), 0);
}

#[test]
fn timers_keep_ticking_while_waiting_for_key() {
    let mut emu = emulator_with(&[0x6005, 0xF015, 0xF00A]);
    run(&mut emu, 2);
    assert_eq!(emu.delay_timer(), 4);
    run(&mut emu, 10);
    assert_eq!(emu.delay_timer(), 0);
}

#[test]
fn unknown_opcode_is_a_no_op() {
    let mut emu = emulator_with(&[0x6042, 0xF0FF]);
    emu.step().unwrap();
    let before = emu.snapshot();

    assert_eq!(emu.step(), Ok(OpCodes::Unknown(0xF0FF)));
    let after = emu.snapshot();
    assert_eq!(after.program_counter, before.program_counter + 2);
    assert_eq!(after.registers, before.registers);
    assert_eq!(after.display, before.display);
    assert_eq!(after.current_opcode, 0xF0FF);
}

#[test]
fn load_largest_rom() {
    let mut emu = Emulator::with_seed(1);
    assert!(emu.load_rom(&vec![0xAB; MAX_PROGRAM_SIZE]).is_ok());
    assert_eq!(emu.memory().get(0xFFF), 0xAB);
}

#[test]
fn oversized_rom_leaves_machine_untouched() {
    let mut emu = emulator_with(&[0x6042, 0xA050, 0xD005]);
    run(&mut emu, 3);
    let before = emu.snapshot();

    let err = emu.load_rom(&vec![0; MAX_PROGRAM_SIZE + 1]).unwrap_err();
    assert_eq!(
        err,
        Chip8Error::ProgramTooLarge {
            size: MAX_PROGRAM_SIZE + 1,
            max_size: MAX_PROGRAM_SIZE
        }
    );
    assert_eq!(emu.snapshot(), before);
    assert_eq!(emu.memory().get(0x200), 0x60);
}

#[test]
fn load_resets_machine_but_keeps_font_and_keypad() {
    let mut emu = emulator_with(&[0x6042, 0xF015, 0x2300, 0xA050, 0xD005]);
    emu.keypad_mut().set(0x1, true);
    run(&mut emu, 3);

    emu.load_rom(&[0x00, 0xE0]).unwrap();
    let snap = emu.snapshot();
    assert_eq!(snap.registers, [0; 16]);
    assert_eq!(snap.program_counter, PROGRAM_START);
    assert_eq!(snap.index_register, 0);
    assert!(snap.stack.is_empty());
    assert_eq!(snap.delay_timer, 0);
    assert_eq!(snap.current_opcode, 0);
    assert_eq!(emu.memory().get(0x202), 0);
    assert_eq!(emu.memory().get(0x50), 0xF0);
    assert!(emu.keypad().is_pressed(0x1));
}

#[test]
fn reset_clears_program_space() {
    let mut emu = emulator_with(&[0x6042, 0xA050, 0xD005]);
    run(&mut emu, 3);
    emu.reset();
    assert_eq!(emu.memory().get(0x200), 0);
    assert_eq!(emu.registers()[0], 0);
    assert!(emu.display().as_slice().iter().all(|&p| p == 0));
    assert_eq!(emu.memory().get(0x51), 0x90);
}

#[test]
fn snapshot_dump_lists_state() {
    let mut emu = emulator_with(&[0x6A2F, 0x2300]);
    run(&mut emu, 2);
    let dump = emu.snapshot().to_string();
    assert!(dump.contains("CALL 0x300"));
    assert!(dump.contains("VA=0x2f"));
    assert!(dump.contains("stack [0x204] sp 1"));
}
