use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_ADDRESS, GLYPH_STRIDE, STACK_SIZE};
use crate::error::Fault;
use crate::state::State;

/// Every operation runs after the fetch has already moved pc past it.
pub type Outcome = Result<(), Fault>;

fn skip_if(state: &mut State, condition: bool) {
    if condition {
        state.pc = state.pc.wrapping_add(0x2);
    }
}

/// no operation
pub fn nop(_state: &mut State) -> Outcome {
    Ok(())
}

/// clear
pub fn clr(state: &mut State) -> Outcome {
    state.frame_buffer = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
    state.draw_flag = true;
    Ok(())
}

/// PC = STACK.pop()
pub fn rts(state: &mut State) -> Outcome {
    if state.sp == 0 {
        return Err(Fault::StackUnderflow);
    }
    state.sp -= 1;
    state.pc = state.stack[state.sp];
    Ok(())
}

/// PC = nnn
pub fn jump(state: &mut State, nnn: u16) -> Outcome {
    state.pc = nnn;
    Ok(())
}

/// STACK.push(PC); PC = nnn
pub fn call(state: &mut State, nnn: u16) -> Outcome {
    if state.sp == STACK_SIZE {
        return Err(Fault::StackOverflow { depth: state.sp });
    }
    state.stack[state.sp] = state.pc;
    state.sp += 1;
    state.pc = nnn;
    Ok(())
}

/// if Vx == nn then pc += 2
pub fn ske(state: &mut State, x: u8, nn: u8) -> Outcome {
    let condition = state.v[x as usize] == nn;
    skip_if(state, condition);
    Ok(())
}

/// if Vx != nn then pc += 2
pub fn skne(state: &mut State, x: u8, nn: u8) -> Outcome {
    let condition = state.v[x as usize] != nn;
    skip_if(state, condition);
    Ok(())
}

/// if Vx == Vy then pc += 2
pub fn skre(state: &mut State, x: u8, y: u8) -> Outcome {
    let condition = state.v[x as usize] == state.v[y as usize];
    skip_if(state, condition);
    Ok(())
}

/// if Vx != Vy then pc += 2
pub fn skrne(state: &mut State, x: u8, y: u8) -> Outcome {
    let condition = state.v[x as usize] != state.v[y as usize];
    skip_if(state, condition);
    Ok(())
}

/// Vx = nn
pub fn load(state: &mut State, x: u8, nn: u8) -> Outcome {
    state.v[x as usize] = nn;
    Ok(())
}

/// Vx += nn
/// Wraps on overflow and leaves VF alone
pub fn add(state: &mut State, x: u8, nn: u8) -> Outcome {
    state.v[x as usize] = state.v[x as usize].wrapping_add(nn);
    Ok(())
}

/// Vx = Vy
pub fn mv(state: &mut State, x: u8, y: u8) -> Outcome {
    state.v[x as usize] = state.v[y as usize];
    Ok(())
}

/// Vx |= Vy
pub fn or(state: &mut State, x: u8, y: u8) -> Outcome {
    state.v[x as usize] |= state.v[y as usize];
    Ok(())
}

/// Vx &= Vy
pub fn and(state: &mut State, x: u8, y: u8) -> Outcome {
    state.v[x as usize] &= state.v[y as usize];
    Ok(())
}

/// Vx ^= Vy
pub fn xor(state: &mut State, x: u8, y: u8) -> Outcome {
    state.v[x as usize] ^= state.v[y as usize];
    Ok(())
}

// The flag setting operations below write VF after Vx so the flag survives when x is 0xF.

/// Vx += Vy; VF = carry
pub fn addr(state: &mut State, x: u8, y: u8) -> Outcome {
    let (res, carry) = state.v[x as usize].overflowing_add(state.v[y as usize]);
    state.v[x as usize] = res;
    state.v[0xF] = carry as u8;
    Ok(())
}

/// Vx -= Vy; VF = Vx >= Vy
pub fn sub(state: &mut State, x: u8, y: u8) -> Outcome {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    state.v[x as usize] = vx.wrapping_sub(vy);
    state.v[0xF] = (vx >= vy) as u8;
    Ok(())
}

/// Vx = Vy >> 1; VF = the bit shifted out of Vy
pub fn shr(state: &mut State, x: u8, y: u8) -> Outcome {
    let vy = state.v[y as usize];
    state.v[x as usize] = vy >> 1;
    state.v[0xF] = vy & 0x1;
    Ok(())
}

/// Vx = Vy - Vx; VF = Vy >= Vx
pub fn subn(state: &mut State, x: u8, y: u8) -> Outcome {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    state.v[x as usize] = vy.wrapping_sub(vx);
    state.v[0xF] = (vy >= vx) as u8;
    Ok(())
}

/// Vx = Vy << 1; VF = the bit shifted out of Vy
pub fn shl(state: &mut State, x: u8, y: u8) -> Outcome {
    let vy = state.v[y as usize];
    state.v[x as usize] = vy << 1;
    state.v[0xF] = vy >> 7;
    Ok(())
}

/// I = nnn
pub fn loadi(state: &mut State, nnn: u16) -> Outcome {
    state.i = nnn;
    Ok(())
}

/// PC = V0 + nnn
pub fn jumpi(state: &mut State, nnn: u16) -> Outcome {
    state.pc = nnn + u16::from(state.v[0x0]);
    Ok(())
}

/// Vx = random_byte & nn
pub fn rand(state: &mut State, x: u8, nn: u8, random_byte: u8) -> Outcome {
    state.v[x as usize] = random_byte & nn;
    Ok(())
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the sprite at memory I..I+n onto the FrameBuffer.
/// The origin wraps around the screen but the sprite itself is clipped at the edges.
/// Sets VF if any pixels are erased.
pub fn draw(state: &mut State, x: u8, y: u8, n: u8) -> Outcome {
    let origin_x = state.v[x as usize] as usize % DISPLAY_WIDTH;
    let origin_y = state.v[y as usize] as usize % DISPLAY_HEIGHT;
    let rows = (n as usize).min(DISPLAY_HEIGHT - origin_y);
    let columns = (DISPLAY_WIDTH - origin_x).min(8);

    // Copy the sprite out first so a bad I faults before anything is touched
    let mut sprite = [0u8; 15];
    let source = state
        .memory_slice(state.i as usize, rows)
        .map_err(|address| Fault::MemoryOutOfBounds { address })?;
    sprite[..rows].copy_from_slice(source);

    state.v[0xF] = 0x0;
    for (row, pattern) in sprite[..rows].iter().enumerate() {
        let line = &mut state.frame_buffer[origin_y + row];
        for column in 0..columns {
            let bit = (pattern >> (7 - column)) & 0x1;
            if bit == 0x1 {
                let pixel = &mut line[origin_x + column];
                state.v[0xF] |= *pixel;
                *pixel ^= bit;
            }
        }
    }

    state.draw_flag = true;
    Ok(())
}

/// if key[Vx] is pressed then pc += 2
pub fn skpr(state: &mut State, x: u8) -> Outcome {
    let condition = is_pressed(state, state.v[x as usize]);
    skip_if(state, condition);
    Ok(())
}

/// if key[Vx] isn't pressed then pc += 2
pub fn skup(state: &mut State, x: u8) -> Outcome {
    let condition = !is_pressed(state, state.v[x as usize]);
    skip_if(state, condition);
    Ok(())
}

// Only the low nibble of Vx names a key
fn is_pressed(state: &State, key: u8) -> bool {
    state.pressed_keys[(key & 0xF) as usize]
}

/// Vx = DT
pub fn moved(state: &mut State, x: u8) -> Outcome {
    state.v[x as usize] = state.delay_timer;
    Ok(())
}

/// Vx = first pressed key, otherwise run this instruction again
/// Keys are scanned from 0 to F so the lowest pressed key wins.
pub fn keyd(state: &mut State, x: u8) -> Outcome {
    match state.pressed_keys.iter().position(|&pressed| pressed) {
        Some(key) => {
            state.v[x as usize] = key as u8;
            state.awaiting_key = None;
        }
        None => {
            state.pc = state.pc.wrapping_sub(0x2);
            state.awaiting_key = Some(x);
        }
    }
    Ok(())
}

/// DT = Vx
pub fn loads(state: &mut State, x: u8) -> Outcome {
    state.delay_timer = state.v[x as usize];
    Ok(())
}

/// ST = Vx
pub fn ld(state: &mut State, x: u8) -> Outcome {
    state.sound_timer = state.v[x as usize];
    Ok(())
}

/// I += Vx
pub fn addi(state: &mut State, x: u8) -> Outcome {
    state.i = state.i.wrapping_add(u16::from(state.v[x as usize]));
    Ok(())
}

/// I = address of the glyph for Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(state: &mut State, x: u8) -> Outcome {
    state.i = FONT_ADDRESS + u16::from(state.v[x as usize]) * GLYPH_STRIDE;
    Ok(())
}

/// mem[I..I+3] = bcd(Vx)
/// Store the hundreds, tens and ones of Vx in memory starting at address I
pub fn bcd(state: &mut State, x: u8) -> Outcome {
    let vx = state.v[x as usize];
    let digits = [vx / 100, vx / 10 % 10, vx % 10];
    state
        .memory_slice_mut(state.i as usize, digits.len())
        .map_err(|address| Fault::MemoryOutOfBounds { address })?
        .copy_from_slice(&digits);
    Ok(())
}

/// mem[I..=I+x] = V0..=Vx; I += x + 1
pub fn stor(state: &mut State, x: u8) -> Outcome {
    let count = x as usize + 1;
    let registers = state.v;
    state
        .memory_slice_mut(state.i as usize, count)
        .map_err(|address| Fault::MemoryOutOfBounds { address })?
        .copy_from_slice(&registers[..count]);
    state.i = state.i.wrapping_add(count as u16);
    Ok(())
}

/// V0..=Vx = mem[I..=I+x]; I += x + 1
pub fn read(state: &mut State, x: u8) -> Outcome {
    let count = x as usize + 1;
    let mut registers = [0u8; 16];
    registers[..count].copy_from_slice(
        state
            .memory_slice(state.i as usize, count)
            .map_err(|address| Fault::MemoryOutOfBounds { address })?,
    );
    state.v[..count].copy_from_slice(&registers[..count]);
    state.i = state.i.wrapping_add(count as u16);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MEMORY_SIZE;

    #[test]
    fn test_flag_is_written_last() {
        let mut state = State::new();
        state.v[0xF] = 0xF0;
        state.v[0x1] = 0x12;
        addr(&mut state, 0xF, 0x1).unwrap();
        // 0xF0 + 0x12 overflows, the carry wins over the sum
        assert_eq!(state.v[0xF], 0x1);

        state.v[0xF] = 0x0A;
        state.v[0x1] = 0x0E;
        sub(&mut state, 0xF, 0x1).unwrap();
        assert_eq!(state.v[0xF], 0x0);

        state.v[0x1] = 0b1000_0010;
        shr(&mut state, 0xF, 0x1).unwrap();
        // 0b0100_0001 would be the shifted value, but the shifted out bit was 0
        assert_eq!(state.v[0xF], 0x0);

        state.v[0xF] = 0x01;
        state.v[0x1] = 0x05;
        subn(&mut state, 0xF, 0x1).unwrap();
        // 0x05 - 0x01 = 0x04, no borrow
        assert_eq!(state.v[0xF], 0x1);

        state.v[0x1] = 0b0100_0001;
        shl(&mut state, 0xF, 0x1).unwrap();
        // 0b1000_0010 would be the shifted value, but the shifted out bit was 0
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_shifts_use_vy() {
        let mut state = State::new();
        state.v[0x1] = 0x00;
        state.v[0x2] = 0b1000_0001;
        shr(&mut state, 0x1, 0x2).unwrap();
        assert_eq!(state.v[0x1], 0b0100_0000);
        assert_eq!(state.v[0xF], 0x1);

        shl(&mut state, 0x1, 0x2).unwrap();
        assert_eq!(state.v[0x1], 0b0000_0010);
        assert_eq!(state.v[0xF], 0x1);
        assert_eq!(state.v[0x2], 0b1000_0001);
    }

    #[test]
    fn test_equal_operands_do_not_borrow() {
        let mut state = State::new();
        state.v[0x1] = 0x42;
        state.v[0x2] = 0x42;
        sub(&mut state, 0x1, 0x2).unwrap();
        assert_eq!(state.v[0x1], 0x0);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_draw_clips_instead_of_wrapping() {
        let mut state = State::new();
        state.i = 0x300;
        state.memory[0x300] = 0xFF;
        state.v[0x0] = (DISPLAY_WIDTH - 4) as u8;
        state.v[0x1] = (DISPLAY_HEIGHT - 1) as u8;
        draw(&mut state, 0x0, 0x1, 0x2).unwrap();
        let last = &state.frame_buffer[DISPLAY_HEIGHT - 1];
        assert_eq!(last[DISPLAY_WIDTH - 4..], [1, 1, 1, 1]);
        assert_eq!(last[..4], [0, 0, 0, 0]);
        assert!(state.frame_buffer[0].iter().all(|&p| p == 0));
    }

    #[test]
    fn test_draw_wraps_origin() {
        let mut state = State::new();
        state.i = 0x300;
        state.memory[0x300] = 0x80;
        state.v[0x0] = (DISPLAY_WIDTH + 3) as u8;
        state.v[0x1] = (DISPLAY_HEIGHT + 2) as u8;
        draw(&mut state, 0x0, 0x1, 0x1).unwrap();
        assert_eq!(state.frame_buffer[2][3], 1);
    }

    #[test]
    fn test_draw_out_of_bounds_leaves_screen_alone() {
        let mut state = State::new();
        state.i = (MEMORY_SIZE - 1) as u16;
        state.v[0xF] = 0x7;
        let result = draw(&mut state, 0x0, 0x0, 0x2);
        assert_eq!(result, Err(Fault::MemoryOutOfBounds { address: MEMORY_SIZE }));
        assert_eq!(state.v[0xF], 0x7);
        assert!(!state.draw_flag);
    }

    #[test]
    fn test_stor_out_of_bounds_writes_nothing() {
        let mut state = State::new();
        state.i = (MEMORY_SIZE - 2) as u16;
        state.v[0x0..0x3].copy_from_slice(&[0x1, 0x2, 0x3]);
        assert_eq!(
            stor(&mut state, 0x2),
            Err(Fault::MemoryOutOfBounds { address: MEMORY_SIZE })
        );
        assert_eq!(state.memory[MEMORY_SIZE - 2..], [0, 0]);
        assert_eq!(state.i, (MEMORY_SIZE - 2) as u16);
    }

    #[test]
    fn test_keyd_lowest_key_wins() {
        let mut state = State::new();
        state.pc = 0x202;
        state.pressed_keys[0x9] = true;
        state.pressed_keys[0x3] = true;
        keyd(&mut state, 0x4).unwrap();
        assert_eq!(state.v[0x4], 0x3);
        assert_eq!(state.pc, 0x202);
    }

    #[test]
    fn test_keyd_records_waiting_register() {
        let mut state = State::new();
        state.pc = 0x202;
        keyd(&mut state, 0x4).unwrap();
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.awaiting_key, Some(0x4));
    }
}
