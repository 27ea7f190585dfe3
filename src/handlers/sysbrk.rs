//! SYSBRK: the 6502 BRK handler (spec.md §4.G, §7 "Error handling design").
//!
//! A BRK pushes `PCH, PCL, P` (PC already pointing two bytes past the BRK
//! opcode) then jumps through the hardware vector at $FFFE, which this
//! crate's firmware points at [`crate::addr::EP_SYSBRK`]. The byte
//! immediately after the BRK is the fault/error code; what follows it is
//! the error message, BBC-style (0-terminated). Real MOS stops there and
//! leaves $FD/$FE pointing at the fault *code* byte - this emulation
//! points them one byte further on, at the message, per spec.md §8
//! invariant 4 and the fixed Open Question in DESIGN.md.

use crate::addr::{VECTOR_BRKV, ZP_ACCUMULATOR, ZP_ERROR_POINTER};
use crate::environment::Environment;

pub fn exec_sysbrk(env: &mut Environment) {
    let sp = env.cpu.sp();
    let (a, x, y) = (env.cpu.a(), env.cpu.x(), env.cpu.y());

    let p_stacked = env.mem().read(0x0100 + sp.wrapping_add(1) as u16);
    let pushed_pc = env.mem().read_word(0x0100 + sp.wrapping_add(2) as u16);
    let fault_addr = pushed_pc.wrapping_sub(1);

    let fault_number = env.mem().read(fault_addr);
    let fault_string = env.mem().read_string(fault_addr + 1, 0);

    env.mem_mut().write(ZP_ACCUMULATOR, a);
    env.mem_mut().write_word(ZP_ERROR_POINTER, fault_addr + 1);

    // Isolate the BRK status bit the way real MOS does (bit 4 of P).
    let brk_p = p_stacked & 0x10;
    env.cpu.set_axyp(brk_p, x, y, brk_p);

    let brkv = env.mem().read_word(VECTOR_BRKV);
    env.cpu.set_pc(brkv);

    env.log(&format!("BREAK(ERR={fault_number:02x}, '{fault_string}')"));

    if env.panic_on_err && fault_number == 0 && fault_string.is_empty() {
        panic!("SYSBRK fired on zeroed memory: no fault block was set up");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MockConsole;

    fn push_brk_frame(env: &mut Environment, fault_addr: u16) {
        // Simulate the hardware: PCH, PCL, P pushed in that order, SP
        // decremented each time, the BRK vector already redirected here.
        let mut sp = 0xfdu8;
        env.cpu.set_sp(sp);
        let return_addr = fault_addr.wrapping_add(1); // "addr+2" in BRK terms
        env.mem_mut().write(0x0100 + sp as u16, (return_addr >> 8) as u8);
        sp = sp.wrapping_sub(1);
        env.mem_mut().write(0x0100 + sp as u16, (return_addr & 0xff) as u8);
        sp = sp.wrapping_sub(1);
        env.mem_mut().write(0x0100 + sp as u16, 0x30); // P with BRK bit set
        sp = sp.wrapping_sub(1);
        env.cpu.set_sp(sp);
    }

    #[test]
    fn error_pointer_lands_on_the_message_not_the_code() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        env.mem_mut().write_word(VECTOR_BRKV, 0x9000);

        let fault_addr = 0x0e10;
        env.mem_mut().write(fault_addr, 214); // ERR_FILE_NOT_FOUND
        env.mem_mut().write_string(fault_addr + 1, "File not found", 0, 100);
        push_brk_frame(&mut env, fault_addr);

        exec_sysbrk(&mut env);

        assert_eq!(env.mem().read(ZP_ACCUMULATOR), env.cpu.a());
        assert_eq!(env.mem().read_word(ZP_ERROR_POINTER), fault_addr + 1);
        assert_eq!(env.mem().read_string(env.mem().read_word(ZP_ERROR_POINTER), 0), "File not found");
        assert_eq!(env.cpu.pc(), 0x9000);
    }

    #[test]
    fn panic_on_err_fires_only_on_a_wholly_zeroed_fault_block() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, true);
        env.mem_mut().write_word(VECTOR_BRKV, 0x9000);
        let fault_addr = 0x0e10;
        // fault_addr and the byte after are both left at 0 (memory default).
        push_brk_frame(&mut env, fault_addr);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            exec_sysbrk(&mut env);
        }));
        assert!(result.is_err());
    }
}
