//! The service-ROM broker (spec.md §4.I).
//!
//! For an unhandled OSCLI/OSBYTE/OSWORD/HELP, the host walks loaded ROM
//! slots top-down, latching each and calling its service entry at $8003
//! with A = service code. The real firmware does this walk in assembly;
//! since this crate's firmware is an all-`RTS` stub, the walk is driven
//! natively here instead - each call pushes a synthetic return address
//! onto the 6502 stack and single-steps the guest CPU until it returns,
//! then inspects A for a non-zero claim (see `DESIGN.md`).
const SERVICE_OSCLI: u8 = 4;
const SERVICE_OSBYTE: u8 = 7;
const SERVICE_OSWORD: u8 = 8;
const SERVICE_HELP: u8 = 9;

/// Shadow A/X/Y zero-page cells service ROMs read their call args from.
const ZP_SERVICE_A: u16 = 0x00ef;
const ZP_SERVICE_X: u16 = 0x00f0;
const ZP_SERVICE_Y: u16 = 0x00f1;

/// Guards against a misbehaving service ROM that never returns.
const MAX_SERVICE_STEPS: u32 = 100_000;

use crate::environment::Environment;

fn call_slot(env: &mut Environment, slot: u8, service_code: u8, x: u8, y: u8) -> u8 {
    let saved_pc = env.cpu.pc();
    let (saved_a, saved_x, saved_y, saved_p) = (env.cpu.a(), env.cpu.x(), env.cpu.y(), env.cpu.p());

    env.mem_mut().set_active_slot(slot);

    let sentinel = crate::firmware::PROC_SERVICE_ROMS;
    env.cpu.push_return_address(sentinel);
    env.cpu.set_axyp(service_code, x, y, saved_p);
    env.cpu.set_pc(crate::addr::ROM_SERVICE_ENTRY);

    for _ in 0..MAX_SERVICE_STEPS {
        if env.cpu.pc() == sentinel {
            break;
        }
        env.cpu.step();
    }
    let claimed_a = env.cpu.a();

    env.cpu.set_pc(saved_pc);
    env.cpu.set_axyp(saved_a, saved_x, saved_y, saved_p);
    claimed_a
}

fn walk_slots(env: &mut Environment, service_code: u8, a: u8, x: u8, y: u8) -> bool {
    env.mem_mut().write(ZP_SERVICE_A, a);
    env.mem_mut().write(ZP_SERVICE_X, x);
    env.mem_mut().write(ZP_SERVICE_Y, y);

    let saved_slot = env.mem().active_slot();
    let mut claimed = false;
    for slot in (0..=0x0fu8).rev() {
        if !env.mem().is_rom_loaded(slot) {
            continue;
        }
        if call_slot(env, slot, service_code, x, y) != 0 {
            claimed = true;
            break;
        }
    }
    env.mem_mut().set_active_slot(saved_slot);
    claimed
}

pub fn try_osbyte(env: &mut Environment, a: u8, x: u8, y: u8) -> bool {
    walk_slots(env, SERVICE_OSBYTE, a, x, y)
}

pub fn try_osword(env: &mut Environment, a: u8) -> bool {
    walk_slots(env, SERVICE_OSWORD, a, 0, 0)
}

pub fn try_oscli(env: &mut Environment) -> bool {
    walk_slots(env, SERVICE_OSCLI, 0, 0, 0)
}

pub fn try_help(env: &mut Environment) -> bool {
    walk_slots(env, SERVICE_HELP, 0, 0, 0)
}

#[cfg(test)]
mod tests {
    use crate::console::MockConsole;
    use crate::environment::Environment;

    /// A minimal ROM whose service entry at $8003 immediately `RTS`s
    /// without claiming (A left at 0).
    fn unclaiming_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 0x4000];
        rom[0x0003] = 0x60; // RTS
        rom
    }

    #[test]
    fn no_rom_loaded_means_no_claim() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        assert!(!super::try_osbyte(&mut env, 0xd0, 0, 0));
    }

    #[test]
    fn unclaiming_rom_leaves_the_call_unclaimed() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        env.mem_mut().load_rom(&unclaiming_rom(), 15, true);
        assert!(!super::try_osbyte(&mut env, 0xd0, 0, 0));
    }
}
