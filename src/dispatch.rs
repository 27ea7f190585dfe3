#![doc = r#"
The MOS dispatcher: the outer step loop and trap-region decode.

Every iteration steps the guest CPU once, then checks whether the program
counter landed in the trap page ($FB00-$FB1F). If it did, the matching
OS* handler runs natively and the trap address's synthesised `RTS` carries
the guest back to its caller once the handler returns (spec.md §4.F). This
mirrors the original `RunMOS` loop's `switch pc` shape, just with handler
functions instead of inline cases for anything beyond a couple of lines.
"#]

use crate::addr::*;
use crate::environment::Environment;
use crate::handlers;

/// Run the guest until `env.stop` is set (EOF on the console, `*BYE`/`*QUIT`,
/// or an unrecoverable error).
pub fn run(env: &mut Environment) {
    env.init_upper_language();

    while !env.stop {
        env.sync_escape_flag();
        env.cpu.step();

        let pc = env.cpu.pc();

        if env.api_log {
            if pc == ROM_START_ADDRESS {
                env.log(&format!("LANGUAGE(A=0x{:02x}, ROM=0x{:x})", env.cpu.a(), env.mem().active_slot()));
            } else if pc == ROM_SERVICE_ENTRY {
                env.log(&format!("SERVICE(CMD=0x{:02x}, ROM=0x{:x})", env.cpu.a(), env.mem().active_slot()));
            }
        }

        if pc < ENTRY_POINTS {
            continue;
        }

        if (EXTENDED_VECTOR_TABLE_START..EXTENDED_VECTOR_TABLE_END).contains(&pc) {
            panic!("Extender vectors not implemented, {pc:04x} was called");
        }

        if pc > EP_ENTRY_POINTS_LAST {
            continue;
        }

        dispatch_trap(env, pc);
    }
}

fn dispatch_trap(env: &mut Environment, pc: u16) {
    match pc {
        EP_FSC => {
            let (a, x, y) = (env.cpu.a(), env.cpu.x(), env.cpu.y());
            env.not_implemented(&format!("OSFSC(A=0x{a:02x},X=0x{x:02x},Y=0x{y:02x})"));
        }
        EP_FIND => handlers::find::exec_osfind(env),
        EP_GBPB => handlers::gbpb::exec_osgbpb(env),
        EP_BPUT => handlers::bget_bput::exec_osbput(env),
        EP_BGET => handlers::bget_bput::exec_osbget(env),
        EP_ARGS => handlers::args::exec_osargs(env),
        EP_FILE => handlers::file::exec_osfile(env),
        EP_RDCH => handlers::wrch_rdch::exec_osrdch(env),
        EP_WRCH => handlers::wrch_rdch::exec_oswrch(env),
        EP_WORD => handlers::word::exec_osword(env),
        EP_BYTE => handlers::byte::exec_osbyte(env),
        EP_CLI => handlers::cli::exec_oscli(env),
        EP_RDRM => handlers::rdrm::exec_osrdrm(env),
        EP_GSINIT => handlers::gs::exec_gsinit(env),
        EP_GSREAD => handlers::gs::exec_gsread(env),
        EP_SYSBRK => handlers::sysbrk::exec_sysbrk(env),
        EP_BRK => panic!("Unhandled BRK: no language ROM installed a BRKV handler"),
        other => {
            let (a, x, y) = (env.cpu.a(), env.cpu.x(), env.cpu.y());
            env.not_implemented(&format!("MOS(EP=0x{other:04x},A=0x{a:02x},X=0x{x:02x},Y=0x{y:02x})"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MockConsole;

    fn basic_language_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 0x4000];
        rom[0x0006] = 0x40; // type byte: language bit set
        rom[0x0007] = 0x00; // copyright offset
        rom[0x0009] = b'T'; // title string
        rom[0x000a] = 0;
        // At $8000 (A=1 on entry): immediately OSBYTE 0x7D (set escape flag)
        // via BRK-free simple loop that halts by reading EOF.
        rom[0x0000] = 0x4c; // JMP $FB09 (EP_RDCH) - drives the dispatcher to
        rom[0x0001] = 0x09; // stop via console EOF, exercising the loop once.
        rom[0x0002] = 0xfb;
        rom
    }

    #[test]
    fn loop_stops_when_console_hits_eof() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        env.install_firmware();
        env.load_rom(&basic_language_rom(), 15);
        env.mem_mut().fill_remaining_slots_with_ram();
        run(&mut env);
        assert!(env.stop);
    }
}
