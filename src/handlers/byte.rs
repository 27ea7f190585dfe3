//! OSBYTE: A selects a sub-function, X/Y are its arguments.
//!
//! Covers the required subset from spec.md §4.G exactly; unrecognised
//! sub-functions fall through to the service-ROM broker and raise error
//! 254 "Bad command" if no ROM claims them.

use std::thread::sleep;
use std::time::Duration;

use crate::addr::{MOS_VARIABLES_START, USER_MEM_BOTTOM, ZP_ESCAPE_FLAG};
use crate::environment::Environment;
use crate::error::ERR_BAD_COMMAND;
use crate::handlers::service_rom;

pub fn exec_osbyte(env: &mut Environment) {
    let (a, x, y, p) = (env.cpu.a(), env.cpu.x(), env.cpu.y(), env.cpu.p());
    let (mut new_x, mut new_y, mut new_p) = (x, y, p);

    match a {
        0x00 => {
            if x == 0 {
                env.raise_error(crate::error::ERR_TODO, "MOS as interpreted by BZZ");
                return;
            }
            new_x = 1;
        }

        0x02 | 0x03 | 0x04 | 0x05 | 0x0b | 0x0c | 0x0f | 0x15 | 0x72 | 0x76 => {
            // I/O device selects, key-repeat, buffer flush, shadow-memory,
            // keyboard LEDs: no hardware behind any of these, so X/Y pass
            // through unchanged.
        }

        0x7c => env.mem_mut().write(ZP_ESCAPE_FLAG, 0),
        0x7d => env.mem_mut().write(ZP_ESCAPE_FLAG, 0x80),
        0x7e => {
            let was_set = env.mem().read(ZP_ESCAPE_FLAG) != 0;
            env.mem_mut().write(ZP_ESCAPE_FLAG, 0);
            new_x = if was_set { 0xff } else { 0 };
        }

        0x7f => {
            let at_eof = match (env.files.tell(x), env.files.len(x)) {
                (Ok(pos), Ok(len)) => pos >= len,
                _ => true,
            };
            new_x = if at_eof { 1 } else { 0 };
        }

        0x80 => {
            if x == 0xff {
                new_x = 0;
            }
        }

        0x81 => {
            if y < 0x80 {
                let timeout_cs = x as u64 + (y as u64) * 256;
                sleep(Duration::from_millis(timeout_cs * 10));
                new_y = 0xff;
                new_p |= 1;
            } else if y == 0xff && x != 0 {
                new_x = 0;
                new_y = 0;
            } else if y == 0xff {
                new_x = 0x28;
            }
        }

        0x82 => {
            new_x = 0xff;
            new_y = 0xff;
        }

        0x83 => {
            new_x = (USER_MEM_BOTTOM & 0xff) as u8;
            new_y = (USER_MEM_BOTTOM >> 8) as u8;
        }

        0x84 | 0x85 => {
            new_x = 0x00;
            new_y = 0x80;
        }

        0x86 => {
            new_x = 1;
            new_y = 1;
        }

        0x87 => {
            new_x = b' ';
            new_y = env.vdu.mode;
        }

        0x8e => {
            env.enter_language(x);
            return;
        }

        0x97 => {
            env.mem_mut().write(0xf000 + x as u16, y);
        }

        0xa0 => {
            if x == 0x09 {
                new_x = 31;
                new_y = 39;
            } else {
                new_x = 0;
                new_y = 0;
            }
        }

        0xa6..=0xff => {
            let address = MOS_VARIABLES_START + a as u16 - 0xa6;
            let old = env.mem().read(address);
            let new_value = (old & y) ^ x;
            env.mem_mut().write(address, new_value);
            if a == 0xda {
                env.vdu.clear_queue();
            }
            new_x = old;
            new_y = env.mem().read(address + 1);
        }

        other => {
            if !service_rom::try_osbyte(env, other, x, y) {
                env.raise_error(ERR_BAD_COMMAND, "Bad command");
                return;
            }
            return;
        }
    }

    env.cpu.set_axyp(a, new_x, new_y, new_p);
    env.log(&format!("OSBYTE{a:02x}(X=0x{x:02x},Y=0x{y:02x}) => (X=0x{new_x:02x},Y=0x{new_y:02x})"));
}

#[cfg(test)]
mod tests {
    use crate::console::MockConsole;
    use crate::environment::Environment;

    fn env() -> Environment {
        Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false)
    }

    #[test]
    fn ack_escape_reports_and_clears() {
        let mut env = env();
        env.cpu.set_axyp(0x7d, 0, 0, env.cpu.p());
        super::exec_osbyte(&mut env);

        env.cpu.set_axyp(0x7e, 0, 0, env.cpu.p());
        super::exec_osbyte(&mut env);
        assert_eq!(env.cpu.x(), 0xff);

        env.cpu.set_axyp(0x7e, 0, 0, env.cpu.p());
        super::exec_osbyte(&mut env);
        assert_eq!(env.cpu.x(), 0);
    }

    #[test]
    fn os_variable_write_applies_mask_and_xor() {
        let mut env = env();
        env.cpu.set_axyp(0xa6, 0xff, 0x00, env.cpu.p());
        super::exec_osbyte(&mut env);
        assert_eq!(env.cpu.x(), 0); // old value defaults to 0

        env.cpu.set_axyp(0xa6, 0x00, 0x00, env.cpu.p());
        super::exec_osbyte(&mut env);
        assert_eq!(env.cpu.x(), 0xff); // returns the value just written
    }

    #[test]
    fn version_query_with_zero_x_raises_error() {
        let mut env = env();
        env.cpu.set_axyp(0x00, 0, 0, env.cpu.p());
        super::exec_osbyte(&mut env);
        assert_eq!(env.mem().read(crate::addr::ERROR_AREA + 1), crate::error::ERR_TODO);
    }
}
