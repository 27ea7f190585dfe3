//! OSWORD: A selects a sub-function, XY points at its parameter block.

use crate::environment::Environment;

pub fn exec_osword(env: &mut Environment) {
    let (a, x, y, p) = (env.cpu.a(), env.cpu.x(), env.cpu.y(), env.cpu.p());
    let xy = x as u16 | ((y as u16) << 8);

    match a {
        0x00 => read_line(env, xy, x, p),
        0x01 => {
            let ticks = env.clock_centiseconds();
            env.mem_mut().write_n_bytes(xy, 5, ticks);
            env.log(&format!("OSWORD01('read system clock',BUF=0x{xy:04x}) => {ticks}"));
        }
        0x02 => {
            let ticks = env.mem().read_n_bytes(xy, 5);
            env.set_clock_centiseconds(ticks);
            env.log(&format!("OSWORD02('write system clock',TICKS={ticks})"));
        }
        0x03 => {
            let ticks = env.interval_timer();
            env.mem_mut().write_n_bytes(xy, 5, ticks);
            env.log(&format!("OSWORD03('read interval timer',BUF=0x{xy:04x}) => {ticks}"));
        }
        0x04 => {
            let ticks = env.mem().read_n_bytes(xy, 5);
            env.set_interval_timer(ticks);
            env.log(&format!("OSWORD04('write interval timer',TIMER={ticks})"));
        }
        0x05 => {
            let address = env.mem().read_dword(xy);
            let value = env.mem().read(address as u16);
            env.mem_mut().write(xy + 4, value);
            env.log_io(&format!(
                "OSWORD05('Read I/O processor memory',ADDRESS=0x{address:08x}) => 0x{value:02x}"
            ));
        }
        0x06 => {
            let address = env.mem().read_dword(xy);
            let value = env.mem().read(xy + 4);
            env.mem_mut().write(address as u16, value);
            env.log(&format!(
                "OSWORD06('Write I/O processor memory',ADDRESS=0x{address:08x},VAL=0x{value:02x})"
            ));
        }
        0x07 => {
            let channel = env.mem().read_word(xy);
            let amplitude = env.mem().read_word(xy + 2) as i16;
            let pitch = env.mem().read_word(xy + 4);
            let duration = env.mem().read_word(xy + 6);
            env.log(&format!(
                "OSWORD07('Sound command',CHAN={channel},AMPL={amplitude},PITCH={pitch},DUR={duration})"
            ));
        }
        0x08 => {
            let number = env.mem().read(xy);
            env.log(&format!("OSWORD08('Define envelope',NUMBER={number})"));
        }
        other => env.not_implemented(&format!("OSWORD{other:02x}")),
    }
}

fn read_line(env: &mut Environment, xy: u16, x: u8, p: u8) {
    let (line, eof) = env.con.readline();
    if eof {
        env.stop = true;
        return;
    }
    let line = line.to_uppercase();
    env.write_spool(&line);
    env.write_spool("\n");

    let buffer = env.mem().read_word(xy);
    let max_length = env.mem().read(xy + 2);
    let min_char = env.mem().read(xy + 3);
    let max_char = env.mem().read(xy + 4);

    env.mem_mut()
        .write_string(buffer, &line, b'\r', max_length.saturating_sub(1));

    env.cpu.set_axyp(1, x, line.len() as u8, p);
    env.cpu.set_carry(false);

    env.log(&format!(
        "OSWORD00('read line',BUF=0x{buffer:04x},range={min_char:02x}-{max_char:02x},maxlen={max_length}) => '{line}'"
    ));
}

#[cfg(test)]
mod tests {
    use crate::console::MockConsole;
    use crate::environment::Environment;

    #[test]
    fn clock_write_read_round_trip_within_a_centisecond() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let buf: u16 = 0x1000;
        env.mem_mut().write_n_bytes(buf, 5, 123456);
        env.cpu.set_axyp(0x02, (buf & 0xff) as u8, (buf >> 8) as u8, env.cpu.p());
        super::exec_osword(&mut env);

        env.cpu.set_axyp(0x01, (buf & 0xff) as u8, (buf >> 8) as u8, env.cpu.p());
        super::exec_osword(&mut env);

        let read_back = env.mem().read_n_bytes(buf, 5);
        assert!(read_back.abs_diff(123456) <= 1);
    }

    #[test]
    fn read_io_memory_copies_byte_at_address() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let cb: u16 = 0x1100;
        env.mem_mut().write(0x1200, 0x77);
        env.mem_mut().write_dword(cb, 0x1200);
        env.cpu.set_axyp(0x05, (cb & 0xff) as u8, (cb >> 8) as u8, env.cpu.p());
        super::exec_osword(&mut env);
        assert_eq!(env.mem().read(cb + 4), 0x77);
    }
}
