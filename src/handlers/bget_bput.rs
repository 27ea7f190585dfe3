//! OSBGET / OSBPUT: single-byte transfer against an open file.

use crate::environment::Environment;

/// Y = handle. On success A = byte, carry clear. At EOF, carry is set.
pub fn exec_osbget(env: &mut Environment) {
    let (_, x, y, p) = (env.cpu.a(), env.cpu.x(), env.cpu.y(), env.cpu.p());

    match env.files.read_byte(y) {
        Ok(Some(byte)) => {
            env.cpu.set_axyp(byte, x, y, p);
            env.cpu.set_carry(false);
            env.log_io(&format!("OSBGET(FILE={y}) => 0x{byte:02x}"));
        }
        Ok(None) => {
            env.cpu.set_carry(true);
            env.log_io(&format!("OSBGET(FILE={y}) => EOF"));
        }
        Err(e) => env.raise_error(e.guest_code(), &e.to_string()),
    }
}

/// Y = handle, A = byte to write.
pub fn exec_osbput(env: &mut Environment) {
    let (a, y) = (env.cpu.a(), env.cpu.y());
    match env.files.write_byte(y, a) {
        Ok(()) => env.log_io(&format!("OSBPUT(FILE={y},0x{a:02x})")),
        Err(e) => env.raise_error(e.guest_code(), &e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use crate::console::MockConsole;
    use crate::environment::Environment;
    use crate::files::FileMode;

    #[test]
    fn put_then_get_round_trips_a_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.dat");
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let h = env.files.open(path.to_str().unwrap(), FileMode::Write).unwrap();

        env.cpu.set_axyp(0x42, 0, h, env.cpu.p());
        super::exec_osbput(&mut env);
        env.files.close(h);

        let h = env.files.open(path.to_str().unwrap(), FileMode::Read).unwrap();
        env.cpu.set_axyp(0, 0, h, env.cpu.p());
        super::exec_osbget(&mut env);
        assert_eq!(env.cpu.a(), 0x42);
        assert!(!env.cpu.carry());
    }

    #[test]
    fn get_past_end_sets_carry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.dat");
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let h = env.files.open(path.to_str().unwrap(), FileMode::Read).unwrap();
        env.cpu.set_axyp(0, 0, h, env.cpu.p());
        super::exec_osbget(&mut env);
        assert!(env.cpu.carry());
    }
}
