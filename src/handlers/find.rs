//! OSFIND: open or close a file for byte access.

use crate::environment::Environment;
use crate::files::FileMode;

pub fn exec_osfind(env: &mut Environment) {
    let (a, x, y, p) = (env.cpu.a(), env.cpu.x(), env.cpu.y(), env.cpu.p());

    if a == 0 {
        if y == 0 {
            env.files.close_all();
            env.log("OSFIND('close all files')");
        } else {
            env.files.close(y);
            env.log(&format!("OSFIND('close file',FILE={y})"));
        }
        return;
    }

    let mode = match FileMode::from_osfind_byte(a) {
        Some(m) => m,
        None => {
            env.cpu.set_axyp(0, x, y, p);
            return;
        }
    };

    let address = x as u16 | ((y as u16) << 8);
    let filename = env.mem().read_string(address, 0x0d);
    let handle = env.files.open(&filename, mode).unwrap_or(0);

    env.cpu.set_axyp(handle, x, y, p);
    env.log(&format!("OSFIND('open file',FILE='{filename}',MODE=0x{a:02x}) => {handle}"));
}

#[cfg(test)]
mod tests {
    use crate::console::MockConsole;
    use crate::environment::Environment;
    use tempfile::tempdir;

    #[test]
    fn opening_for_output_then_closing_frees_the_handle() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.dat");
        let addr: u16 = 0x1000;
        env.mem_mut().write_string(addr, path.to_str().unwrap(), 0x0d, 200);

        env.cpu.set_axyp(0x80, (addr & 0xff) as u8, (addr >> 8) as u8, env.cpu.p());
        super::exec_osfind(&mut env);
        let handle = env.cpu.a();
        assert_ne!(handle, 0);

        env.cpu.set_axyp(0, 0, handle, env.cpu.p());
        super::exec_osfind(&mut env);
    }

    #[test]
    fn unrecognised_mode_returns_zero_handle() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let addr: u16 = 0x1000;
        env.mem_mut().write_string(addr, "x", 0x0d, 10);
        env.cpu.set_axyp(0x01, (addr & 0xff) as u8, (addr >> 8) as u8, env.cpu.p());
        super::exec_osfind(&mut env);
        assert_eq!(env.cpu.a(), 0);
    }
}
