//! OSARGS: read or write an open file's attributes.
//!
//! X is a zero-page pointer to a 4-byte control block; Y is the file
//! handle, or 0 for filing-system-wide operations.

use crate::environment::Environment;

pub fn exec_osargs(env: &mut Environment) {
    let (a, x, y, p) = (env.cpu.a(), env.cpu.x(), env.cpu.y(), env.cpu.p());
    let cb = x as u16;

    if y == 0 {
        match a {
            0x00 => {
                let filing_system = 0x69;
                env.cpu.set_axyp(filing_system, x, y, p);
                env.log(&format!("OSARGS('get filing system') => 0x{filing_system:02x}"));
            }
            0xff => env.log("OSARGS('update all files onto the media')"),
            other => env.not_implemented(&format!("OSARGS(A=0x{other:02x},Y=0)")),
        }
        return;
    }

    match a {
        0x00 => match env.files.tell(y) {
            Ok(pos) => {
                env.mem_mut().write_dword(cb, pos as u32);
                env.log(&format!("OSARGS('get PTR#',FILE={y}) => {pos}"));
            }
            Err(e) => env.raise_error(e.guest_code(), &e.to_string()),
        },
        0x01 => {
            let pos = env.mem().read_dword(cb) as u64;
            match env.files.seek(y, pos) {
                Ok(()) => env.log(&format!("OSARGS('set PTR#',FILE={y},PTR={pos})")),
                Err(e) => env.raise_error(e.guest_code(), &e.to_string()),
            }
        }
        0x02 => match env.files.len(y) {
            Ok(len) => {
                env.mem_mut().write_dword(cb, len as u32);
                env.log(&format!("OSARGS('get EXT#',FILE={y}) => {len}"));
            }
            Err(e) => env.raise_error(e.guest_code(), &e.to_string()),
        },
        0xff => env.log(&format!("OSARGS('update file to media',FILE={y})")),
        other => env.not_implemented(&format!("OSARGS(A=0x{other:02x},FILE={y})")),
    }
}

#[cfg(test)]
mod tests {
    use crate::console::MockConsole;
    use crate::environment::Environment;
    use crate::files::FileMode;

    #[test]
    fn filing_system_query_with_zero_handle_returns_fixed_code() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        env.cpu.set_axyp(0x00, 0, 0, env.cpu.p());
        super::exec_osargs(&mut env);
        assert_eq!(env.cpu.a(), 0x69);
    }

    #[test]
    fn get_ext_reports_file_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.dat");
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let handle = env.files.open(path.to_str().unwrap(), FileMode::Write).unwrap();
        env.files.write_at(handle, 0, &[1, 2, 3, 4, 5]).unwrap();

        env.cpu.set_axyp(0x02, 0x10, handle, env.cpu.p());
        super::exec_osargs(&mut env);
        assert_eq!(env.mem().read_dword(0x10), 5);
    }
}
