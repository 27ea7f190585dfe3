//! OSFILE: whole-file operations (load/save/catalogue) against an 18-byte
//! control block: `{filename_ptr:word@0, load_addr:dword@2,
//! exec_addr:dword@6, start:dword@0xA, end:dword@0xE}`.
//!
//! Unlike OSFIND/OSBGET/OSBPUT this never goes through `FileTable`: every
//! sub-function here reads or writes the whole file in one go, mirroring
//! the original's direct `ioutil.ReadFile`/`WriteFile` use.

use crate::environment::Environment;
use crate::error::ERR_FILE_NOT_FOUND;
use crate::files::{self, Metadata};

const CB_LOAD: u16 = 0x2;
const CB_EXEC: u16 = 0x6;
const CB_START: u16 = 0xa;
const CB_END: u16 = 0xe;

pub fn exec_osfile(env: &mut Environment) {
    let (a, x, y, p) = (env.cpu.a(), env.cpu.x(), env.cpu.y(), env.cpu.p());
    let cb = x as u16 | ((y as u16) << 8);

    let filename_ptr = env.mem().read_word(cb);
    let filename = env.mem().read_string(filename_ptr, 0x0d);
    let load_addr = env.mem().read_dword(cb + CB_LOAD);
    let exec_addr = env.mem().read_dword(cb + CB_EXEC);
    let start = env.mem().read_dword(cb + CB_START);
    let end = env.mem().read_dword(cb + CB_END);

    match a {
        0x00 => {
            let data = env.mem().read_slice(start as u16, (end - start) as u16);
            if let Err(e) = std::fs::write(&filename, &data) {
                env.raise_error(crate::error::ERR_TODO, &e.to_string());
                return;
            }
            let meta = Metadata {
                load_addr,
                exec_addr,
                size: data.len() as u32,
                attributes: 0x33,
            };
            let _ = files::write_metadata(&filename, &meta);
        }

        0x01 => update_metadata(env, &filename, |m| {
            m.load_addr = load_addr;
            m.exec_addr = exec_addr;
            m.attributes = (start & 0xff) as u8;
        }),
        0x02 => update_metadata(env, &filename, |m| m.load_addr = load_addr),
        0x03 => update_metadata(env, &filename, |m| m.exec_addr = exec_addr),
        0x04 => update_metadata(env, &filename, |m| m.attributes = (start & 0xff) as u8),

        0x05 => {
            let path = std::path::Path::new(&filename);
            let object_type = if path.is_dir() {
                2
            } else if path.is_file() {
                1
            } else {
                0
            };
            if object_type == 1 {
                let size = std::fs::metadata(&filename).map(|m| m.len()).unwrap_or(0);
                env.mem_mut().write_dword(cb + CB_START, size as u32);
                if let Some(meta) = files::read_metadata(&filename) {
                    env.mem_mut().write_dword(cb + CB_LOAD, meta.load_addr);
                    env.mem_mut().write_dword(cb + CB_EXEC, meta.exec_addr);
                    env.mem_mut().write_dword(cb + CB_END, meta.attributes as u32);
                } else {
                    env.mem_mut().write_dword(cb + CB_END, 0);
                }
            }
            env.cpu.set_axyp(object_type, x, y, p);
        }

        0x06 => {
            let existed = std::path::Path::new(&filename).is_file();
            let _ = std::fs::remove_file(&filename);
            files::delete_metadata(&filename);
            env.cpu.set_axyp(if existed { 1 } else { 0 }, x, y, p);
        }

        0x07 => {
            let size = (end.saturating_sub(start)) as usize;
            let data = vec![0u8; size];
            if let Err(e) = std::fs::write(&filename, &data) {
                env.raise_error(crate::error::ERR_TODO, &e.to_string());
                return;
            }
            let meta = Metadata {
                load_addr,
                exec_addr,
                size: size as u32,
                attributes: 0x33,
            };
            let _ = files::write_metadata(&filename, &meta);
            env.cpu.set_axyp(1, x, y, p);
        }

        0xff => {
            let use_cb_load = (exec_addr & 0xff) == 0;
            let data = match std::fs::read(&filename) {
                Ok(d) => d,
                Err(_) => {
                    env.raise_error(ERR_FILE_NOT_FOUND, "File not found");
                    return;
                }
            };
            let meta = files::read_metadata(&filename);
            let addr = if use_cb_load {
                load_addr
            } else {
                meta.map(|m| m.load_addr).unwrap_or(load_addr)
            };
            env.mem_mut().write_slice(addr as u16, data.len() as u16, &data);
            env.mem_mut().write_dword(cb + CB_START, data.len() as u32);
            env.cpu.set_axyp(1, x, y, p);
        }

        other => env.not_implemented(&format!("OSFILE(A=0x{other:02x})")),
    }

    env.log(&format!("OSFILE(A=0x{a:02x},FCB=0x{cb:04x},FILE={filename})"));
}

fn update_metadata(env: &mut Environment, filename: &str, f: impl FnOnce(&mut Metadata)) {
    let mut meta = files::read_metadata(filename).unwrap_or_default();
    f(&mut meta);
    let _ = files::write_metadata(filename, &meta);
}

#[cfg(test)]
mod tests {
    use crate::console::MockConsole;
    use crate::environment::Environment;

    fn setup_cb(env: &mut Environment, cb: u16, filename_ptr: u16, start: u16, end: u16) {
        env.mem_mut().write_word(cb, filename_ptr);
        env.mem_mut().write_dword(cb + super::CB_START, start as u32);
        env.mem_mut().write_dword(cb + super::CB_END, end as u32);
    }

    #[test]
    fn save_then_load_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.dat");
        let path = path.to_str().unwrap();

        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let cb: u16 = 0x1000;
        let name_ptr: u16 = 0x1100;
        let data_addr: u16 = 0x2000;

        env.mem_mut().write_string(name_ptr, path, 0x0d, 100);
        env.mem_mut().write_slice(data_addr, 4, &[1, 2, 3, 4]);
        setup_cb(&mut env, cb, name_ptr, data_addr, data_addr + 4);

        env.cpu.set_axyp(0x00, (cb & 0xff) as u8, (cb >> 8) as u8, env.cpu.p());
        super::exec_osfile(&mut env);

        let load_addr: u16 = 0x3000;
        env.mem_mut().write_dword(cb + super::CB_EXEC, 0);
        env.mem_mut().write_dword(cb + super::CB_LOAD, load_addr as u32);
        env.cpu.set_axyp(0xff, (cb & 0xff) as u8, (cb >> 8) as u8, env.cpu.p());
        super::exec_osfile(&mut env);

        assert_eq!(env.cpu.a(), 1);
        assert_eq!(env.mem().read_slice(load_addr, 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn check_object_reports_directories_as_type_2() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();

        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let cb: u16 = 0x1000;
        let name_ptr: u16 = 0x1100;
        env.mem_mut().write_string(name_ptr, path, 0x0d, 100);
        setup_cb(&mut env, cb, name_ptr, 0, 0);

        env.cpu.set_axyp(0x05, (cb & 0xff) as u8, (cb >> 8) as u8, env.cpu.p());
        super::exec_osfile(&mut env);
        assert_eq!(env.cpu.a(), 2);
    }

    #[test]
    fn loading_a_missing_file_raises_file_not_found() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let cb: u16 = 0x1000;
        let name_ptr: u16 = 0x1100;
        env.mem_mut().write_string(name_ptr, "/nonexistent/path/x", 0x0d, 100);
        setup_cb(&mut env, cb, name_ptr, 0, 0);

        env.cpu.set_axyp(0xff, (cb & 0xff) as u8, (cb >> 8) as u8, env.cpu.p());
        super::exec_osfile(&mut env);
        assert_eq!(env.mem().read(crate::addr::ERROR_AREA + 1), crate::error::ERR_FILE_NOT_FOUND);
    }
}
