//! OSGBPB: transfer a group of bytes, or list a directory.
//!
//! Control block layout for ops 1-4: `{handle@0, addr@1, count@5, ptr@9}`.

use crate::environment::Environment;

const CB_ADDRESS: u16 = 0x1;
const CB_COUNT: u16 = 0x5;
const CB_PTR: u16 = 0x9;

/// Longest filename OSGBPB op 8 will emit per directory entry, per
/// spec.md §4.G ("truncate names to maxFilenameLength").
const MAX_FILENAME_LENGTH: usize = 10;

pub fn exec_osgbpb(env: &mut Environment) {
    let (a, x, y, p) = (env.cpu.a(), env.cpu.x(), env.cpu.y(), env.cpu.p());
    let cb = x as u16 | ((y as u16) << 8);

    if a >= 1 && a <= 4 {
        transfer_bytes(env, a, cb, x, y, p);
    } else if a == 8 {
        list_directory(env, cb, x, y, p);
    } else {
        env.not_implemented(&format!("OSGBPB(A=0x{a:02x})"));
    }
}

fn transfer_bytes(env: &mut Environment, a: u8, cb: u16, x: u8, y: u8, p: u8) {
    let handle = env.mem().read(cb);
    let address = env.mem().read_dword(cb + CB_ADDRESS) as u16;
    let count = env.mem().read_dword(cb + CB_COUNT);
    let offset = env.mem().read_dword(cb + CB_PTR) as u64;

    if a == 1 || a == 3 {
        if let Err(e) = env.files.seek(handle, offset) {
            env.raise_error(e.guest_code(), &e.to_string());
            return;
        }
    }

    let transferred: u32 = if a == 1 || a == 2 {
        let data = env.mem().read_slice(address, count as u16);
        match env.files.write_current(handle, &data) {
            Ok(n) => n as u32,
            Err(e) => {
                env.raise_error(e.guest_code(), &e.to_string());
                return;
            }
        }
    } else {
        let mut buf = vec![0u8; count as usize];
        let n = match env.files.read_current(handle, &mut buf) {
            Ok(n) => n,
            Err(e) => {
                env.raise_error(e.guest_code(), &e.to_string());
                return;
            }
        };
        env.mem_mut().write_slice(address, n as u16, &buf[..n]);
        n as u32
    };

    env.mem_mut()
        .write_dword(cb + CB_ADDRESS, address as u32 + transferred);
    env.mem_mut()
        .write_dword(cb + CB_COUNT, count - transferred);
    env.mem_mut()
        .write_dword(cb + CB_PTR, offset as u32 + transferred);

    let remaining = count - transferred;
    env.cpu.set_axyp(0, x, y, p);
    env.cpu.set_carry(remaining != 0);
    env.log(&format!(
        "OSGBPB(A=0x{a:02x},FILE={handle},N={count}) => (N={transferred})"
    ));
}

fn list_directory(env: &mut Environment, cb: u16, x: u8, y: u8, p: u8) {
    let address = env.mem().read_dword(cb + CB_ADDRESS) as u16;
    let count = env.mem().read_dword(cb + CB_COUNT);
    let start_index = env.mem().read_dword(cb + CB_PTR) as usize;

    let entries = directory_entries();
    let mut cursor = address;
    let mut written = 0u32;
    let mut index = start_index;

    while written < count && index < entries.len() {
        let mut name = entries[index].clone();
        name.truncate(MAX_FILENAME_LENGTH);
        env.mem_mut().write(cursor, name.len() as u8);
        cursor = cursor.wrapping_add(1);
        for b in name.bytes() {
            env.mem_mut().write(cursor, b);
            cursor = cursor.wrapping_add(1);
        }
        index += 1;
        written += 1;
    }

    env.mem_mut().write_dword(cb + CB_ADDRESS, cursor as u32);
    env.mem_mut().write_dword(cb + CB_COUNT, count - written);
    env.mem_mut().write_dword(cb + CB_PTR, index as u32);

    env.cpu.set_axyp(0, x, y, p);
    env.cpu.set_carry(written < count);
    env.log(&format!("OSGBPB('list directory',N={count}) => ({written} entries)"));
}

/// Directory entries visible to the guest. Skips dot-files and `.inf`
/// sidecars, as spec.md §4.G requires for `*CAT`/`*EX`.
fn directory_entries() -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(".")
        .map(|dir| {
            dir.filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().into_string().ok())
                .filter(|name| !name.starts_with('.') && !name.ends_with(".inf"))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use crate::console::MockConsole;
    use crate::environment::Environment;
    use crate::files::FileMode;

    #[test]
    fn op2_appends_bytes_at_current_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.dat");
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let handle = env.files.open(path.to_str().unwrap(), FileMode::Write).unwrap();

        let cb: u16 = 0x1000;
        let data_addr: u16 = 0x2000;
        env.mem_mut().write(cb, handle);
        env.mem_mut().write_dword(cb + super::CB_ADDRESS, data_addr as u32);
        env.mem_mut().write_dword(cb + super::CB_COUNT, 3);
        env.mem_mut().write_dword(cb + super::CB_PTR, 0);
        env.mem_mut().write_slice(data_addr, 3, &[10, 20, 30]);

        env.cpu.set_axyp(2, (cb & 0xff) as u8, (cb >> 8) as u8, env.cpu.p());
        super::exec_osgbpb(&mut env);
        assert!(!env.cpu.carry());
        assert_eq!(env.mem().read_dword(cb + super::CB_COUNT), 0);
    }
}
