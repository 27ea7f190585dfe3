//! OSCLI: the command-line interpreter (spec.md §4.G "OSCLI").
//!
//! XY points at a CR-terminated command line. Parsing strips the leading
//! `*`, expands a trailing-dot abbreviation against a fixed keyword table,
//! and dispatches to a built-in; anything unrecognised falls through to
//! the service-ROM broker and finally raises error 254 "Bad command"
//! (mirrors `osCLI.go`'s `execOSCLI`, generalised from its `*HELP`/`*FX`
//! pair to the full built-in set spec.md names).

use crate::addr::{MOS_ROM_TYPE_TABLE, ROM_TITLE_STRING};
use crate::environment::Environment;
use crate::error::{ERR_BAD_ADDRESS, ERR_BAD_COMMAND, ERR_BAD_DIRECTORY, ERR_BAD_STRING, ERR_FILE_NOT_FOUND};
use crate::files::{self, Metadata};
use crate::handlers::service_rom;

/// Ordered prefix-expansion table: first entry whose name starts with the
/// typed keyword wins (spec.md §4.G rule 4).
const COMMAND_TABLE: &[&str] = &[
    "CAT", "FX", "BASIC", "BYE", "CODE", "DIR", "DELETE", "DRIVE", "EXEC", "EX", "HELP", "HOST", "INFO", "KEY",
    "LOAD", "LINE", "MOTOR", "OPT", "QUIT", "RUN", "ROM", "ROMS", "SAVE", "SPOOL", "TAPE", "TV", "TYPE",
];

pub fn exec_oscli(env: &mut Environment) {
    let (x, y, p) = (env.cpu.x(), env.cpu.y(), env.cpu.p());
    let xy = x as u16 | ((y as u16) << 8);
    let line = env.mem().read_string(xy, 0x0d);

    env.log(&format!("OSCLI('{line}')"));

    let mut rest = line.as_str();
    rest = rest.trim_start_matches(' ');
    rest = rest.strip_prefix('*').unwrap_or(rest);

    if rest.is_empty() || rest.starts_with('|') {
        return;
    }

    let (keyword, tail) = if let Some(after_slash) = rest.strip_prefix('/') {
        ("RUN".to_string(), after_slash)
    } else {
        let end = rest
            .find(|c: char| c == ' ' || c == '.' || c.is_ascii_digit() || c == '\r' || c == '"')
            .unwrap_or(rest.len());
        let raw_keyword = rest[..end].to_ascii_uppercase();
        let after = &rest[end..];

        if let Some(stripped) = after.strip_prefix('.') {
            let expanded = expand_prefix(&raw_keyword).unwrap_or(raw_keyword.as_str());
            (expanded.to_string(), stripped)
        } else {
            (raw_keyword, after)
        }
    };
    let tail = tail.trim_start_matches(' ');

    match keyword.as_str() {
        "FX" => cmd_fx(env, tail, p),
        "BASIC" => cmd_basic(env, tail),
        "CAT" => cmd_cat(env, tail, false),
        "EX" => cmd_cat(env, tail, true),
        "DELETE" => cmd_delete(env, tail),
        "DIR" => cmd_dir(env, tail),
        "DRIVE" => cmd_drive(env, tail),
        "HELP" => cmd_help(env),
        "HOST" => cmd_host(env, tail),
        "INFO" => cmd_info(env, tail),
        "TYPE" => cmd_type(env, tail),
        "LOAD" => cmd_load(env, tail),
        "RUN" => cmd_run(env, tail),
        "SAVE" => cmd_save(env, tail),
        "MOTOR" => osbyte_passthrough(env, 0x89, tail, p),
        "CODE" => osbyte_passthrough(env, 0x88, tail, p),
        "OPT" => osbyte_passthrough(env, 0x8b, tail, p),
        "ROM" => osbyte_passthrough(env, 0x8d, tail, p),
        "TAPE" => osbyte_passthrough(env, 0x8c, tail, p),
        "TV" => osbyte_passthrough(env, 0x90, tail, p),
        "ROMS" => cmd_roms(env),
        "SPOOL" => cmd_spool(env, tail),
        "BYE" | "QUIT" => env.stop = true,
        _ => {
            let cmd_addr = xy;
            env.mem_mut().write_word(crate::addr::ZP_STR, cmd_addr);
            if !service_rom::try_oscli(env) {
                env.raise_error(ERR_BAD_COMMAND, "Bad command");
            }
        }
    }
}

fn expand_prefix(prefix: &str) -> Option<&'static str> {
    COMMAND_TABLE.iter().find(|name| name.starts_with(prefix)).copied()
}

fn parse_decimal_byte(s: &str) -> Option<u8> {
    s.trim().parse::<u32>().ok().filter(|v| *v <= 0xff).map(|v| v as u8)
}

fn parse_hex_dword(s: &str) -> Option<u32> {
    let s = s.trim().trim_start_matches('&').trim_start_matches("0x");
    if s.is_empty() {
        return None;
    }
    u32::from_str_radix(s, 16).ok()
}

/// Leading filename token, quoted (`"a b.txt"`) or bare, plus the
/// remainder of the line trimmed of leading whitespace.
fn parse_filename(tail: &str) -> Option<(String, &str)> {
    let tail = tail.trim_start_matches(' ');
    if let Some(rest) = tail.strip_prefix('"') {
        let end = rest.find('"')?;
        Some((rest[..end].to_string(), rest[end + 1..].trim_start_matches(' ')))
    } else {
        let end = tail.find(' ').unwrap_or(tail.len());
        if end == 0 {
            return None;
        }
        Some((tail[..end].to_string(), tail[end..].trim_start_matches(' ')))
    }
}

fn cmd_fx(env: &mut Environment, tail: &str, p: u8) {
    let params: Vec<&str> = tail.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    if params.is_empty() || params.len() > 3 {
        env.raise_error(ERR_BAD_COMMAND, "Bad command");
        return;
    }
    let mut bytes = [0u8; 3];
    for (i, param) in params.iter().enumerate() {
        match parse_decimal_byte(param) {
            Some(b) => bytes[i] = b,
            None => {
                env.raise_error(ERR_BAD_COMMAND, "Bad command");
                return;
            }
        }
    }
    env.cpu.set_axyp(bytes[0], bytes[1], bytes[2], p);
    crate::handlers::byte::exec_osbyte(env);
}

fn osbyte_passthrough(env: &mut Environment, a: u8, tail: &str, p: u8) {
    let x = parse_decimal_byte(tail.trim()).unwrap_or(0);
    env.cpu.set_axyp(a, x, 0, p);
    crate::handlers::byte::exec_osbyte(env);
}

fn cmd_basic(env: &mut Environment, _tail: &str) {
    for slot in (0..=0x0fu8).rev() {
        if env.mem().read(MOS_ROM_TYPE_TABLE + slot as u16) == crate::addr::ROM_TYPE_LANGUAGE_BIT {
            env.enter_language(slot);
            return;
        }
    }
    env.raise_error(ERR_BAD_COMMAND, "Bad command");
}

fn cmd_cat(env: &mut Environment, tail: &str, extended: bool) {
    let dir = if tail.is_empty() { ".".to_string() } else { tail.to_string() };
    let entries = match std::fs::read_dir(&dir) {
        Ok(e) => e,
        Err(_) => {
            env.raise_error(ERR_BAD_DIRECTORY, "Bad directory");
            return;
        }
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || name.ends_with(".inf") {
            continue;
        }
        if extended {
            let path = std::path::Path::new(&dir).join(&name);
            let meta = files::read_metadata(path.to_str().unwrap_or(&name)).unwrap_or_default();
            env.con.write(&format!("{name} {:08X} {:08X} {:08X}\n", meta.load_addr, meta.exec_addr, meta.size));
        } else {
            env.con.write(&format!("{name}\n"));
        }
    }
}

fn cmd_delete(env: &mut Environment, tail: &str) {
    let Some((filename, _)) = parse_filename(tail) else {
        env.raise_error(ERR_BAD_STRING, "Bad string");
        return;
    };
    if std::fs::remove_file(&filename).is_err() {
        env.raise_error(ERR_FILE_NOT_FOUND, "File not found");
        return;
    }
    files::delete_metadata(&filename);
}

fn cmd_dir(env: &mut Environment, tail: &str) {
    let Some((dir, _)) = parse_filename(tail) else {
        env.raise_error(ERR_BAD_STRING, "Bad string");
        return;
    };
    if std::env::set_current_dir(&dir).is_err() {
        env.raise_error(ERR_BAD_DIRECTORY, "Bad directory");
    }
}

fn cmd_drive(env: &mut Environment, tail: &str) {
    match parse_decimal_byte(tail) {
        Some(n) => env.log(&format!("DRIVE({n}) (no-op: no floppy drives emulated)")),
        None => env.raise_error(ERR_BAD_COMMAND, "Bad command"),
    }
}

fn cmd_help(env: &mut Environment) {
    env.con.write("\nbbz - Acorn MOS for 6502 language ROMs\n");
    service_rom::try_help(env);
}

fn cmd_host(env: &mut Environment, tail: &str) {
    let output = std::process::Command::new("sh").arg("-c").arg(tail).output();
    match output {
        Ok(out) => {
            env.con.write(&String::from_utf8_lossy(&out.stdout));
            env.con.write(&String::from_utf8_lossy(&out.stderr));
        }
        Err(e) => env.raise_error(crate::error::ERR_TODO, &e.to_string()),
    }
}

fn cmd_info(env: &mut Environment, tail: &str) {
    let Some((filename, _)) = parse_filename(tail) else {
        env.raise_error(ERR_BAD_STRING, "Bad string");
        return;
    };
    if !std::path::Path::new(&filename).is_file() {
        env.raise_error(ERR_FILE_NOT_FOUND, "File not found");
        return;
    }
    let size = std::fs::metadata(&filename).map(|m| m.len()).unwrap_or(0);
    let meta = files::read_metadata(&filename).unwrap_or_default();
    env.con
        .write(&format!("{filename} {:08X} {:08X} {:08X}\n", meta.load_addr, meta.exec_addr, size));
}

fn cmd_type(env: &mut Environment, tail: &str) {
    let Some((filename, _)) = parse_filename(tail) else {
        env.raise_error(ERR_BAD_STRING, "Bad string");
        return;
    };
    match std::fs::read(&filename) {
        Ok(data) => env.con.write(&String::from_utf8_lossy(&data)),
        Err(_) => env.raise_error(ERR_FILE_NOT_FOUND, "File not found"),
    }
}

fn cmd_load(env: &mut Environment, tail: &str) {
    let Some((filename, rest)) = parse_filename(tail) else {
        env.raise_error(ERR_BAD_STRING, "Bad string");
        return;
    };
    let data = match std::fs::read(&filename) {
        Ok(d) => d,
        Err(_) => {
            env.raise_error(ERR_FILE_NOT_FOUND, "File not found");
            return;
        }
    };
    let meta = files::read_metadata(&filename);
    let addr = if !rest.trim().is_empty() {
        match parse_hex_dword(rest) {
            Some(a) => a,
            None => {
                env.raise_error(ERR_BAD_ADDRESS, "Bad address");
                return;
            }
        }
    } else {
        meta.map(|m| m.load_addr).unwrap_or(0)
    };
    env.mem_mut().write_slice(addr as u16, data.len() as u16, &data);
}

fn cmd_run(env: &mut Environment, tail: &str) {
    let Some((filename, _)) = parse_filename(tail) else {
        env.raise_error(ERR_BAD_STRING, "Bad string");
        return;
    };
    let data = match std::fs::read(&filename) {
        Ok(d) => d,
        Err(_) => {
            env.raise_error(ERR_FILE_NOT_FOUND, "File not found");
            return;
        }
    };
    let meta = files::read_metadata(&filename).unwrap_or_default();
    env.mem_mut().write_slice(meta.load_addr as u16, data.len() as u16, &data);
    let exec_addr = if meta.exec_addr != 0 { meta.exec_addr } else { meta.load_addr };
    env.cpu.set_pc(exec_addr as u16);
}

fn cmd_save(env: &mut Environment, tail: &str) {
    let Some((filename, rest)) = parse_filename(tail) else {
        env.raise_error(ERR_BAD_STRING, "Bad string");
        return;
    };
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() < 2 {
        env.raise_error(ERR_BAD_COMMAND, "Bad command");
        return;
    }
    let Some(start) = parse_hex_dword(tokens[0]) else {
        env.raise_error(ERR_BAD_ADDRESS, "Bad address");
        return;
    };
    let end = if let Some(len_str) = tokens[1].strip_prefix('+') {
        match parse_hex_dword(len_str) {
            Some(len) => start + len,
            None => {
                env.raise_error(ERR_BAD_ADDRESS, "Bad address");
                return;
            }
        }
    } else {
        match parse_hex_dword(tokens[1]) {
            Some(e) => e,
            None => {
                env.raise_error(ERR_BAD_ADDRESS, "Bad address");
                return;
            }
        }
    };
    let exec_addr = tokens.get(2).and_then(|t| parse_hex_dword(t)).unwrap_or(start);
    let load_addr = tokens.get(3).and_then(|t| parse_hex_dword(t)).unwrap_or(start);

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

fn cmd_roms(env: &mut Environment) {
    for slot in (0..=0x0fu8).rev() {
        if !env.mem().is_rom_loaded(slot) {
            continue;
        }
        let rom_type = env.mem().read(MOS_ROM_TYPE_TABLE + slot as u16);
        let title = read_slot_string(env, slot, ROM_TITLE_STRING);
        env.con.write(&format!("{slot:X} {title} (type {rom_type:02X})\n"));
    }
}

fn read_slot_string(env: &Environment, slot: u8, address: u16) -> String {
    let mut s = String::new();
    let mut addr = address;
    loop {
        let ch = env.mem().read_slot(slot, addr) & 0x7f;
        if ch == 0 {
            break;
        }
        s.push(ch as char);
        addr = addr.wrapping_add(1);
    }
    s
}

fn cmd_spool(env: &mut Environment, tail: &str) {
    let handle_addr = crate::addr::SPOOL_FILE_HANDLE;
    let current = env.mem().read(handle_addr);
    if tail.is_empty() {
        if current != 0 {
            env.files.close(current);
            env.mem_mut().write(handle_addr, 0);
        }
        return;
    }
    let Some((filename, _)) = parse_filename(tail) else {
        env.raise_error(ERR_BAD_STRING, "Bad string");
        return;
    };
    match env.files.open(&filename, crate::files::FileMode::Write) {
        Ok(handle) => env.mem_mut().write(handle_addr, handle),
        Err(e) => env.raise_error(e.code, &e.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MockConsole;

    fn env_with_command(line: &str) -> Environment {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        let addr: u16 = 0x1000;
        env.mem_mut().write_string(addr, line, 0x0d, 200);
        env.cpu
            .set_axyp(env.cpu.a(), (addr & 0xff) as u8, (addr >> 8) as u8, env.cpu.p());
        env
    }

    #[test]
    fn fx_invokes_osbyte_with_the_digits_immediately_after_the_keyword() {
        let mut env = env_with_command("FX125");
        exec_oscli(&mut env);
        // OSBYTE 0x7D (125) sets the escape-pending flag.
        assert_eq!(env.mem().read(crate::addr::ZP_ESCAPE_FLAG), 0x80);
    }

    #[test]
    fn bye_sets_stop() {
        let mut env = env_with_command("BYE");
        exec_oscli(&mut env);
        assert!(env.stop);
    }

    #[test]
    fn unknown_command_raises_bad_command() {
        let mut env = env_with_command("NONSENSE");
        exec_oscli(&mut env);
        assert_eq!(env.mem().read(crate::addr::ERROR_AREA + 1), ERR_BAD_COMMAND);
    }

    #[test]
    fn trailing_dot_expands_to_full_command() {
        let mut env = env_with_command("BAS.");
        exec_oscli(&mut env);
        // BASIC with no language ROM loaded falls back to "Bad command",
        // which still proves the keyword expanded past the literal "BAS".
        assert_eq!(env.mem().read(crate::addr::ERROR_AREA + 1), ERR_BAD_COMMAND);
    }

    #[test]
    fn save_then_load_round_trips_through_host_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog");
        let path_str = path.to_str().unwrap();

        let mut env = env_with_command(&format!("SAVE {path_str} 2000 2004"));
        env.mem_mut().write_slice(0x2000, 4, &[9, 8, 7, 6]);
        exec_oscli(&mut env);

        let mut env = env_with_command(&format!("LOAD {path_str} 3000"));
        exec_oscli(&mut env);
        assert_eq!(env.mem().read_slice(0x3000, 4), vec![9, 8, 7, 6]);
    }

    #[test]
    fn empty_line_is_a_silent_no_op() {
        let mut env = env_with_command("");
        exec_oscli(&mut env);
        assert_eq!(env.mem().read(crate::addr::ERROR_AREA + 1), 0);
    }
}
