#![doc = r#"
The file table: guest handle -> host file, plus `.inf` sidecar metadata.

Guest handle `h` maps to table index `h - 1`; handle 0 means "none" on
close (or "all" for close-all). `.inf` sidecars are a plain companion file
next to the data file carrying load/exec/size/attribute metadata that the
BBC filing systems keep out-of-band (spec.md §3/§4.H).
"#]

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{HostError, ERR_CATALOGUE_FULL, ERR_CHANNEL};

/// Recommended in spec.md §9 Open Questions: the historical implementation
/// splits 5 vs 100; fixed here at 100 so realistic workloads don't hit
/// "Catalogue full" early.
pub const MAX_FILES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
    Update,
}

impl FileMode {
    /// Decode an OSFIND `A` open-mode byte.
    pub fn from_osfind_byte(a: u8) -> Option<Self> {
        match a {
            0x40 => Some(FileMode::Read),
            0x80 => Some(FileMode::Write),
            0xc0 => Some(FileMode::Update),
            _ => None,
        }
    }
}

struct Entry {
    file: File,
    #[allow(dead_code)]
    mode: FileMode,
}

pub struct FileTable {
    entries: [Option<Entry>; MAX_FILES],
}

/// Result of a raised guest error the caller must turn into
/// `Environment::raise_error`.
pub struct GuestError {
    pub code: u8,
    pub message: String,
}

impl GuestError {
    fn new(code: u8, message: &str) -> Self {
        GuestError {
            code,
            message: message.to_string(),
        }
    }
}

impl FileTable {
    pub fn new() -> Self {
        FileTable {
            entries: std::array::from_fn(|_| None),
        }
    }

    /// Open `path` in `mode`, returning the guest handle (1-based) or a
    /// guest error (190 "Catalogue full" on exhaustion, 129 on a host I/O
    /// failure).
    pub fn open(&mut self, path: &str, mode: FileMode) -> Result<u8, GuestError> {
        let slot = self
            .entries
            .iter()
            .position(|e| e.is_none())
            .ok_or_else(|| GuestError::new(ERR_CATALOGUE_FULL, "Catalogue full"))?;

        let file = match mode {
            FileMode::Read => OpenOptions::new().read(true).create(true).open(path),
            FileMode::Write => File::create(path),
            FileMode::Update => OpenOptions::new().read(true).write(true).create(true).open(path),
        }
        .map_err(|e| GuestError::new(crate::error::ERR_TODO, &e.to_string()))?;

        self.entries[slot] = Some(Entry { file, mode });
        Ok((slot + 1) as u8)
    }

    /// Idempotent on handle 0.
    pub fn close(&mut self, handle: u8) {
        if handle == 0 {
            return;
        }
        let idx = (handle - 1) as usize;
        if idx < MAX_FILES {
            self.entries[idx] = None;
        }
    }

    pub fn close_all(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = None;
        }
    }

    fn entry_mut(&mut self, handle: u8) -> Result<&mut File, HostError> {
        let idx = handle.wrapping_sub(1) as usize;
        self.entries
            .get_mut(idx)
            .and_then(|e| e.as_mut())
            .map(|e| &mut e.file)
            .ok_or(HostError::Guest(ERR_CHANNEL, "Channel".to_string()))
    }

    pub fn read_byte(&mut self, handle: u8) -> Result<Option<u8>, HostError> {
        let file = self.entry_mut(handle)?;
        let mut buf = [0u8; 1];
        match file.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) => Err(HostError::Io(e)),
        }
    }

    pub fn write_byte(&mut self, handle: u8, value: u8) -> Result<(), HostError> {
        let file = self.entry_mut(handle)?;
        file.write_all(&[value]).map_err(HostError::Io)
    }

    pub fn seek(&mut self, handle: u8, pos: u64) -> Result<(), HostError> {
        let file = self.entry_mut(handle)?;
        file.seek(SeekFrom::Start(pos)).map(|_| ()).map_err(HostError::Io)
    }

    pub fn tell(&mut self, handle: u8) -> Result<u64, HostError> {
        let file = self.entry_mut(handle)?;
        file.stream_position().map_err(HostError::Io)
    }

    pub fn len(&mut self, handle: u8) -> Result<u64, HostError> {
        let file = self.entry_mut(handle)?;
        file.metadata().map(|m| m.len()).map_err(HostError::Io)
    }

    pub fn read_at(&mut self, handle: u8, offset: u64, buf: &mut [u8]) -> Result<usize, HostError> {
        self.seek(handle, offset)?;
        let file = self.entry_mut(handle)?;
        file.read(buf).map_err(HostError::Io)
    }

    pub fn write_at(&mut self, handle: u8, offset: u64, data: &[u8]) -> Result<usize, HostError> {
        self.seek(handle, offset)?;
        let file = self.entry_mut(handle)?;
        file.write(data).map_err(HostError::Io)
    }

    pub fn read_current(&mut self, handle: u8, buf: &mut [u8]) -> Result<usize, HostError> {
        let file = self.entry_mut(handle)?;
        file.read(buf).map_err(HostError::Io)
    }

    pub fn write_current(&mut self, handle: u8, data: &[u8]) -> Result<usize, HostError> {
        let file = self.entry_mut(handle)?;
        file.write(data).map_err(HostError::Io)
    }
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Parsed `.inf` sidecar: `"<leafname> LLLLLLLL EEEEEEEE SSSSSSSS AA"`
/// (load/exec/size in hex, attributes as a two-hex-digit byte).
#[derive(Debug, Clone, Copy, Default)]
pub struct Metadata {
    pub load_addr: u32,
    pub exec_addr: u32,
    pub size: u32,
    pub attributes: u8,
}

fn inf_path(path: &str) -> String {
    format!("{path}.inf")
}

/// Read and parse `path.inf`. Parse failures are treated as "no metadata"
/// rather than a guest error (spec.md §4.H): the caller logs at `warn!`.
pub fn read_metadata(path: &str) -> Option<Metadata> {
    let contents = std::fs::read_to_string(inf_path(path)).ok()?;
    parse_metadata(&contents)
}

fn parse_metadata(contents: &str) -> Option<Metadata> {
    let mut fields = contents.split_whitespace();
    let _leafname = fields.next()?;
    let load_addr = u32::from_str_radix(fields.next()?, 16).ok()?;
    let exec_addr = u32::from_str_radix(fields.next()?, 16).ok()?;
    let size = u32::from_str_radix(fields.next()?, 16).ok()?;
    let attributes = u8::from_str_radix(fields.next()?, 16).ok()?;
    Some(Metadata {
        load_addr,
        exec_addr,
        size,
        attributes,
    })
}

/// Write `path.inf` using the leafname (last path component) of `path`.
pub fn write_metadata(path: &str, meta: &Metadata) -> std::io::Result<()> {
    let leafname = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    let contents = format!(
        "{leafname} {:08X} {:08X} {:08X} {:02X}\n",
        meta.load_addr, meta.exec_addr, meta.size, meta.attributes
    );
    std::fs::write(inf_path(path), contents)
}

pub fn delete_metadata(path: &str) {
    let _ = std::fs::remove_file(inf_path(path));
}
