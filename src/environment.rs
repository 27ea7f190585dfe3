#![doc = r#"
`Environment` owns every other component and the process-wide clocks.

It is the facade the dispatcher and every OS* handler borrow mutably: CPU
(which itself owns [`Memory`]), [`Vdu`], [`Console`], [`FileTable`], plus
the reference clock, interval timer, and the escape-condition latch that is
the one piece of state a second thread is allowed to touch (spec.md §5).
"#]

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::addr::*;
use crate::console::Console;
use crate::cpu::CpuAdapter;
use crate::files::FileTable;
use crate::memory::Memory;
use crate::vdu::Vdu;

/// Escape-condition latch: the only state a second thread (the Ctrl-C
/// signal handler installed in `main`) is allowed to touch. A single
/// atomic byte plus a debounce timestamp behind a mutex, both `Sync`
/// independent of everything else `Environment` owns (spec.md §5,
/// "Cross-context escape flag").
#[derive(Clone)]
pub struct EscapeLatch {
    pending: Arc<AtomicU8>,
    last_signal: Arc<Mutex<Option<Instant>>>,
}

impl EscapeLatch {
    pub fn new() -> Self {
        EscapeLatch {
            pending: Arc::new(AtomicU8::new(0)),
            last_signal: Arc::new(Mutex::new(None)),
        }
    }

    /// Called by the signal source. If fired twice within 500ms, terminate
    /// the process outright; otherwise latch the escape condition for the
    /// guest to observe at its next OSBYTE 0x7E poll.
    pub fn signal(&self) {
        let now = Instant::now();
        let mut last = self.last_signal.lock().unwrap();
        if let Some(prev) = *last {
            if now.duration_since(prev) < Duration::from_millis(500) {
                std::process::exit(0);
            }
        }
        *last = Some(now);
        self.pending.store(0x80, Ordering::SeqCst);
    }

    fn take_pending(&self) -> u8 {
        self.pending.swap(0, Ordering::SeqCst)
    }
}

impl Default for EscapeLatch {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Environment {
    pub cpu: CpuAdapter,
    pub vdu: Vdu,
    pub con: Box<dyn Console>,
    pub files: FileTable,

    /// Anchor for OSWORD 01/02 (the system clock, BASIC's `TIME`).
    reference_time: Instant,
    /// Interval timer value (only 40 bits are meaningful) plus its anchor,
    /// for OSWORD 03/04.
    timer: u64,
    last_timer_update: Instant,

    pub escape_latch: EscapeLatch,

    pub stop: bool,

    pub api_log: bool,
    pub api_log_io: bool,
    pub panic_on_err: bool,
}

impl Environment {
    pub fn new(
        con: Box<dyn Console>,
        api_log: bool,
        api_log_io: bool,
        mem_log: bool,
        panic_on_err: bool,
    ) -> Self {
        let memory = Memory::new(mem_log);
        let now = Instant::now();
        Environment {
            cpu: CpuAdapter::new(memory),
            vdu: Vdu::new(),
            con,
            files: FileTable::new(),
            reference_time: now,
            timer: 0,
            last_timer_update: now,
            escape_latch: EscapeLatch::new(),
            stop: false,
            api_log,
            api_log_io,
            panic_on_err,
        }
    }

    pub fn mem(&self) -> &Memory {
        self.cpu.memory()
    }

    pub fn mem_mut(&mut self) -> &mut Memory {
        self.cpu.memory_mut()
    }

    /// Copy any pending cross-thread escape signal into zp $FF. Cheap
    /// enough to call once per dispatch-loop iteration.
    pub fn sync_escape_flag(&mut self) {
        let pending = self.escape_latch.take_pending();
        if pending != 0 {
            self.mem_mut().write(ZP_ESCAPE_FLAG, pending);
        }
    }

    // --- clocks --------------------------------------------------------

    /// Centiseconds elapsed since `reference_time`, for OSWORD 01.
    pub fn clock_centiseconds(&self) -> u64 {
        self.reference_time.elapsed().as_millis() as u64 / 10
    }

    /// Rewind `reference_time` so the clock reads `ticks` right now
    /// (OSWORD 02).
    pub fn set_clock_centiseconds(&mut self, ticks: u64) {
        self.reference_time = Instant::now() - Duration::from_millis(ticks * 10);
    }

    /// Current interval timer value, for OSWORD 03.
    pub fn interval_timer(&self) -> u64 {
        let elapsed = self.last_timer_update.elapsed().as_millis() as u64 / 10;
        self.timer.wrapping_add(elapsed)
    }

    /// Set the interval timer and reset its anchor (OSWORD 04).
    pub fn set_interval_timer(&mut self, value: u64) {
        self.timer = value;
        self.last_timer_update = Instant::now();
    }

    // --- diagnostics -----------------------------------------------------

    pub fn log(&self, msg: &str) {
        if self.api_log {
            log::debug!("{msg}");
        }
    }

    pub fn log_io(&self, msg: &str) {
        if self.api_log_io {
            log::trace!("{msg}");
        }
    }

    pub fn not_implemented(&mut self, feature: &str) {
        let msg = format!("Not implemented: {feature}");
        if self.panic_on_err {
            panic!("{msg}");
        }
        log::warn!("{msg}");
    }

    // --- spool file ------------------------------------------------------

    /// Mirror everything written to the console into the `*SPOOL` file, if
    /// one is open and spooling is not disabled (bit 4 of $027C).
    pub fn write_spool(&mut self, s: &str) {
        let char_dest = self.mem().read(CHAR_DESTINATIONS);
        if char_dest & 0x10 != 0 {
            return;
        }
        let handle = self.mem().read(SPOOL_FILE_HANDLE);
        if handle == 0 {
            return;
        }
        let _ = self.files.write_current(handle, s.as_bytes());
    }

    // --- errors ----------------------------------------------------------

    /// Write a BRK-shaped error block (`{0x00, code, msg…, 0x00}`) at
    /// `address` and redirect PC there, letting the normal BRK path carry
    /// it to SYSBRK and then BRKV.
    pub fn store_error(&mut self, address: u16, code: u8, msg: &str) {
        self.mem_mut().write(address, 0x00);
        self.mem_mut().write(address + 1, code);
        self.mem_mut()
            .write_string(address + 2, msg, 0, ERROR_MESSAGE_MAX_LENGTH);
    }

    pub fn raise_error(&mut self, code: u8, msg: &str) {
        self.store_error(ERROR_AREA, code, msg);
        self.cpu.set_pc(ERROR_AREA);
        self.log(&format!("RAISE(ERR={code:02x}, '{msg}')"));
    }

    pub fn close(&mut self) {
        self.con.close();
    }

    // --- boot --------------------------------------------------------------

    /// Load the firmware blob at $0000, fill the trap page with `RTS` so a
    /// handler's return naturally unwinds the guest's call, and point the
    /// hardware BRK vector and every page-2 MOS vector at their matching
    /// trap address (spec.md §4.J, §6 "Fixed memory map").
    pub fn install_firmware(&mut self) {
        self.mem_mut().load_firmware(&crate::firmware::FIRMWARE);

        for addr in ENTRY_POINTS..=EP_ENTRY_POINTS_LAST {
            self.mem_mut().write(addr, 0x60); // RTS
        }

        self.mem_mut().write_word(VECTOR_BREAK, EP_SYSBRK);

        let vectors = [
            (VECTOR_USERV, EP_USER),
            (VECTOR_BRKV, EP_BRK),
            (VECTOR_IRQ1V, EP_IRQ1),
            (VECTOR_IRQ2V, EP_IRQ2),
            (VECTOR_CLIV, EP_CLI),
            (VECTOR_BYTEV, EP_BYTE),
            (VECTOR_WORDV, EP_WORD),
            (VECTOR_WRCHV, EP_WRCH),
            (VECTOR_RDCHV, EP_RDCH),
            (VECTOR_FILEV, EP_FILE),
            (VECTOR_ARGSV, EP_ARGS),
            (VECTOR_BGETV, EP_BGET),
            (VECTOR_BPUTV, EP_BPUT),
            (VECTOR_GBPBV, EP_GBPB),
            (VECTOR_FINDV, EP_FIND),
            (VECTOR_FSCV, EP_FSC),
            (VECTOR_EVNTV, EP_EVNT),
            (VECTOR_UPTV, EP_UPT),
            (VECTOR_NETV, EP_NET),
            (VECTOR_VDUV, EP_VDU),
            (VECTOR_KEYV, EP_KEY),
            (VECTOR_INSV, EP_INS),
            (VECTOR_REMV, EP_REM),
            (VECTOR_CNPV, EP_CNP),
            (VECTOR_IND1V, EP_IND1),
            (VECTOR_IND2V, EP_IND2),
            (VECTOR_IND3V, EP_IND3),
        ];
        for (vector, target) in vectors {
            self.mem_mut().write_word(vector, target);
        }

        self.init_os_vars();
    }

    /// Default MOS workspace variables (spec.md §4.J); the handful the
    /// original firmware's `initOSVars` seeds explicitly.
    fn init_os_vars(&mut self) {
        self.mem_mut().write(MOS_VARIABLES_START + (0xa8 - 0xa6), (EXTENDED_VECTOR_TABLE_START & 0xff) as u8);
        self.mem_mut().write(MOS_VARIABLES_START + (0xa9 - 0xa6), (EXTENDED_VECTOR_TABLE_START >> 8) as u8);
        self.mem_mut().write(MOS_VARIABLES_START + (0xda - 0xa6), 0);
        self.mem_mut().write(MOS_VARIABLES_START + (0xec - 0xa6), 0);
        self.mem_mut().write(MOS_VARIABLES_START + (0xfd - 0xa6), 1);
    }

    /// Load a guest ROM image into `slot`. Slots are scanned 15 down to 0
    /// by the caller, matching the CLI's `--rom<i>` numbering (spec.md §6).
    pub fn load_rom(&mut self, data: &[u8], slot: u8) {
        self.mem_mut().load_rom(data, slot, true);
    }

    /// Scan slots top-down for the first ROM with the language bit set and
    /// enter it (spec.md §4.J).
    pub fn init_upper_language(&mut self) {
        for slot in (0..=0x0f).rev() {
            let rom_type = self.mem().read(MOS_ROM_TYPE_TABLE + slot as u16);
            if rom_type & ROM_TYPE_LANGUAGE_BIT != 0 {
                self.init_language(slot);
                return;
            }
        }
        panic!("There is no language ROM available to boot");
    }

    /// Enter a specific language ROM slot directly (OSBYTE 0x8E).
    pub fn enter_language(&mut self, slot: u8) {
        self.init_language(slot);
    }

    fn init_language(&mut self, slot: u8) {
        self.mem_mut().write(ZP_ROM_SELECT, slot);
        self.mem_mut().write(SHEILA_ROM_LATCH, slot);

        let offset = self.mem().read(ROM_COPYRIGHT_OFFSET_POINTER);
        let copyright_address = ROM_START_ADDRESS.wrapping_add(1).wrapping_add(offset as u16);
        self.mem_mut().write_word(ZP_ERROR_POINTER, copyright_address);

        let title = self.mem().read_string(ROM_TITLE_STRING, 0);
        self.con.write(&title);
        self.con.write("\n");

        self.cpu.set_axyp(1, self.cpu.x(), self.cpu.y(), self.cpu.p());
        self.cpu.set_pc(ROM_START_ADDRESS);
    }
}
