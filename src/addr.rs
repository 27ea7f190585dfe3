#![doc = r#"
Fixed memory map for the emulated Acorn MOS address space.

Pages, leaves first:
    00: zero page (MOS-reserved cells used by the handlers below)
    01: stack
    02: guest-writable vectors + MOS workspace variables
    80-bf: active sideways ROM/RAM slot
    fa: scratch area for BRK error messages
    fb: entry points trapped by the host (filled with RTS by the firmware)
    fc: FRED, fd: JIM, fe: SHEILA (I/O trap regions, traced when enabled)
    ff: extended vector table + classic MOS entry points (unused here)

None of these values are configurable: they are the contract the firmware
stub and every `*.ROM` guest binary are built against.
"#]

/// OSCLI command-line pointer (low/high byte).
pub const ZP_STR: u16 = 0x00f2;
/// Shadow of the currently latched ROM slot, written by `initLanguage`.
pub const ZP_ROM_SELECT: u16 = 0x00f4;
/// OSRDRM scratch address (low/high byte).
pub const ZP_RDRM_ADDR: u16 = 0x00f6;
/// Accumulator at the moment a BRK was raised.
pub const ZP_ACCUMULATOR: u16 = 0x00fc;
/// Pointer to the error message following a BRK.
pub const ZP_ERROR_POINTER: u16 = 0x00fd;
/// Escape-condition flag; bit 7 set means "escape pending".
pub const ZP_ESCAPE_FLAG: u16 = 0x00ff;

/// Guest-writable vectors, page 2. Order matches classic BBC MOS.
pub const VECTOR_USERV: u16 = 0x0200;
pub const VECTOR_BRKV: u16 = 0x0202;
pub const VECTOR_IRQ1V: u16 = 0x0204;
pub const VECTOR_IRQ2V: u16 = 0x0206;
pub const VECTOR_CLIV: u16 = 0x0208;
pub const VECTOR_BYTEV: u16 = 0x020a;
pub const VECTOR_WORDV: u16 = 0x020c;
pub const VECTOR_WRCHV: u16 = 0x020e;
pub const VECTOR_RDCHV: u16 = 0x0210;
pub const VECTOR_FILEV: u16 = 0x0212;
pub const VECTOR_ARGSV: u16 = 0x0214;
pub const VECTOR_BGETV: u16 = 0x0216;
pub const VECTOR_BPUTV: u16 = 0x0218;
pub const VECTOR_GBPBV: u16 = 0x021a;
pub const VECTOR_FINDV: u16 = 0x021c;
pub const VECTOR_FSCV: u16 = 0x021e;
pub const VECTOR_EVNTV: u16 = 0x0220;
pub const VECTOR_UPTV: u16 = 0x0222;
pub const VECTOR_NETV: u16 = 0x0224;
pub const VECTOR_VDUV: u16 = 0x0226;
pub const VECTOR_KEYV: u16 = 0x0228;
pub const VECTOR_INSV: u16 = 0x022a;
pub const VECTOR_REMV: u16 = 0x022c;
pub const VECTOR_CNPV: u16 = 0x022e;
pub const VECTOR_IND1V: u16 = 0x0230;
pub const VECTOR_IND2V: u16 = 0x0232;
pub const VECTOR_IND3V: u16 = 0x0234;

/// MOS workspace, page 2: OS variables and assorted globals.
pub const MOS_ROM_TYPE_TABLE: u16 = 0x023a;
pub const MOS_VARIABLES_START: u16 = 0x0236;
pub const MOS_VARIABLES_END: u16 = 0x028f;
/// $0257: guest handle of the currently open `*SPOOL` file, or 0.
pub const SPOOL_FILE_HANDLE: u16 = 0x0257;
/// $027c: bit 4 disables spooled output regardless of the spool handle.
pub const CHAR_DESTINATIONS: u16 = 0x027c;
/// $028c: slot of the currently entered language ROM.
pub const CURRENT_LANGUAGE_SLOT: u16 = 0x028c;

/// Sideways ROM/RAM window.
pub const ROM_START_ADDRESS: u16 = 0x8000;
pub const ROM_END_ADDRESS: u16 = 0xbfff;
/// A ROM's service entry, called with A = service code.
pub const ROM_SERVICE_ENTRY: u16 = 0x8003;
/// Type byte: bit 6 set marks a language ROM.
pub const ROM_TYPE_BYTE: u16 = 0x8006;
pub const ROM_COPYRIGHT_OFFSET_POINTER: u16 = 0x8007;
pub const ROM_TITLE_STRING: u16 = 0x8009;
/// Bit of the ROM type byte that marks a language ROM.
pub const ROM_TYPE_LANGUAGE_BIT: u8 = 0x40;

/// Bottom of user RAM, reported by OSBYTE 0x83.
pub const USER_MEM_BOTTOM: u16 = 0x0e00;

/// Scratch area `raiseError` writes BRK-shaped error blocks into.
pub const ERROR_AREA: u16 = 0xfa00;
pub const ERROR_MESSAGE_MAX_LENGTH: u8 = 100;

/// Sideways-ROM latch, SHEILA page.
pub const SHEILA_ROM_LATCH: u16 = 0xfe30;

/// Trap region: the host intercepts PC landing anywhere in this page.
pub const ENTRY_POINTS: u16 = 0xfb00;
pub const EP_ENTRY_POINTS_LAST: u16 = 0xfb1f;

pub const EP_UPT: u16 = ENTRY_POINTS + 0x00;
pub const EP_EVNT: u16 = ENTRY_POINTS + 0x01;
pub const EP_FSC: u16 = ENTRY_POINTS + 0x02;
pub const EP_FIND: u16 = ENTRY_POINTS + 0x03;
pub const EP_GBPB: u16 = ENTRY_POINTS + 0x04;
pub const EP_BPUT: u16 = ENTRY_POINTS + 0x05;
pub const EP_BGET: u16 = ENTRY_POINTS + 0x06;
pub const EP_ARGS: u16 = ENTRY_POINTS + 0x07;
pub const EP_FILE: u16 = ENTRY_POINTS + 0x08;
pub const EP_RDCH: u16 = ENTRY_POINTS + 0x09;
pub const EP_WRCH: u16 = ENTRY_POINTS + 0x0a;
pub const EP_WORD: u16 = ENTRY_POINTS + 0x0b;
pub const EP_BYTE: u16 = ENTRY_POINTS + 0x0c;
pub const EP_CLI: u16 = ENTRY_POINTS + 0x0d;
pub const EP_IRQ2: u16 = ENTRY_POINTS + 0x0e;
pub const EP_IRQ1: u16 = ENTRY_POINTS + 0x0f;
pub const EP_BRK: u16 = ENTRY_POINTS + 0x10;
pub const EP_USER: u16 = ENTRY_POINTS + 0x11;
pub const EP_SYSBRK: u16 = ENTRY_POINTS + 0x12;
pub const EP_RDRM: u16 = ENTRY_POINTS + 0x13;
pub const EP_VDUCH: u16 = ENTRY_POINTS + 0x14;
pub const EP_GSINIT: u16 = ENTRY_POINTS + 0x15;
pub const EP_GSREAD: u16 = ENTRY_POINTS + 0x16;
pub const EP_NET: u16 = ENTRY_POINTS + 0x17;
pub const EP_VDU: u16 = ENTRY_POINTS + 0x18;
pub const EP_KEY: u16 = ENTRY_POINTS + 0x19;
pub const EP_INS: u16 = ENTRY_POINTS + 0x1a;
pub const EP_REM: u16 = ENTRY_POINTS + 0x1b;
pub const EP_CNP: u16 = ENTRY_POINTS + 0x1c;
pub const EP_IND1: u16 = ENTRY_POINTS + 0x1d;
pub const EP_IND2: u16 = ENTRY_POINTS + 0x1e;
pub const EP_IND3: u16 = ENTRY_POINTS + 0x1f;

/// A future, unimplemented feature: calling through here is an error.
pub const EXTENDED_VECTOR_TABLE_START: u16 = 0xff00;
pub const EXTENDED_VECTOR_TABLE_END: u16 = 0xff52;

/// 6502 reset/BRK vectors, fixed by the processor itself.
pub const VECTOR_RESET: u16 = 0xfffc;
pub const VECTOR_BREAK: u16 = 0xfffe;
