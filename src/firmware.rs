//! The firmware blob: "a pre-assembled firmware blob" per the specification,
//! an opaque byte array consumed at init (spec.md §1 names the firmware
//! binary itself an external collaborator, outside this crate's scope).
//!
//! This crate ships a stub image: every byte is `$60` (RTS). The guest-visible
//! contract that real firmware gives (GSINIT/GSREAD, the service-ROM walk,
//! OSBYTE 0x8E's language entry helper) is reproduced natively by the
//! handlers in `src/handlers/`, which redirect PC into this page only to
//! land on an immediate `RTS` back into the dispatch loop — see
//! `DESIGN.md` for why hand-assembling unverifiable 6502 machine code was
//! rejected in favour of this approach.

/// Size of the stub image; covers the zero page through the MOS workspace
/// so any firmware-relative procedure address the handlers hand out still
/// resolves to an in-bounds `RTS`.
pub const FIRMWARE_SIZE: usize = 0x0300;

pub const FIRMWARE: [u8; FIRMWARE_SIZE] = [0x60; FIRMWARE_SIZE];

/// Firmware procedure addresses the handlers redirect PC to. All three
/// happen to sit in the same stub page; kept distinct so a future firmware
/// image could place them elsewhere without touching the handlers.
pub const PROC_GSINIT: u16 = 0x0100;
pub const PROC_GSREAD: u16 = 0x0101;
pub const PROC_SERVICE_ROMS: u16 = 0x0102;
