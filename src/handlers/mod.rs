#![doc = r#"
OS* handler implementations, one module per MOS entry point family.

Every handler shares one shape: read A/X/Y/P off the CPU adapter, perform
the service against host resources (`Environment`'s Memory/Console/Files),
then write results back with `cpu.set_axyp(...)`. The trap address's
synthesised `RTS` does the rest (spec.md §4.F).
"#]

pub mod args;
pub mod bget_bput;
pub mod byte;
pub mod cli;
pub mod file;
pub mod find;
pub mod gbpb;
pub mod gs;
pub mod rdrm;
pub mod service_rom;
pub mod sysbrk;
pub mod word;
pub mod wrch_rdch;
