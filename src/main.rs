mod addr;
mod config;
mod console;
mod cpu;
mod dispatch;
mod environment;
mod error;
mod files;
mod firmware;
mod handlers;
mod memory;
mod vdu;

use config::Config;
use console::{Console, PlainConsole};
use environment::Environment;

fn main() {
    env_logger::init();

    let config = Config::parse(std::env::args().skip(1));

    println!("bbz - Acorn MOS for 6502 language ROMs");
    println!("(tip: uppercase is usually needed)\n");

    let con: Box<dyn Console> = build_console(&config);

    let mut env = Environment::new(
        con,
        config.trace_mos,
        config.trace_mos_io,
        config.trace_memory,
        config.panic_on_err,
    );

    let escape_latch = env.escape_latch.clone();
    if let Err(e) = ctrlc::set_handler(move || escape_latch.signal()) {
        log::warn!("Could not install Ctrl-C handler: {e}");
    }

    env.install_firmware();

    for i in 0..16usize {
        let slot = (15 - i) as u8;
        let path = config.rom_paths[i].clone().or_else(|| if i == 0 { config.rom_file.clone() } else { None });
        let Some(path) = path else { continue };
        match std::fs::read(&path) {
            Ok(data) => env.load_rom(&data, slot),
            Err(e) => {
                eprintln!("Failed to load ROM '{path}': {e}");
                std::process::exit(1);
            }
        }
    }
    env.mem_mut().fill_remaining_slots_with_ram();

    dispatch::run(&mut env);

    env.close();
}

fn build_console(config: &Config) -> Box<dyn Console> {
    #[cfg(feature = "readline")]
    {
        if !config.disable_readline {
            return Box::new(console::InteractiveConsole::new());
        }
    }
    let _ = config.disable_readline;
    Box::new(PlainConsole::new())
}
