//! OSRDRM: read a byte from a paged ROM bank without disturbing the
//! currently active one.

use crate::addr::ZP_RDRM_ADDR;
use crate::environment::Environment;

pub fn exec_osrdrm(env: &mut Environment) {
    let (x, p) = (env.cpu.x(), env.cpu.p());
    let bank = env.cpu.y();
    let address = env.mem().read_word(ZP_RDRM_ADDR);

    let value = env.mem().read_slot(bank, address);

    env.cpu.set_axyp(value, x, bank, p);
    env.log(&format!("OSRDRM(BANK={bank},ADDR=0x{address:04x}) => 0x{value:02x}"));
}

#[cfg(test)]
mod tests {
    use crate::console::MockConsole;
    use crate::environment::Environment;

    #[test]
    fn reads_from_requested_bank_without_switching_active_slot() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        env.mem_mut().load_rom(&[0xab; 0x4000], 4, true);
        env.mem_mut().set_active_slot(9);

        env.mem_mut().write_word(ZP_RDRM_ADDR, crate::addr::ROM_START_ADDRESS);
        env.cpu.set_axyp(0, 0, 4, env.cpu.p());
        super::exec_osrdrm(&mut env);

        assert_eq!(env.cpu.a(), 0xab);
        assert_eq!(env.mem().active_slot(), 9);
    }
}
