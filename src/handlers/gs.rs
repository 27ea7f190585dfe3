//! GSINIT / GSREAD: BBC-string-parsing escape rules. Real MOS implements
//! these as assembly routines inside the firmware blob; since this crate's
//! firmware is a stub, the host just logs the call and redirects PC into
//! the stub procedure, which is an immediate `RTS` back to the caller.

use crate::environment::Environment;
use crate::firmware::{PROC_GSINIT, PROC_GSREAD};

pub fn exec_gsinit(env: &mut Environment) {
    env.log("GSINIT()");
    env.cpu.set_pc(PROC_GSINIT);
}

pub fn exec_gsread(env: &mut Environment) {
    env.log("GSREAD()");
    env.cpu.set_pc(PROC_GSREAD);
}

#[cfg(test)]
mod tests {
    use crate::console::MockConsole;
    use crate::environment::Environment;

    #[test]
    fn gsinit_redirects_pc_to_the_stub_procedure() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        super::exec_gsinit(&mut env);
        assert_eq!(env.cpu.pc(), crate::firmware::PROC_GSINIT);
    }

    #[test]
    fn gsread_redirects_pc_to_the_stub_procedure() {
        let mut env = Environment::new(Box::new(MockConsole::new(vec![])), false, false, false, false);
        super::exec_gsread(&mut env);
        assert_eq!(env.cpu.pc(), crate::firmware::PROC_GSREAD);
    }
}
