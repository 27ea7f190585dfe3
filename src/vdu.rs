#![doc = r#"
The VDU stream state machine.

Bytes written by OSWRCH pass through here one at a time. Most opcodes take
no arguments and are dispatched immediately; a handful declare a fixed
number of trailing argument bytes (see [`arg_count`]), which are queued
until the full command is available and then dispatched atomically - this
makes the state machine a trivial collect-then-dispatch loop rather than
per-opcode parsing code (spec.md Design Notes, "VDU arg-count table as
static data").

Mode-7 (teletext) colour state needs a reset sequence emitted before
certain cursor-relocation codes so ANSI colour does not bleed across a
clear/linefeed/home; `mode7_reset_code` centralises that.
"#]

use crate::console::Console;

/// Number of argument bytes opcode `cmd` expects after itself.
fn arg_count(cmd: u8) -> usize {
    match cmd {
        1 => 1,
        17 => 1,
        18 => 2,
        19 => 5,
        20 => 0,
        22 => 1,
        23 => 9,
        24 => 8,
        25 => 5,
        28 => 4,
        29 => 4,
        31 => 2,
        _ => 0,
    }
}

pub struct Vdu {
    queue: Vec<u8>,

    pub mode: u8,

    // Modes 0-6
    pub text_colour: u8,
    pub graph_colour: u8,

    // Mode 7
    pub mode7_fg: u8,
    pub mode7_bg: u8,
    pub mode7_flash: bool,

    pub printer_on: bool,
    pub text_on_graphics: bool,
    pub vdu_disabled: bool,
    pub paged_mode: bool,
}

impl Vdu {
    pub fn new() -> Self {
        Vdu {
            queue: Vec::new(),
            mode: 7,
            text_colour: 0,
            graph_colour: 0,
            mode7_fg: 7,
            mode7_bg: 0,
            mode7_flash: false,
            printer_on: false,
            text_on_graphics: false,
            vdu_disabled: false,
            paged_mode: false,
        }
    }

    /// Abandon any queued-but-incomplete command, used by OSBYTE 0xDA.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    /// Feed one byte into the state machine. A new opcode mid-queue is
    /// treated as an additional argument for the pending command until it
    /// is complete (spec.md §4.C, "Queueing rule"). Returns whatever text
    /// was actually sent to `console` this call, so the caller can mirror
    /// the same bytes into the `*SPOOL` file.
    pub fn write(&mut self, byte: u8, console: &mut dyn Console) -> String {
        if self.queue.is_empty() {
            if arg_count(byte) == 0 {
                self.dispatch(byte, &[], console)
            } else {
                self.queue.push(byte);
                String::new()
            }
        } else {
            self.queue.push(byte);
            let opcode = self.queue[0];
            if self.queue.len() - 1 == arg_count(opcode) {
                let args = self.queue[1..].to_vec();
                self.queue.clear();
                self.dispatch(opcode, &args, console)
            } else {
                String::new()
            }
        }
    }

    fn emit(&self, s: &str, console: &mut dyn Console) -> String {
        if !self.vdu_disabled && !s.is_empty() {
            console.write(s);
            s.to_string()
        } else {
            String::new()
        }
    }

    fn dispatch(&mut self, cmd: u8, args: &[u8], console: &mut dyn Console) -> String {
        let mut out = String::new();
        match cmd {
            0 => {}
            1 => { /* next char to printer only; no screen effect here */ }
            2 => self.printer_on = true,
            3 => self.printer_on = false,
            4 => self.text_on_graphics = false,
            5 => self.text_on_graphics = true,
            6 => self.vdu_disabled = false,
            7 => out.push(7 as char),
            8 => out.push_str("\x1b[D"),
            9 => out.push_str("\x1b[C"),
            10 => {
                out.push_str(&self.mode7_reset_code());
                out.push('\n');
            }
            11 => out.push_str("\x1b[A"),
            12 => {
                out.push_str(&self.mode7_reset_code());
                out.push_str("\x1b[2J\x1b[H");
            }
            13 => {
                out.push_str(&self.mode7_reset_code());
                out.push('\r');
            }
            14 => self.paged_mode = true,
            15 => self.paged_mode = false,
            16 => { /* clear graphics: no framebuffer to clear */ }
            17 => self.text_colour = args[0],
            18 => self.graph_colour = args[1],
            19 => { /* logical->physical palette map: no-op in text mode */ }
            20 => {
                self.text_colour = 0;
                self.graph_colour = 0;
            }
            21 => self.vdu_disabled = true,
            22 => {
                out.push_str(&self.mode7_reset_code());
                self.mode = args[0];
                self.mode7_fg = 7;
                self.mode7_bg = 0;
                self.mode7_flash = false;
            }
            23 => { /* user-defined character: consumed, no effect */ }
            24 | 25 | 28 | 29 => { /* graphics/text window, PLOT, origin: consumed, state stored */ }
            26 => {
                out.push_str(&self.mode7_reset_code());
                out.push_str("\x1b[H");
            }
            27 => {}
            30 => {
                out.push_str(&self.mode7_reset_code());
                out.push_str("\x1b[H");
            }
            31 => { /* move text cursor: consumed */ }
            127 => out.push_str("\x1b[D \x1b[D"),
            32..=126 => {
                if self.mode == 7 {
                    out.push_str(&mode7_ascii_substitution(cmd));
                } else {
                    out.push_str(&ascii_substitution(cmd));
                }
            }
            _ => {
                if self.mode == 7 {
                    out.push_str(&self.mode7_overlay(cmd));
                } else {
                    out.push(' ');
                }
            }
        }
        self.emit(&out, console)
    }

    fn mode7_overlay(&mut self, cmd: u8) -> String {
        match cmd {
            129..=135 => {
                self.mode7_fg = cmd - 129 + 1;
                format!("\x1b[{}m ", self.mode7_fg as u16 + 30)
            }
            136 => {
                self.mode7_flash = true;
                "\x1b[5m ".to_string()
            }
            137 => {
                self.mode7_flash = false;
                "\x1b[25m ".to_string()
            }
            156 => {
                self.mode7_bg = 0;
                format!("\x1b[{}m ", self.mode7_bg as u16 + 40)
            }
            157 => {
                self.mode7_bg = self.mode7_fg;
                format!("\x1b[{}m ", self.mode7_bg as u16 + 40)
            }
            128..=159 => " ".to_string(),
            _ => mode7_ascii_substitution(cmd & 0x7f),
        }
    }

    /// Emits the sequence needed to reset mode-7 colour/flash state back to
    /// defaults (white on black, steady) before a cursor-relocating or
    /// mode-changing command, so terminal colour does not bleed.
    fn mode7_reset_code(&mut self) -> String {
        if self.mode != 7 {
            return String::new();
        }
        let mut out = String::new();
        if self.mode7_fg != 7 {
            out.push_str("\x1b[37m");
            self.mode7_fg = 7;
        }
        if self.mode7_bg != 0 {
            out.push_str("\x1b[40m");
            self.mode7_bg = 0;
        }
        if self.mode7_flash {
            out.push_str("\x1b[25m");
            self.mode7_flash = false;
        }
        out
    }
}

impl Default for Vdu {
    fn default() -> Self {
        Self::new()
    }
}

/// ASCII codes differ from standard ASCII for a couple of characters; see
/// http://beebwiki.mdfs.net/ASCII.
fn ascii_substitution(ch: u8) -> String {
    match ch {
        b'`' => "£".to_string(),
        b'|' => "¦".to_string(),
        _ => (ch as char).to_string(),
    }
}

fn mode7_ascii_substitution(ch: u8) -> String {
    match ch {
        b'[' => "←".to_string(),
        b'\\' => "½".to_string(),
        b']' => "→".to_string(),
        b'^' => "↑".to_string(),
        b'_' => "–".to_string(),
        b'`' => "£".to_string(),
        b'{' => "¼".to_string(),
        b'|' => "‖".to_string(),
        b'}' => "¾".to_string(),
        b'~' => "÷".to_string(),
        _ => ascii_substitution(ch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MockConsole;

    #[test]
    fn printable_chars_pass_through() {
        let mut vdu = Vdu::new();
        let mut con = MockConsole::new(vec![]);
        vdu.write(b'A', &mut con);
        assert_eq!(con.output(), "A");
    }

    #[test]
    fn backtick_and_pipe_are_substituted() {
        let mut vdu = Vdu::new();
        let mut con = MockConsole::new(vec![]);
        vdu.write(b'`', &mut con);
        vdu.write(b'|', &mut con);
        assert_eq!(con.output(), "£¦");
    }

    #[test]
    fn multi_byte_command_is_buffered_until_complete() {
        let mut vdu = Vdu::new();
        let mut con = MockConsole::new(vec![]);
        vdu.write(17, &mut con);
        assert_eq!(vdu.text_colour, 0);
        vdu.write(4, &mut con);
        assert_eq!(vdu.text_colour, 4);
    }

    #[test]
    fn split_across_writes_is_deterministic() {
        let seq: [u8; 3] = [22, 7, b'X'];
        let mut vdu_a = Vdu::new();
        let mut con_a = MockConsole::new(vec![]);
        for &b in seq.iter() {
            vdu_a.write(b, &mut con_a);
        }

        let mut vdu_b = Vdu::new();
        let mut con_b = MockConsole::new(vec![]);
        vdu_b.write(22, &mut con_b);
        vdu_b.write(7, &mut con_b);
        vdu_b.write(b'X', &mut con_b);

        assert_eq!(vdu_a.mode, vdu_b.mode);
        assert_eq!(con_a.output(), con_b.output());
    }

    #[test]
    fn disabled_vdu_still_updates_state_without_output() {
        let mut vdu = Vdu::new();
        let mut con = MockConsole::new(vec![]);
        vdu.write(21, &mut con); // disable
        vdu.write(22, &mut con);
        vdu.write(0, &mut con);
        assert_eq!(vdu.mode, 0);
        assert_eq!(con.output(), "");
    }

    #[test]
    fn mode7_text_substitution() {
        let mut vdu = Vdu::new();
        let mut con = MockConsole::new(vec![]);
        for &b in b"[]{}" {
            vdu.write(b, &mut con);
        }
        assert_eq!(con.output(), "←→¼¾");
    }
}
