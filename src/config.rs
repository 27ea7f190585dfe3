#![doc = r#"
CLI flags.

Argument parsing is an explicit external collaborator per the
specification, so `Config::parse` is a compact hand-rolled scanner in the
style of the original `ivanizag/bbz`'s use of Go's `flag` package, not a
declarative CLI-argument crate.
"#]

pub struct Config {
    pub trace_cpu: bool,
    pub trace_mos: bool,
    pub trace_mos_io: bool,
    pub trace_memory: bool,
    pub panic_on_err: bool,
    pub disable_readline: bool,
    pub profile: bool,
    pub rom_paths: [Option<String>; 16],
    pub rom_file: Option<String>,
}

impl Config {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut config = Config {
            trace_cpu: false,
            trace_mos: false,
            trace_mos_io: false,
            trace_memory: false,
            panic_on_err: false,
            disable_readline: false,
            profile: false,
            rom_paths: Default::default(),
            rom_file: None,
        };

        let mut args = args.into_iter().peekable();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-c" => config.trace_cpu = true,
                "-m" => config.trace_mos = true,
                "-M" => {
                    config.trace_mos = true;
                    config.trace_mos_io = true;
                }
                "-s" => config.trace_memory = true,
                "-p" => config.panic_on_err = true,
                "-r" => config.disable_readline = true,
                "--profile" => config.profile = true,
                other => {
                    if let Some(rest) = other.strip_prefix("--rom") {
                        if let Some((index, path)) = rest.split_once('=') {
                            if let Ok(slot) = index.parse::<usize>() {
                                if slot < 16 {
                                    config.rom_paths[slot] = Some(path.to_string());
                                }
                            }
                        }
                    } else if !other.starts_with('-') {
                        config.rom_file = Some(other.to_string());
                    }
                }
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn capital_m_implies_both_mos_trace_flags() {
        let config = Config::parse(args(&["-M"]));
        assert!(config.trace_mos);
        assert!(config.trace_mos_io);
    }

    #[test]
    fn positional_arg_is_the_rom_file() {
        let config = Config::parse(args(&["-c", "BASIC.ROM"]));
        assert_eq!(config.rom_file.as_deref(), Some("BASIC.ROM"));
        assert!(config.trace_cpu);
    }

    #[test]
    fn rom_slot_flags_are_indexed() {
        let config = Config::parse(args(&["--rom3=/tmp/extra.rom"]));
        assert_eq!(config.rom_paths[3].as_deref(), Some("/tmp/extra.rom"));
    }
}
