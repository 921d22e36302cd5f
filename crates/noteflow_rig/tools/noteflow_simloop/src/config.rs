use std::env;

pub const DEFAULT_TICK_MS: u64 = 20;
pub const DEFAULT_NOTES: u32 = 3;

pub struct Config {
    pub tick_ms: u64,
    pub notes: u32,
    pub continuous_burst: bool,
}

impl Config {
    pub fn from_args() -> Self {
        Self::from_args_iter(env::args())
    }

    pub fn from_args_iter<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tick_ms = env::var("NOTEFLOW_TICK_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TICK_MS);
        let mut notes = env::var("NOTEFLOW_NOTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_NOTES);
        let mut continuous_burst = env::var("NOTEFLOW_CONTINUOUS")
            .ok()
            .and_then(parse_bool)
            .unwrap_or(true);

        let mut args = iter.into_iter();
        let _ = args.next();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                "--tick-ms" => {
                    if let Some(value) = args.next() {
                        if let Ok(value) = value.as_ref().parse() {
                            tick_ms = value;
                        }
                    }
                }
                "--notes" => {
                    if let Some(value) = args.next() {
                        if let Ok(value) = value.as_ref().parse() {
                            notes = value;
                        }
                    }
                }
                "--no-continuous" => {
                    continuous_burst = false;
                }
                _ if arg.starts_with("--tick-ms=") => {
                    if let Ok(value) = arg["--tick-ms=".len()..].parse() {
                        tick_ms = value;
                    }
                }
                _ if arg.starts_with("--notes=") => {
                    if let Ok(value) = arg["--notes=".len()..].parse() {
                        notes = value;
                    }
                }
                _ => {}
            }
        }

        if tick_ms == 0 {
            tick_ms = DEFAULT_TICK_MS;
        }

        Self {
            tick_ms,
            notes,
            continuous_burst,
        }
    }
}

fn print_usage() {
    println!("noteflow_simloop [--tick-ms <ms>] [--notes <count>] [--no-continuous]");
}

fn parse_bool(value: String) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
