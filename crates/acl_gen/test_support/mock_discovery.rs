//! Mock method discovery helper for integration testing
//!
//! Prints the methods of the requested model as a JSON array on one stdout
//! line, the way the real `acl-discover-methods` helper does.
//!
//! # Usage
//!
//! ```bash
//! mock_discovery --methods=find,create Car
//! ```
//!
//! # Special Flags
//!
//! - `--version` → print version and exit
//! - `--help` → print help text and exit

use std::env;
use std::io::{self, Write};
use std::process;
use std::thread;
use std::time::Duration;

const VERSION: &str = "1.0.0 (Mock discovery helper)";
const HELP_TEXT: &str = r#"mock_discovery - Mock method discovery helper for integration testing

USAGE:
    mock_discovery [OPTIONS] <MODEL>

OPTIONS:
    --methods=<A,B,..>   Methods to report (default: find,create)
    --only=<MODEL>       Report an empty list for any other model
    --delay=<MS>         Wait before replying, in milliseconds (default: 0)
    --log=<LINE>         Print a non-JSON line before the reply
    --silent             Never reply
    --exit=<CODE>        Exit with CODE without replying
    --version            Print version and exit
    --help               Print this help text and exit

EXAMPLES:
    mock_discovery --methods=find,drive Car
    mock_discovery --delay=10000 Car
"#;

struct HelperArgs {
    methods: Vec<String>,
    only: Option<String>,
    delay_ms: u64,
    log_line: Option<String>,
    silent: bool,
    exit_code: Option<i32>,
    model: Option<String>,
}

impl HelperArgs {
    fn parse() -> Result<Self, String> {
        let mut parsed = HelperArgs {
            methods: vec!["find".to_string(), "create".to_string()],
            only: None,
            delay_ms: 0,
            log_line: None,
            silent: false,
            exit_code: None,
            model: None,
        };

        for arg in env::args().skip(1) {
            if arg == "--version" {
                println!("{}", VERSION);
                process::exit(0);
            } else if arg == "--help" {
                println!("{}", HELP_TEXT);
                process::exit(0);
            } else if arg == "--silent" {
                parsed.silent = true;
            } else if let Some(list) = arg.strip_prefix("--methods=") {
                parsed.methods = list
                    .split(',')
                    .filter(|m| !m.is_empty())
                    .map(String::from)
                    .collect();
            } else if let Some(model) = arg.strip_prefix("--only=") {
                parsed.only = Some(model.to_string());
            } else if let Some(delay) = arg.strip_prefix("--delay=") {
                parsed.delay_ms = delay
                    .parse()
                    .map_err(|_| format!("Invalid delay value: {}", delay))?;
            } else if let Some(line) = arg.strip_prefix("--log=") {
                parsed.log_line = Some(line.to_string());
            } else if let Some(code) = arg.strip_prefix("--exit=") {
                parsed.exit_code = Some(
                    code.parse()
                        .map_err(|_| format!("Invalid exit code: {}", code))?,
                );
            } else if arg.starts_with("--") {
                return Err(format!("Unknown argument: {}", arg));
            } else {
                parsed.model = Some(arg);
            }
        }

        Ok(parsed)
    }
}

fn reply(methods: &[String]) -> io::Result<()> {
    let line = serde_json::to_string(methods)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", line)?;
    handle.flush()
}

fn main() {
    let args = match HelperArgs::parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            eprintln!("\nRun 'mock_discovery --help' for usage information.");
            process::exit(1);
        }
    };

    let Some(model) = args.model else {
        eprintln!("ERROR: Missing model name");
        process::exit(1);
    };

    if let Some(line) = &args.log_line {
        println!("{}", line);
    }

    if let Some(code) = args.exit_code {
        eprintln!("cannot load model {}", model);
        process::exit(code);
    }

    if args.silent {
        loop {
            thread::sleep(Duration::from_secs(60));
        }
    }

    if args.delay_ms > 0 {
        thread::sleep(Duration::from_millis(args.delay_ms));
    }

    let methods = match &args.only {
        Some(only) if *only != model => Vec::new(),
        _ => args.methods,
    };

    if let Err(err) = reply(&methods) {
        // Caller stopped listening
        if err.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("ERROR: Failed to write reply: {}", err);
            process::exit(1);
        }
    }
}
