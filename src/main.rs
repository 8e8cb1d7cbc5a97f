use std::path::PathBuf;

use hn_hiring::app::RunOptions;

const USAGE: &str = "hn-hiring - Browse the Hacker News hiring threads from the terminal.

Usage: hn-hiring [OPTIONS]

  --user <name>        Browse this user's submissions (default: whoishiring)
  --config <path>      Read configuration from this file
  --version, -V        Show version and exit
  --help,    -h        Show this help message";

enum Command {
    Run(RunOptions),
    Exit,
}

fn main() {
    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Exit) => return,
        Err(message) => {
            eprintln!("error: {message}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(err) = hn_hiring::run(opts) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    let mut opts = RunOptions::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("hn-hiring {}", hn_hiring::VERSION);
                return Ok(Command::Exit);
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(Command::Exit);
            }
            "--user" => {
                let user = args.next().ok_or("--user needs a value")?;
                opts.user = Some(user);
            }
            "--config" => {
                let path = args.next().ok_or("--config needs a value")?;
                opts.config_file = Some(PathBuf::from(path));
            }
            other => {
                if let Some(user) = other.strip_prefix("--user=") {
                    opts.user = Some(user.to_string());
                } else if let Some(path) = other.strip_prefix("--config=") {
                    opts.config_file = Some(PathBuf::from(path));
                } else {
                    return Err(format!("unknown argument {other:?}"));
                }
            }
        }
    }
    Ok(Command::Run(opts))
}
