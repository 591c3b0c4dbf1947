use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use slot_cli::{run, CommandKind, CommonOptions};

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        print_usage();
        return Ok(());
    }

    let mut options = CommonOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--root" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --root".to_string())?;
                options.root = Some(PathBuf::from(value));
                index += 2;
            }
            "--save" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --save".to_string())?;
                options.save = Some(PathBuf::from(value));
                index += 2;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    if index + 1 < args.len() {
        return Err(format!("{command} takes no arguments"));
    }

    let kind = match command {
        "status" => CommandKind::Status,
        "show" => CommandKind::Show,
        "erase" => CommandKind::Erase,
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    run(kind, options, &mut io::stdout())
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "slot_cli - inspect the emberwake save slot",
        "",
        "Usage:",
        "  slot_cli [--root <dir>] [--save <file>] status",
        "  slot_cli [--root <dir>] [--save <file>] show",
        "  slot_cli [--root <dir>] [--save <file>] erase",
        "",
        "Without --root or --save the project root is found the same way the game finds it",
        "(EMBERWAKE_ROOT, then walking up from the executable).",
    ]
    .join("\n")
}
