use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::{debug, info};

use uiscript::config as cfg;
use uiscript::executor::{COMMANDS, RunOutcome, Runtime};
use uiscript::{backend, script};

/// uiscript CLI
#[derive(Debug, Parser)]
#[command(
    name = uiscript::PKG_NAME,
    version = uiscript::PKG_VERSION,
    about = "Run a line-oriented UI automation script",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// Path to the script file
    #[arg(short = 's', value_name = "SCRIPT_FILE")]
    script: PathBuf,
}

fn main() -> anyhow::Result<ExitCode> {
    let argv: Vec<String> = std::env::args().collect();
    // Exactly `-s <script>`; anything else gets the usage text.
    if argv.len() != 3 || argv[1] != "-s" {
        print_usage();
        return Ok(ExitCode::FAILURE);
    }
    let Ok(args) = Args::try_parse_from(&argv) else {
        print_usage();
        return Ok(ExitCode::FAILURE);
    };

    let settings = cfg::load_from_env()?;
    uiscript::init_tracing(settings.log_level.as_deref());
    info!(
        version = uiscript::PKG_VERSION,
        script = %args.script.display(),
        dry_run = settings.dry_run,
        "Starting uiscript"
    );

    let parsed = match script::parse_file(&args.script) {
        Ok(parsed) => parsed,
        Err(err) => {
            println!("Error parsing script file: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };
    println!("Executing script with {} commands...", parsed.len());

    let backend = backend::native(&settings)?;
    let mut runtime = Runtime::new(backend, &settings);

    match runtime.run(&parsed) {
        RunOutcome::Completed { executed } => {
            debug!(executed, "Script finished");
            println!("Script completed: {executed} commands executed.");
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Halted {
            command, error, ..
        } => {
            println!(
                "Error executing command '{}' (line {}): {}",
                command.name(),
                command.line(),
                runtime
                    .context()
                    .last_error()
                    .map_or_else(|| error.to_string(), str::to_string)
            );
            for (i, param) in command.params().iter().enumerate() {
                println!("  Parameter {i}: '{param}'");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_usage() {
    let help = Args::command().render_help();
    println!("{help}");
    println!("{}", command_reference());
}

/// Usage section listing every script command, built from the dispatch table.
fn command_reference() -> String {
    let mut out = String::from("Available script commands:\n");
    for def in COMMANDS {
        let usage = format!("{} {}", def.name, def.synopsis);
        let _ = writeln!(out, "  {:<48} ({} params)", usage.trim_end(), def.arity);
    }
    out.push_str(
        "\nConditions (IF ... ENDIF only records _IF_CONDITION; every command still runs):\n  \
         IF ElementExists \"id\"\n  \
         IF ElementNotExists \"id\"\n  \
         IF ContainsElementText \"id\" \"class\" \"50011\" \"$mytext\"\n\
         \nVariables:\n  \
         SET mytext \"Hello World\"\n  \
         SendKeystroke \"$mytext\"\n\
         \nExample script:\n  \
         AttachProcess \"notepad.exe\"\n  \
         Sleep 1000\n  \
         SendKeystroke \"Hello World\"\n",
    );
    out
}
