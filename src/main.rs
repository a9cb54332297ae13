use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use lox_walk::{lox::read_source, printer, Lox, Outcome};
use ron::ser::PrettyConfig;
use tracing_subscriber::{filter::LevelFilter, fmt::Layer, prelude::*, EnvFilter};

const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;
const EX_IOERR: u8 = 74;

/// Run a script, or start an interactive prompt when no script is given.
#[derive(Debug, clap::Parser)]
#[command(name = "lox", version)]
struct Args {
    /// The script to run.
    script: Option<PathBuf>,

    /// Print the parsed program as RON instead of running it.
    #[arg(long, requires = "script", conflicts_with = "print_ast")]
    dump_ast: bool,

    /// Print the parsed program in parenthesized form instead of running it.
    #[arg(long, requires = "script")]
    print_ast: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EX_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = install_tracing() {
        eprintln!("could not install logging: {e}");
    }

    match execute(&args) {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::StaticError) => ExitCode::from(EX_DATAERR),
        Ok(Outcome::RuntimeError) => ExitCode::from(EX_SOFTWARE),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(EX_IOERR)
        }
    }
}

fn install_tracing() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(
        tracing_subscriber::registry().with(
            Layer::new().with_writer(io::stderr).with_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::WARN.into())
                    .from_env_lossy(),
            ),
        ),
    )
}

fn execute(args: &Args) -> io::Result<Outcome> {
    let mut lox = Lox::new(Box::new(io::stdout()), Box::new(io::stderr()));

    let Some(script) = &args.script else {
        lox.run_prompt(io::stdin().lock(), &mut io::stdout())?;
        return Ok(Outcome::Success);
    };

    if !(args.dump_ast || args.print_ast) {
        return lox.run_file(script);
    }

    let source = read_source(script)?;
    let Some(statements) = lox.check(&source)? else {
        return Ok(Outcome::StaticError);
    };

    let rendered = if args.dump_ast {
        ron::ser::to_string_pretty(&statements, PrettyConfig::new())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    } else {
        printer::print_program(&statements)
    };
    writeln!(io::stdout(), "{rendered}")?;
    Ok(Outcome::Success)
}
