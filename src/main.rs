use clap::Parser as ClapParser;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tickscript::cli::{self, CliError, FormatOptions, FormatResult};

#[derive(ClapParser)]
#[command(name = "tickfmt")]
#[command(about = "Format TICKscript files. If no source files are provided reads from STDIN.")]
#[command(version)]
struct Cli {
    /// Files to format
    paths: Vec<PathBuf>,

    /// Write formatted contents to source file instead of STDOUT
    #[arg(short = 'w')]
    write: bool,

    /// Create backup files with extension '.orig'
    #[arg(short = 'b', requires = "write")]
    backup: bool,

    /// Print the syntax tree as JSON instead of formatted script
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if cli.paths.is_empty() {
        if cli.write {
            return Err(CliError::NoFiles);
        }
        return run_stdin(cli.json);
    }

    let options = FormatOptions {
        paths: cli.paths,
        write: cli.write,
        backup: cli.backup,
        json: cli.json,
    };

    let mut stdout = io::stdout().lock();
    cli::execute_format(&options, |result| {
        if let FormatResult::Output(text) = result {
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        Ok(())
    })
}

fn run_stdin(json: bool) -> Result<(), CliError> {
    if atty::is(atty::Stream::Stdin) {
        eprintln!("Reading TICKscript from STDIN (end with Ctrl-D)");
    }
    let mut source = String::new();
    io::stdin().read_to_string(&mut source)?;
    let formatted = cli::format_source(&source, json).map_err(|e| e.in_file("<stdin>"))?;
    io::stdout().write_all(formatted.as_bytes())?;
    Ok(())
}
