#![forbid(unsafe_code)]
use std::path::PathBuf;
use std::{env, ffi, fs, io, process};

use zlzw::{encode::Encoder, Framing};

fn main() -> CodingResult {
    CodingResult::catch_panic(|| {
        let flags = Flags::from_args(env::args_os()).unwrap_or_else(|ParamError| explain());
        init_logging(&flags);
        run_coding(flags)
    })
}

fn init_logging(flags: &Flags) {
    let default = if flags.stats { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn run_coding(flags: Flags) -> Result<(), io::Error> {
    let out = io::stdout();
    let out = io::BufWriter::new(out.lock());
    let mut encoder = Encoder::with_framing(flags.framing);

    let result = match flags.input {
        Input::File(file) => {
            let data = fs::File::open(file)?;
            let file = io::BufReader::with_capacity(1 << 20, data);
            encoder.into_stream(out).encode_all(file)
        }
        Input::Stdin => {
            let stdin = io::stdin();
            let input = io::BufReader::with_capacity(1 << 20, stdin.lock());
            encoder.into_stream(out).encode_all(input)
        }
    };

    if flags.stats {
        log::info!(
            "read {} bytes, wrote {} bytes, {} dictionary entries learned",
            result.bytes_read,
            result.bytes_written,
            encoder.dictionary().len(),
        );
    }

    result.status
}

struct Flags {
    input: Input,
    framing: Framing,
    stats: bool,
}

struct ParamError;

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

fn explain<T>() -> T {
    println!(
        "Usage: zlzw [-l] [-s] <file>\n\
        Arguments:\n\
        -l\t pack the first code with 8 bits (legacy framing)\n\
        -s\t log a summary to stderr\n\
        <file>\tfilepath or '-' for stdin"
    );
    process::exit(1);
}

impl Default for Flags {
    fn default() -> Flags {
        Flags {
            input: Input::Stdin,
            framing: Framing::Uniform,
            stats: false,
        }
    }
}

fn command() -> clap::Command<'static> {
    clap::Command::new("zlzw")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress a stream into the .Z container with 9-bit LZW codes")
        .arg(
            clap::Arg::new("legacy")
                .short('l')
                .long("legacy")
                .action(clap::ArgAction::SetTrue)
                .help("Pack the first code with 8 bits"),
        )
        .arg(
            clap::Arg::new("stats")
                .short('s')
                .long("stats")
                .action(clap::ArgAction::SetTrue)
                .help("Log sizes and dictionary usage when done"),
        )
        .arg(
            clap::Arg::new("file")
                .default_value("-")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
}

impl Flags {
    fn from_args(mut args: impl Iterator<Item = ffi::OsString>) -> Result<Self, ParamError> {
        let mut flags = Flags::default();
        let matches = command()
            .try_get_matches_from(args.by_ref())
            .map_err(|err| match err.kind() {
                clap::ErrorKind::DisplayHelp | clap::ErrorKind::DisplayVersion => err.exit(),
                _ => ParamError,
            })?;

        if matches.get_flag("legacy") {
            flags.framing = Framing::Legacy;
        }

        flags.stats = matches.get_flag("stats");

        match matches.get_one::<PathBuf>("file") {
            None => flags.input = Input::Stdin,
            Some(p) if *p == PathBuf::from("-") => flags.input = Input::Stdin,
            Some(p) => flags.input = Input::File(p.clone()),
        }

        Ok(flags)
    }
}

enum CodingResult {
    Ok,
    Err(io::Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: fn() -> Result<(), io::Error>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                eprintln!("If you know what this means, please report it.");
                std::process::ExitCode::from(128)
            }
        }
    }
}
