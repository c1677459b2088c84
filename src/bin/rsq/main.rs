use crate::config::{Config, LOG_ENV};
use crate::err::CliErr;
use crate::input::Input;
use log::LevelFilter;
use rseq::CloseableSequence;
use std::io;
use std::io::BufWriter;
use tracing::debug;

mod config;
mod err;
mod input;
mod output;

/// 流水线：从输入逐行读取的可关闭序列。
pub(crate) type Pipe = Box<dyn CloseableSequence<Item = String>>;

const HELP: &str = "\
Usage: rsq [<options>] [<file>|-]

Copy lines from <file> (default: stdin) to stdout.

Options:
    -h                  Print help.
    -V                  Print version.
    -v                  Enable debug logs.
    -c                  Merge adjacent equal lines of sorted input,
                        print `<count>\\t<line>` per group.

Environment:
    RSQ_LOG             Log filter, e.g. `RSQ_LOG=debug`.";

fn main() {
    if let Err(e) = run() {
        e.termination();
    }
}

fn run() -> Result<(), CliErr> {
    let mut args = std::env::args().skip(1).peekable();
    let configs = config::parse_configs(&mut args);
    init_logger(configs.contains(&Config::Verbose));
    if configs.contains(&Config::Help) {
        println!("{HELP}");
        return Ok(());
    }
    if configs.contains(&Config::Version) {
        println!("rsq {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let input = Input::parse(args)?;
    debug!(?input, ?configs, "start");
    let pipe = input.pipe()?;
    let stdout = BufWriter::new(io::stdout().lock());
    if configs.contains(&Config::Count) { output::write_counts(pipe, stdout) } else { output::write_lines(pipe, stdout) }
}

/// 初始化日志，日志输出到标准错误。
fn init_logger(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV, "warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}
