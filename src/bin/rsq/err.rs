use rseq::SeqErr;
use std::process::{ExitCode, Termination};
use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq)]
pub(crate) enum CliErr {
    #[error("[Bad Arg] Unknown arguments: {args:?}")]
    UnknownArgs { args: Vec<String> },

    #[error("[Input] Open input file `{file}` error: {err}")]
    OpenInputFileErr { file: String, err: String },

    #[error("[Output] Write item `{item}` to stdout error: {err}")]
    WriteErr { item: String, err: String },

    #[error("[Pipe] {0}")]
    Seq(#[from] SeqErr),
}

impl Termination for CliErr {
    fn report(self) -> ExitCode {
        eprintln!("{}", self);
        ExitCode::from(self.exit_code())
    }
}

impl CliErr {
    pub(crate) fn termination(self) -> ! {
        let exit_code = self.exit_code();
        self.report();
        std::process::exit(exit_code as i32);
    }

    fn exit_code(&self) -> u8 {
        match self {
            CliErr::UnknownArgs { .. } => 1,
            CliErr::OpenInputFileErr { .. } => 2,
            CliErr::WriteErr { .. } => 3,
            CliErr::Seq(_) => 4,
        }
    }
}
