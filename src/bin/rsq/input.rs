use crate::Pipe;
use crate::err::CliErr;
use rseq::{ResourceSeq, SeqErr};
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader};
use tracing::debug;

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum Input {
    /// 从标准输入读取输入，未指定文件或文件为`-`时的默认输入。
    StdIn,
    /// 从文件逐行读取输入，文件在流水线结束（包括出错）时关闭。
    File { file: String },
}

impl Input {
    /// 解析选项之后剩余的参数，最多一个文件名。
    pub(crate) fn parse(args: impl Iterator<Item = String>) -> Result<Input, CliErr> {
        let mut args = args.collect::<Vec<_>>();
        match args.len() {
            0 => Ok(Input::StdIn),
            1 => match args.remove(0) {
                file if file == "-" => Ok(Input::StdIn),
                file => Ok(Input::File { file }),
            },
            _ => Err(CliErr::UnknownArgs { args: args.split_off(1) }),
        }
    }

    pub(crate) fn pipe(self) -> Result<Pipe, CliErr> {
        match self {
            Input::StdIn => {
                let lines = io::stdin().lock().lines();
                Ok(Box::new(ResourceSeq::new(lines, |lines: &mut io::Lines<io::StdinLock<'static>>| {
                    lines.next().map(|line| line.map_err(|err| SeqErr::Source(err.to_string())))
                })))
            }
            Input::File { file } => {
                let fin = File::open(&file)
                    .map_err(|err| CliErr::OpenInputFileErr { file: file.clone(), err: err.to_string() })?;
                debug!(file = %file, "input file opened");
                let lines = BufReader::new(fin).lines();
                let mut line_no = 0usize;
                Ok(Box::new(ResourceSeq::new(lines, move |lines: &mut io::Lines<BufReader<File>>| {
                    line_no += 1;
                    lines.next().map(|line| {
                        line.map_err(|err| SeqErr::Source(format!("read line `{line_no}` of `{file}` error: {err}")))
                    })
                })))
            }
        }
    }
}
