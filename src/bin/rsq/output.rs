use crate::Pipe;
use crate::err::CliErr;
use rseq::{Sequence, SequenceExt, use_closing};
use std::io;
use std::io::Write;
use tracing::debug;

/// 逐行输出流水线，无论成功与否流水线都会被关闭。
pub(crate) fn write_lines(pipe: Pipe, mut writer: impl Write) -> Result<(), CliErr> {
    use_closing(pipe, |pipe| {
        let mut count = 0usize;
        while pipe.has_next() {
            let item = pipe.next()?;
            writeln!(writer, "{item}").map_err(|err| on_err(&item, err))?;
            count += 1;
        }
        debug!(count, "lines written");
        writer.flush().map_err(|err| on_err("", err))
    })
}

/// 合并已排序输入中相邻的相同行，输出`<行数>\t<行>`，无论成功与否流水线都会被关闭。
pub(crate) fn write_counts(pipe: Pipe, mut writer: impl Write) -> Result<(), CliErr> {
    use_closing(pipe.group_sorted(String::cmp), |groups| {
        while groups.has_next() {
            let group = groups.next()?;
            if let Some(line) = group.first() {
                writeln!(writer, "{}\t{line}", group.len()).map_err(|err| on_err(line, err))?;
            }
        }
        writer.flush().map_err(|err| on_err("", err))
    })
}

fn on_err(item: &str, err: io::Error) -> CliErr {
    CliErr::WriteErr { item: item.to_string(), err: err.to_string() }
}
