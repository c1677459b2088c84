use std::iter::Peekable;

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum Config {
    /// 帮助 `-h`
    Help,
    /// 版本 `-V`
    Version,
    /// 输出调试日志 `-v`
    Verbose,
    /// 合并相邻的相同行并输出每组的行数 `-c`
    Count,
}

/// 日志级别环境变量，例如`RSQ_LOG=debug`。
pub(crate) const LOG_ENV: &str = "RSQ_LOG";

pub(crate) fn parse_configs(args: &mut Peekable<impl Iterator<Item = String>>) -> Vec<Config> {
    let mut configs = Vec::new();
    while let Some(config) = args.peek().and_then(|arg| parse_config(arg)) {
        args.next();
        configs.push(config);
    }
    configs
}

fn parse_config(arg: &str) -> Option<Config> {
    match arg {
        "-h" => Some(Config::Help),
        "-V" => Some(Config::Version),
        "-v" => Some(Config::Verbose),
        "-c" => Some(Config::Count),
        _ => None, // 遇到非选项参数，停止解析（由调用者处理）
    }
}

#[cfg(test)]
pub(crate) fn build_args(args: &str) -> Peekable<impl Iterator<Item = String>> {
    args.split_whitespace().map(String::from).collect::<Vec<_>>().into_iter().peekable()
}
