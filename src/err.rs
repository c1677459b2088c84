use thiserror::Error;

/// 序列操作错误。
///
/// 均为同步返回给直接调用者，框架内部不做重试。
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum SeqErr {
    /// 在已耗尽的序列上调用`next()`，调用方应先检查`has_next()`。
    #[error("[Exhausted] No more elements")]
    Exhausted,

    /// 底层序列不支持所请求的能力（例如删除）。
    #[error("[Unsupported] Operation `{op}` is not supported by the underlying sequence")]
    Unsupported { op: &'static str },

    /// 当前状态不允许该操作（例如尚未成功读取就删除）。
    #[error("[Invalid State] Operation `{op}` is not allowed: {reason}")]
    InvalidState { op: &'static str, reason: &'static str },

    /// 释放资源失败。
    #[error("[Release] Release resource error: {0}")]
    Release(String),

    /// 底层数据源读取失败。
    #[error("[Source] Read from source error: {0}")]
    Source(String),
}

/// 错误类别，便于调用方按类别分支而不关心具体信息。
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrKind {
    Exhausted,
    Unsupported,
    InvalidState,
    Release,
    Source,
}

impl SeqErr {
    pub(crate) const fn unsupported_remove() -> SeqErr {
        SeqErr::Unsupported { op: "remove_current" }
    }

    pub(crate) const fn remove_without_next() -> SeqErr {
        SeqErr::InvalidState { op: "remove_current", reason: "no element has been returned since the last removal" }
    }

    pub(crate) const fn unsorted_group() -> SeqErr {
        SeqErr::InvalidState { op: "group_sorted", reason: "input is not sorted according to the grouping" }
    }

    pub fn kind(&self) -> ErrKind {
        match self {
            SeqErr::Exhausted => ErrKind::Exhausted,
            SeqErr::Unsupported { .. } => ErrKind::Unsupported,
            SeqErr::InvalidState { .. } => ErrKind::InvalidState,
            SeqErr::Release(_) => ErrKind::Release,
            SeqErr::Source(_) => ErrKind::Source,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.kind() == ErrKind::Exhausted
    }
}
