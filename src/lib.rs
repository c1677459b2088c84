//! 可组合、可关闭的序列。
//!
//! * [`Sequence`]：`has_next`/`next`拉取模型的单次遍历序列；
//! * [`TransformSeq`]/[`FilterSeq`]：带单槽预读的惰性转换与过滤；
//! * [`GroupSeq`]：把已排序序列中相邻且相等的元素合并为一组；
//! * [`CloseableSequence`]：持有资源的序列，`close`幂等且只释放一次；
//! * [`CloseableAdapter`]/[`ResourceSeq`]/[`Empty`]：可关闭序列的具体实现。
//!
//! 所有类型均不做同步，只能在单线程内顺序使用。

pub mod close;
pub mod empty;
pub mod err;
pub mod filter;
pub mod group;
pub mod mapping;
pub mod seq;
pub mod transform;

pub use close::{CloseState, CloseableAdapter, CloseableSequence, ResourceSeq, collect_closing, use_closing};
pub use empty::{Empty, empty};
pub use err::{ErrKind, SeqErr};
pub use filter::{AcceptAll, Filter, RejectAll};
pub use group::GroupSeq;
pub use mapping::{Identity, Mapping};
pub use seq::{IterSource, Limit, SeqIter, Sequence, SequenceExt, VecSource, from_iter};
pub use transform::{FilterSeq, TransformSeq};
