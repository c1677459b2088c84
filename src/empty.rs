use crate::close::CloseableSequence;
use crate::err::SeqErr;
use crate::seq::Sequence;
use std::fmt;
use std::marker::PhantomData;

/// 空的可关闭序列，不含任何元素，关闭无操作。
///
/// 零大小，可以为任意元素类型构造，见[`empty`]。
pub struct Empty<T>(PhantomData<fn() -> T>);

/// 返回指定元素类型的空序列。
pub const fn empty<T>() -> Empty<T> {
    Empty(PhantomData)
}

impl<T> Clone for Empty<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Empty<T> {}

impl<T> Default for Empty<T> {
    fn default() -> Self {
        empty()
    }
}

impl<T> fmt::Debug for Empty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Empty")
    }
}

impl<T> Sequence for Empty<T> {
    type Item = T;

    fn has_next(&mut self) -> bool {
        false
    }

    fn next(&mut self) -> Result<T, SeqErr> {
        Err(SeqErr::Exhausted)
    }

    fn remove_current(&mut self) -> Result<(), SeqErr> {
        Err(SeqErr::remove_without_next())
    }
}

impl<T> CloseableSequence for Empty<T> {
    fn close(&mut self) -> Result<(), SeqErr> {
        Ok(())
    }
}
