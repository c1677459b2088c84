use crate::close::CloseableSequence;
use crate::err::SeqErr;
use crate::filter::{AcceptAll, Filter};
use crate::group::GroupSeq;
use crate::mapping::Mapping;
use std::cmp::Ordering;
use crate::transform::{FilterSeq, TransformSeq};
use std::iter::Fuse;

/// 单向、单次遍历的序列。
///
/// 与[`Iterator`]不同，是否还有元素（`has_next`）与取出元素（`next`）是两个独立操作，
/// 因此`has_next`需要`&mut self`以便实现预读。
///
/// 约定：一旦`has_next`返回`false`，后续调用也必须返回`false`。
/// 序列不做任何同步，不能被多个调用方同时消费。
pub trait Sequence {
    type Item;

    /// 是否还有可以取出的元素，可重复调用，不会改变下一次`next`的结果。
    fn has_next(&mut self) -> bool;

    /// 取出下一个元素，已耗尽时返回[`SeqErr::Exhausted`]。
    fn next(&mut self) -> Result<Self::Item, SeqErr>;

    /// 从底层数据源中删除最近一次`next`返回的元素。
    ///
    /// 默认不支持。
    fn remove_current(&mut self) -> Result<(), SeqErr> {
        Err(SeqErr::unsupported_remove())
    }
}

impl<S: Sequence + ?Sized> Sequence for &mut S {
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<Self::Item, SeqErr> {
        (**self).next()
    }

    fn remove_current(&mut self) -> Result<(), SeqErr> {
        (**self).remove_current()
    }
}

impl<S: Sequence + ?Sized> Sequence for Box<S> {
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<Self::Item, SeqErr> {
        (**self).next()
    }

    fn remove_current(&mut self) -> Result<(), SeqErr> {
        (**self).remove_current()
    }
}

/// 将任意[`Iterator`]包装为[`Sequence`]，不支持删除。
#[derive(Debug, Clone)]
pub struct IterSource<I: Iterator> {
    iter: Fuse<I>,
    peeked: Option<I::Item>,
}

impl<I: Iterator> IterSource<I> {
    pub fn new(iter: I) -> Self {
        IterSource { iter: iter.fuse(), peeked: None }
    }
}

/// 从任意可迭代值构造序列。
pub fn from_iter<T: IntoIterator>(iter: T) -> IterSource<T::IntoIter> {
    IterSource::new(iter.into_iter())
}

impl<I: Iterator> Sequence for IterSource<I> {
    type Item = I::Item;

    fn has_next(&mut self) -> bool {
        if self.peeked.is_none() {
            self.peeked = self.iter.next();
        }
        self.peeked.is_some()
    }

    fn next(&mut self) -> Result<Self::Item, SeqErr> {
        self.peeked.take().or_else(|| self.iter.next()).ok_or(SeqErr::Exhausted)
    }
}

/// 基于`Vec`的序列，返回元素的克隆，支持删除最近返回的元素。
#[derive(Debug)]
pub struct VecSource<'a, T: Clone> {
    values: &'a mut Vec<T>,
    cursor: usize,
    last: Option<usize>,
}

impl<'a, T: Clone> VecSource<'a, T> {
    pub fn new(values: &'a mut Vec<T>) -> Self {
        VecSource { values, cursor: 0, last: None }
    }
}

impl<T: Clone> Sequence for VecSource<'_, T> {
    type Item = T;

    fn has_next(&mut self) -> bool {
        self.cursor < self.values.len()
    }

    fn next(&mut self) -> Result<Self::Item, SeqErr> {
        match self.values.get(self.cursor) {
            Some(value) => {
                let value = value.clone();
                self.last = Some(self.cursor);
                self.cursor += 1;
                Ok(value)
            }
            None => Err(SeqErr::Exhausted),
        }
    }

    fn remove_current(&mut self) -> Result<(), SeqErr> {
        match self.last.take() {
            Some(index) => {
                self.values.remove(index);
                self.cursor -= 1;
                Ok(())
            }
            None => Err(SeqErr::remove_without_next()),
        }
    }
}

/// 将[`Sequence`]桥接为标准[`Iterator`]。
///
/// 底层`next`失败时产出`Err`，调用方可以用`collect::<Result<Vec<_>, _>>()`收集。
#[derive(Debug)]
pub struct SeqIter<S> {
    seq: S,
}

impl<S: Sequence> Iterator for SeqIter<S> {
    type Item = Result<S::Item, SeqErr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.seq.has_next() { Some(self.seq.next()) } else { None }
    }
}

/// 最多产出`remaining`个元素的序列，达到上限后不再从底层序列拉取。
#[derive(Debug)]
pub struct Limit<S> {
    source: S,
    remaining: usize,
}

impl<S: Sequence> Sequence for Limit<S> {
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        self.remaining > 0 && self.source.has_next()
    }

    fn next(&mut self) -> Result<Self::Item, SeqErr> {
        if self.remaining == 0 {
            return Err(SeqErr::Exhausted);
        }
        let item = self.source.next()?;
        self.remaining -= 1;
        Ok(item)
    }

    fn remove_current(&mut self) -> Result<(), SeqErr> {
        self.source.remove_current()
    }
}

impl<S: CloseableSequence> CloseableSequence for Limit<S> {
    fn close(&mut self) -> Result<(), SeqErr> {
        self.remaining = 0;
        self.source.close()
    }
}

/// 序列组合与消费的扩展方法，对所有[`Sequence`]可用。
pub trait SequenceExt: Sequence + Sized {
    /// 只保留满足过滤器的元素。
    fn filtered<F>(self, filter: F) -> FilterSeq<Self, F>
    where
        F: Filter<Self::Item>,
    {
        FilterSeq::new(self, filter)
    }

    /// 对每个元素做转换。
    fn transformed<M>(self, mapping: M) -> TransformSeq<Self, M, AcceptAll>
    where
        M: Mapping<Self::Item>,
    {
        TransformSeq::new(self, mapping, AcceptAll)
    }

    /// 先转换，再用过滤器检查转换后的值。
    fn transformed_filtered<M, F>(self, mapping: M, filter: F) -> TransformSeq<Self, M, F>
    where
        M: Mapping<Self::Item>,
        F: Filter<M::Output>,
    {
        TransformSeq::new(self, mapping, filter)
    }

    /// 最多取`count`个元素。
    fn limit(self, count: usize) -> Limit<Self> {
        Limit { source: self, remaining: count }
    }

    /// 把已按`grouping`排序的元素中相邻且相等的元素合并为一组。
    fn group_sorted<C>(self, grouping: C) -> GroupSeq<Self, C>
    where
        C: FnMut(&Self::Item, &Self::Item) -> Ordering,
    {
        GroupSeq::new(self, grouping)
    }

    fn iter(&mut self) -> SeqIter<&mut Self> {
        SeqIter { seq: self }
    }

    fn into_seq_iter(self) -> SeqIter<Self> {
        SeqIter { seq: self }
    }

    /// 返回第一个满足过滤器的元素，之前的元素均被消费。
    fn find_first<F>(&mut self, filter: F) -> Result<Option<Self::Item>, SeqErr>
    where
        F: Filter<Self::Item>,
    {
        while self.has_next() {
            let item = self.next()?;
            if filter.accept(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// 消费全部元素，统计满足过滤器的个数。
    fn count_matching<F>(&mut self, filter: F) -> Result<usize, SeqErr>
    where
        F: Filter<Self::Item>,
    {
        let mut count = 0;
        while self.has_next() {
            if filter.accept(&self.next()?) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// 是否所有元素都满足过滤器，遇到第一个不满足的元素即停止。
    fn match_all<F>(&mut self, filter: F) -> Result<bool, SeqErr>
    where
        F: Filter<Self::Item>,
    {
        while self.has_next() {
            if !filter.accept(&self.next()?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// 是否存在满足过滤器的元素，遇到第一个满足的元素即停止。
    fn has_match<F>(&mut self, filter: F) -> Result<bool, SeqErr>
    where
        F: Filter<Self::Item>,
    {
        Ok(self.find_first(filter)?.is_some())
    }

    /// 消费全部元素，把满足过滤器的元素追加到`destination`并返回。
    fn filter_into<F, C>(&mut self, filter: F, mut destination: C) -> Result<C, SeqErr>
    where
        F: Filter<Self::Item>,
        C: Extend<Self::Item>,
    {
        while self.has_next() {
            let item = self.next()?;
            if filter.accept(&item) {
                destination.extend(Some(item));
            }
        }
        Ok(destination)
    }

    /// 消费全部元素，通过`remove_current`从底层集合中删除不满足过滤器的元素，返回删除的个数。
    ///
    /// 底层序列不支持删除时，在第一个被拒绝的元素处返回错误，之前的删除已经生效。
    fn retain_matching<F>(&mut self, filter: F) -> Result<usize, SeqErr>
    where
        F: Filter<Self::Item>,
    {
        let mut removed = 0;
        while self.has_next() {
            if !filter.accept(&self.next()?) {
                self.remove_current()?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn collect_vec(&mut self) -> Result<Vec<Self::Item>, SeqErr> {
        self.iter().collect()
    }
}

impl<S: Sequence> SequenceExt for S {}
