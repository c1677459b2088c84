use crate::close::CloseableSequence;
use crate::err::SeqErr;
use crate::filter::Filter;
use crate::mapping::{Identity, Mapping};
use crate::seq::Sequence;
use std::mem;
use tracing::trace;

/// 预读槽位。
#[derive(Debug)]
enum Lookahead<D> {
    /// 没有待取出的值。
    Vacant,
    /// 已通过过滤器、等待取出的值。
    Pending(D),
    /// 预读时底层序列失败，错误在下一次`next`时交给调用方。
    Failed(SeqErr),
}

/// 转换序列：对底层序列的每个元素做转换，只保留转换后通过过滤器的值。
///
/// 内部持有一个预读槽位：`has_next`会从底层序列拉取、转换并测试元素，
/// 直到找到第一个通过的值并暂存，或底层序列耗尽。
/// 被拒绝的元素直接丢弃，过滤器对每个值只执行一次。
pub struct TransformSeq<S, M, F>
where
    S: Sequence,
    M: Mapping<S::Item>,
{
    source: S,
    mapping: M,
    filter: F,
    lookahead: Lookahead<M::Output>,
    // 底层序列的当前元素是否仍是最近一次返回的值对应的元素
    removable: bool,
}

impl<S, M, F> TransformSeq<S, M, F>
where
    S: Sequence,
    M: Mapping<S::Item>,
    F: Filter<M::Output>,
{
    pub fn new(source: S, mapping: M, filter: F) -> Self {
        TransformSeq { source, mapping, filter, lookahead: Lookahead::Vacant, removable: false }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 取回底层序列，暂存的预读值被丢弃。
    pub fn into_source(self) -> S {
        self.source
    }

    /// 确保预读槽位非空，返回是否有值（或错误）可取。
    fn fill(&mut self) -> bool {
        if !matches!(self.lookahead, Lookahead::Vacant) {
            return true;
        }
        while self.source.has_next() {
            self.removable = false;
            match self.source.next() {
                Ok(item) => {
                    let value = self.mapping.map(item);
                    if self.filter.accept(&value) {
                        self.lookahead = Lookahead::Pending(value);
                        return true;
                    }
                    trace!("element rejected during lookahead");
                }
                Err(err) => {
                    self.lookahead = Lookahead::Failed(err);
                    return true;
                }
            }
        }
        false
    }
}

impl<S, M, F> Sequence for TransformSeq<S, M, F>
where
    S: Sequence,
    M: Mapping<S::Item>,
    F: Filter<M::Output>,
{
    type Item = M::Output;

    fn has_next(&mut self) -> bool {
        self.fill()
    }

    fn next(&mut self) -> Result<Self::Item, SeqErr> {
        if !self.fill() {
            return Err(SeqErr::Exhausted);
        }
        match mem::replace(&mut self.lookahead, Lookahead::Vacant) {
            Lookahead::Pending(value) => {
                self.removable = true;
                Ok(value)
            }
            Lookahead::Failed(err) => Err(err),
            Lookahead::Vacant => Err(SeqErr::Exhausted),
        }
    }

    /// 只有在最近一次`next`之后没有再预读时才能删除，
    /// 否则底层序列已经越过了返回值对应的元素。
    fn remove_current(&mut self) -> Result<(), SeqErr> {
        if !self.removable {
            return Err(if matches!(self.lookahead, Lookahead::Vacant) {
                SeqErr::remove_without_next()
            } else {
                let reason = "lookahead has advanced past the returned element";
                SeqErr::InvalidState { op: "remove_current", reason }
            });
        }
        self.removable = false;
        self.source.remove_current()
    }
}

impl<S, M, F> CloseableSequence for TransformSeq<S, M, F>
where
    S: CloseableSequence,
    M: Mapping<S::Item>,
    F: Filter<M::Output>,
{
    fn close(&mut self) -> Result<(), SeqErr> {
        self.lookahead = Lookahead::Vacant;
        self.removable = false;
        self.source.close()
    }
}

/// 过滤序列：不做转换，只用过滤器筛选元素，语义与[`TransformSeq`]一致。
pub struct FilterSeq<S: Sequence, F> {
    inner: TransformSeq<S, Identity, F>,
}

impl<S, F> FilterSeq<S, F>
where
    S: Sequence,
    F: Filter<S::Item>,
{
    pub fn new(source: S, filter: F) -> Self {
        FilterSeq { inner: TransformSeq::new(source, Identity, filter) }
    }

    pub fn source(&self) -> &S {
        self.inner.source()
    }

    pub fn into_source(self) -> S {
        self.inner.into_source()
    }
}

impl<S, F> Sequence for FilterSeq<S, F>
where
    S: Sequence,
    F: Filter<S::Item>,
{
    type Item = S::Item;

    fn has_next(&mut self) -> bool {
        self.inner.has_next()
    }

    fn next(&mut self) -> Result<Self::Item, SeqErr> {
        self.inner.next()
    }

    fn remove_current(&mut self) -> Result<(), SeqErr> {
        self.inner.remove_current()
    }
}

impl<S, F> CloseableSequence for FilterSeq<S, F>
where
    S: CloseableSequence,
    F: Filter<S::Item>,
{
    fn close(&mut self) -> Result<(), SeqErr> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::close::CloseableAdapter;
    use crate::filter::AcceptAll;
    use crate::seq::{SequenceExt, VecSource, from_iter};
    use std::cell::Cell;

    #[test]
    fn test_filter_even() {
        let mut seq = from_iter(vec![1, 2, 3, 4, 5, 6]).filtered(|x: &i32| x % 2 == 0);
        assert_eq!(Ok(2), seq.next());
        assert_eq!(Ok(4), seq.next());
        assert!(seq.has_next());
        assert_eq!(Ok(6), seq.next());
        assert!(!seq.has_next());
        assert!(!seq.has_next());
        assert_eq!(Err(SeqErr::Exhausted), seq.next());
    }

    #[test]
    fn test_transform_then_filter() {
        let mut seq = from_iter(vec![1, 2, 3, 4]).transformed_filtered(|x: i32| x * 10, |x: &i32| *x > 25);
        assert_eq!(Ok(vec![30, 40]), seq.collect_vec());
        assert!(!seq.has_next());
    }

    #[test]
    fn test_transform_changes_type() {
        let mut seq = from_iter(vec![1, 22, 333]).transformed(|x: u32| x.to_string());
        assert_eq!(Ok(vec!["1".to_string(), "22".to_string(), "333".to_string()]), seq.collect_vec());
    }

    #[test]
    fn test_empty_source() {
        let mut seq = from_iter(Vec::<i32>::new()).transformed_filtered(|x: i32| x + 1, AcceptAll);
        assert!(!seq.has_next());
        assert_eq!(Err(SeqErr::Exhausted), seq.next());
    }

    #[test]
    fn test_has_next_is_idempotent() {
        let mut seq = from_iter(vec![5, 6, 7, 8]).filtered(|x: &i32| *x > 6);
        for _ in 0..10 {
            assert!(seq.has_next());
        }
        assert_eq!(Ok(7), seq.next());
        for _ in 0..10 {
            assert!(seq.has_next());
        }
        assert_eq!(Ok(8), seq.next());
    }

    #[test]
    fn test_filter_evaluated_once_per_value() {
        let calls = Cell::new(0);
        let mut seq = from_iter(vec![1, 2, 3]).filtered(|x: &i32| {
            calls.set(calls.get() + 1);
            *x != 2
        });
        assert!(seq.has_next());
        assert!(seq.has_next());
        assert_eq!(1, calls.get());
        assert_eq!(Ok(1), seq.next());
        assert_eq!(1, calls.get());
        assert_eq!(Ok(3), seq.next());
        assert_eq!(3, calls.get());
        assert!(!seq.has_next());
        assert_eq!(3, calls.get());
    }

    #[test]
    fn test_nested_transform() {
        let mut seq = from_iter(1..=10)
            .filtered(|x: &i32| x % 2 == 1)
            .transformed(|x: i32| x * x)
            .filtered(|x: &i32| *x > 10);
        assert_eq!(Ok(vec![25, 49, 81]), seq.collect_vec());
    }

    #[test]
    fn test_remove_current() {
        let mut values = vec![1, 2, 3, 4, 5];
        {
            let mut seq = VecSource::new(&mut values).filtered(|x: &i32| x % 2 == 1);
            assert_eq!(Err(SeqErr::remove_without_next()), seq.remove_current());
            assert_eq!(Ok(1), seq.next());
            assert_eq!(Ok(()), seq.remove_current());
            assert_eq!(Err(SeqErr::remove_without_next()), seq.remove_current());
            assert_eq!(Ok(3), seq.next());
            assert!(seq.has_next());
            // 预读已越过3，不能再删除
            assert!(matches!(seq.remove_current(), Err(SeqErr::InvalidState { .. })));
            assert_eq!(Ok(5), seq.next());
            assert_eq!(Ok(()), seq.remove_current());
        }
        assert_eq!(vec![2, 3, 4], values);
    }

    #[test]
    fn test_remove_through_nested_filters() {
        let mut values = vec![1, 2, 3, 4, 5];
        {
            let mut seq = VecSource::new(&mut values).filtered(|x: &i32| *x > 2).filtered(|x: &i32| x % 2 == 0);
            assert_eq!(Ok(4), seq.next());
            assert_eq!(Ok(()), seq.remove_current());
            assert_eq!(Err(SeqErr::remove_without_next()), seq.remove_current());
            assert!(!seq.has_next());
        }
        assert_eq!(vec![1, 2, 3, 5], values);
    }

    #[test]
    fn test_remove_unsupported() {
        let mut seq = from_iter(vec![1]).filtered(AcceptAll);
        assert_eq!(Ok(1), seq.next());
        assert_eq!(Err(SeqErr::unsupported_remove()), seq.remove_current());
    }

    #[test]
    fn test_source_failure_is_surfaced_by_next() {
        struct Flaky(u8);
        impl Sequence for Flaky {
            type Item = u8;
            fn has_next(&mut self) -> bool {
                self.0 < 3
            }
            fn next(&mut self) -> Result<u8, SeqErr> {
                self.0 += 1;
                if self.0 == 2 { Err(SeqErr::Source("broken".to_string())) } else { Ok(self.0) }
            }
        }
        let mut seq = Flaky(0).filtered(AcceptAll);
        assert_eq!(Ok(1), seq.next());
        assert!(seq.has_next());
        assert_eq!(Err(SeqErr::Source("broken".to_string())), seq.next());
        assert_eq!(Ok(3), seq.next());
        assert!(!seq.has_next());
    }

    #[test]
    fn test_close_propagates_to_source() {
        let released = Cell::new(0);
        let source = CloseableAdapter::with_release(from_iter(vec![1, 2, 3]), |_| {
            released.set(released.get() + 1);
            Ok(())
        });
        let mut seq = source.filtered(|x: &i32| *x > 1);
        assert!(seq.has_next());
        assert_eq!(Ok(()), seq.close());
        assert_eq!(Ok(()), seq.close());
        assert_eq!(1, released.get());
        assert!(seq.source().is_closed());
    }

    #[test]
    fn test_close_with_failed_release() {
        let attempts = Cell::new(0);
        let failing = || {
            CloseableAdapter::with_release(from_iter(vec![1, 2, 3]), |_| {
                attempts.set(attempts.get() + 1);
                Err(SeqErr::Release("x".to_string()))
            })
        };

        let mut filtered = failing().filtered(|x: &i32| *x > 1);
        assert!(filtered.has_next());
        assert_eq!(Err(SeqErr::Release("x".to_string())), filtered.close());
        assert_eq!(Ok(()), filtered.close());
        assert_eq!(1, attempts.get());

        let mut transformed = failing().transformed(|x: i32| x * 2);
        assert_eq!(Ok(2), transformed.next());
        assert_eq!(Err(SeqErr::Release("x".to_string())), transformed.close());
        assert_eq!(Ok(()), transformed.close());
        assert_eq!(2, attempts.get());
        assert!(transformed.source().is_closed());
    }
}
