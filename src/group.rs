use crate::close::CloseableSequence;
use crate::err::SeqErr;
use crate::seq::Sequence;
use std::cmp::Ordering;
use tracing::debug;

/// 分组序列：把已按比较器排好序的底层序列中相邻且相等的元素合并为一组。
///
/// 需要一个元素的预读才能确定一组是否结束，因此`has_next`会拉取整组元素，
/// 并把下一组的第一个元素暂存起来。
///
/// 相邻两个元素比较结果为[`Ordering::Greater`]时说明输入未排序：
/// 已收集的元素先作为一组返回，随后的`next`返回[`SeqErr::InvalidState`]，
/// 之后从违反顺序的元素开始继续分组。
pub struct GroupSeq<S: Sequence, C> {
    source: S,
    grouping: C,
    // 下一组的第一个元素
    head: Option<S::Item>,
    pending: Option<Result<Vec<S::Item>, SeqErr>>,
    // 当前组之后需要交给调用方的错误
    deferred: Option<SeqErr>,
}

impl<S, C> GroupSeq<S, C>
where
    S: Sequence,
    C: FnMut(&S::Item, &S::Item) -> Ordering,
{
    pub fn new(source: S, grouping: C) -> Self {
        GroupSeq { source, grouping, head: None, pending: None, deferred: None }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 确保预读槽位非空，返回是否有分组（或错误）可取。
    fn fill(&mut self) -> bool {
        if self.pending.is_some() {
            return true;
        }
        if let Some(err) = self.deferred.take() {
            self.pending = Some(Err(err));
            return true;
        }
        let first = match self.head.take() {
            Some(first) => first,
            None if !self.source.has_next() => return false,
            None => match self.source.next() {
                Ok(first) => first,
                Err(err) => {
                    self.pending = Some(Err(err));
                    return true;
                }
            },
        };
        let mut group = vec![first];
        while self.source.has_next() {
            let item = match self.source.next() {
                Ok(item) => item,
                Err(err) => {
                    self.deferred = Some(err);
                    break;
                }
            };
            match (self.grouping)(&group[group.len() - 1], &item) {
                Ordering::Equal => group.push(item),
                Ordering::Less => {
                    self.head = Some(item);
                    break;
                }
                Ordering::Greater => {
                    debug!(size = group.len(), "input is not sorted, group cut short");
                    self.deferred = Some(SeqErr::unsorted_group());
                    self.head = Some(item);
                    break;
                }
            }
        }
        self.pending = Some(Ok(group));
        true
    }
}

impl<S, C> Sequence for GroupSeq<S, C>
where
    S: Sequence,
    C: FnMut(&S::Item, &S::Item) -> Ordering,
{
    type Item = Vec<S::Item>;

    fn has_next(&mut self) -> bool {
        self.fill()
    }

    fn next(&mut self) -> Result<Self::Item, SeqErr> {
        if !self.fill() {
            return Err(SeqErr::Exhausted);
        }
        self.pending.take().unwrap_or(Err(SeqErr::Exhausted))
    }
}

impl<S, C> CloseableSequence for GroupSeq<S, C>
where
    S: CloseableSequence,
    C: FnMut(&S::Item, &S::Item) -> Ordering,
{
    fn close(&mut self) -> Result<(), SeqErr> {
        self.head = None;
        self.pending = None;
        self.deferred = None;
        self.source.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::close::CloseableAdapter;
    use crate::seq::{SequenceExt, VecSource, from_iter};
    use std::cell::Cell;

    #[test]
    fn test_group_sorted() {
        let mut seq = from_iter(vec![1, 1, 2, 3, 3, 3]).group_sorted(i32::cmp);
        assert!(seq.has_next());
        assert_eq!(Ok(vec![1, 1]), seq.next());
        assert_eq!(Ok(vec![2]), seq.next());
        assert_eq!(Ok(vec![3, 3, 3]), seq.next());
        assert!(!seq.has_next());
        assert_eq!(Err(SeqErr::Exhausted), seq.next());
    }

    #[test]
    fn test_group_by_key() {
        let words = vec!["a", "b", "cc", "dd", "ee", "fff"];
        let mut seq = from_iter(words).group_sorted(|a: &&str, b: &&str| a.len().cmp(&b.len()));
        assert_eq!(Ok(vec![vec!["a", "b"], vec!["cc", "dd", "ee"], vec!["fff"]]), seq.collect_vec());
    }

    #[test]
    fn test_group_empty() {
        let mut seq = from_iter(Vec::<i32>::new()).group_sorted(i32::cmp);
        assert!(!seq.has_next());
        assert_eq!(Err(SeqErr::Exhausted), seq.next());
    }

    #[test]
    fn test_has_next_pulls_one_group() {
        let pulled = Cell::new(0);
        let source = from_iter(vec![1, 1, 2, 2, 3]).transformed(|x: i32| {
            pulled.set(pulled.get() + 1);
            x
        });
        let mut seq = source.group_sorted(i32::cmp);
        for _ in 0..5 {
            assert!(seq.has_next());
        }
        // 第一组加上下一组的首个元素
        assert_eq!(3, pulled.get());
        assert_eq!(Ok(vec![1, 1]), seq.next());
        assert_eq!(3, pulled.get());
        assert_eq!(Ok(vec![2, 2]), seq.next());
        assert_eq!(5, pulled.get());
    }

    #[test]
    fn test_unsorted_input() {
        let mut seq = from_iter(vec![1, 2, 2, 1, 1, 3]).group_sorted(i32::cmp);
        assert_eq!(Ok(vec![1]), seq.next());
        assert_eq!(Ok(vec![2, 2]), seq.next());
        assert!(seq.has_next());
        assert_eq!(Err(SeqErr::unsorted_group()), seq.next());
        assert_eq!(Ok(vec![1, 1]), seq.next());
        assert_eq!(Ok(vec![3]), seq.next());
        assert!(!seq.has_next());
    }

    #[test]
    fn test_source_failure_inside_group() {
        struct Flaky(u8);
        impl Sequence for Flaky {
            type Item = u8;
            fn has_next(&mut self) -> bool {
                self.0 < 4
            }
            fn next(&mut self) -> Result<u8, SeqErr> {
                self.0 += 1;
                if self.0 == 3 { Err(SeqErr::Source("broken".to_string())) } else { Ok(self.0 / 3) }
            }
        }
        // 元素依次为 0, 0, 错误, 1
        let mut seq = Flaky(0).group_sorted(u8::cmp);
        assert_eq!(Ok(vec![0, 0]), seq.next());
        assert_eq!(Err(SeqErr::Source("broken".to_string())), seq.next());
        assert_eq!(Ok(vec![1]), seq.next());
        assert!(!seq.has_next());
    }

    #[test]
    fn test_remove_unsupported() {
        let mut values = vec![1, 1, 2];
        let mut seq = VecSource::new(&mut values).group_sorted(i32::cmp);
        assert_eq!(Ok(vec![1, 1]), seq.next());
        assert_eq!(Err(SeqErr::unsupported_remove()), seq.remove_current());
        drop(seq);
        assert_eq!(vec![1, 1, 2], values);
    }

    #[test]
    fn test_close_propagates_to_source() {
        let released = Cell::new(0);
        let source = CloseableAdapter::with_release(from_iter(vec![1, 1, 2]), |_| {
            released.set(released.get() + 1);
            Ok(())
        });
        let mut seq = source.group_sorted(i32::cmp);
        assert!(seq.has_next());
        assert_eq!(Ok(()), seq.close());
        assert_eq!(Ok(()), seq.close());
        assert_eq!(1, released.get());
        assert!(seq.source().is_closed());
    }
}
