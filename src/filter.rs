use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::hash::Hash;
use unicase::UniCase;

/// 过滤器：判断值是否被接受。
///
/// 所有`Fn(&T) -> bool`闭包都是过滤器。过滤器通常无状态，可被多个序列共享（见[`by_ref`]）。
pub trait Filter<T: ?Sized> {
    fn accept(&self, value: &T) -> bool;
}

impl<T: ?Sized, F> Filter<T> for F
where
    F: Fn(&T) -> bool,
{
    fn accept(&self, value: &T) -> bool {
        self(value)
    }
}

/// 接受所有值。
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct AcceptAll;

impl<T: ?Sized> Filter<T> for AcceptAll {
    fn accept(&self, _: &T) -> bool {
        true
    }
}

/// 拒绝所有值。
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RejectAll;

impl<T: ?Sized> Filter<T> for RejectAll {
    fn accept(&self, _: &T) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct Not<F>(F);

#[derive(Debug, Clone)]
pub struct And<A, B>(A, B);

#[derive(Debug, Clone)]
pub struct Or<A, B>(A, B);

#[derive(Debug)]
pub struct ByRef<'a, F: ?Sized>(&'a F);

impl<F: ?Sized> Clone for ByRef<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: ?Sized> Copy for ByRef<'_, F> {}

/// 取反。
pub fn not<F>(filter: F) -> Not<F> {
    Not(filter)
}

/// 两个过滤器都接受时才接受，短路求值。
pub fn and<A, B>(first: A, second: B) -> And<A, B> {
    And(first, second)
}

/// 任一过滤器接受即接受，短路求值。
pub fn or<A, B>(first: A, second: B) -> Or<A, B> {
    Or(first, second)
}

/// 借用一个过滤器，使其可以同时用于多个序列。
pub fn by_ref<F: ?Sized>(filter: &F) -> ByRef<'_, F> {
    ByRef(filter)
}

impl<T: ?Sized, F: Filter<T>> Filter<T> for Not<F> {
    fn accept(&self, value: &T) -> bool {
        !self.0.accept(value)
    }
}

impl<T: ?Sized, A: Filter<T>, B: Filter<T>> Filter<T> for And<A, B> {
    fn accept(&self, value: &T) -> bool {
        self.0.accept(value) && self.1.accept(value)
    }
}

impl<T: ?Sized, A: Filter<T>, B: Filter<T>> Filter<T> for Or<A, B> {
    fn accept(&self, value: &T) -> bool {
        self.0.accept(value) || self.1.accept(value)
    }
}

impl<T: ?Sized, F: Filter<T> + ?Sized> Filter<T> for ByRef<'_, F> {
    fn accept(&self, value: &T) -> bool {
        self.0.accept(value)
    }
}

/// 去重过滤器，只接受每个值的第一次出现。
///
/// 有状态，内部不做同步，与所在序列一样只能单线程使用。
#[derive(Debug)]
pub struct Distinct<K> {
    seen: RefCell<FxHashSet<K>>,
}

impl<K> Distinct<K> {
    pub fn new() -> Self {
        Distinct { seen: RefCell::new(FxHashSet::default()) }
    }
}

impl<K> Default for Distinct<K> {
    fn default() -> Self {
        Distinct::new()
    }
}

impl<K: Hash + Eq + Clone> Filter<K> for Distinct<K> {
    fn accept(&self, value: &K) -> bool {
        let mut seen = self.seen.borrow_mut();
        if seen.contains(value) { false } else { seen.insert(value.clone()) }
    }
}

/// 忽略大小写的文本去重过滤器。
#[derive(Debug, Default)]
pub struct DistinctNocase {
    seen: RefCell<FxHashSet<UniCase<String>>>,
}

impl DistinctNocase {
    pub fn new() -> Self {
        DistinctNocase::default()
    }
}

impl<T: AsRef<str> + ?Sized> Filter<T> for DistinctNocase {
    fn accept(&self, value: &T) -> bool {
        self.seen.borrow_mut().insert(UniCase::new(value.as_ref().to_owned()))
    }
}
