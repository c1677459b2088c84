use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// 映射：把源值转换为目标值的纯函数。
///
/// 所有`Fn(S) -> D`闭包都是映射。
pub trait Mapping<S> {
    type Output;

    fn map(&self, source: S) -> Self::Output;
}

impl<S, D, F> Mapping<S> for F
where
    F: Fn(S) -> D,
{
    type Output = D;

    fn map(&self, source: S) -> D {
        self(source)
    }
}

/// 恒等映射。
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Identity;

impl<S> Mapping<S> for Identity {
    type Output = S;

    fn map(&self, source: S) -> S {
        source
    }
}

/// 常量映射，忽略源值，总是返回同一个值的克隆。
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Constant<T>(pub T);

impl<S, T: Clone> Mapping<S> for Constant<T> {
    type Output = T;

    fn map(&self, _: S) -> T {
        self.0.clone()
    }
}

/// 解析映射，去除首尾空白后把文本解析为`T`，解析失败得到`None`。
pub struct Parse<T>(PhantomData<fn() -> T>);

impl<T> Parse<T> {
    pub const fn new() -> Self {
        Parse(PhantomData)
    }
}

impl<T> Default for Parse<T> {
    fn default() -> Self {
        Parse::new()
    }
}

impl<T> fmt::Debug for Parse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse<{}>", std::any::type_name::<T>())
    }
}

impl<S: AsRef<str>, T: FromStr> Mapping<S> for Parse<T> {
    type Output = Option<T>;

    fn map(&self, source: S) -> Option<T> {
        source.as_ref().trim().parse().ok()
    }
}

/// 依次执行两个映射。
#[derive(Debug, Clone)]
pub struct Chained<A, B>(pub A, pub B);

impl<S, A, B> Mapping<S> for Chained<A, B>
where
    A: Mapping<S>,
    B: Mapping<A::Output>,
{
    type Output = B::Output;

    fn map(&self, source: S) -> B::Output {
        self.1.map(self.0.map(source))
    }
}
