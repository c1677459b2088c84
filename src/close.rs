use crate::err::SeqErr;
use crate::seq::{Sequence, SequenceExt};
use tracing::{debug, warn};

/// 持有可释放资源的序列。
///
/// `close`必须幂等：第一次调用执行释放动作，之后的调用什么也不做且不返回错误。
/// 释放动作失败时错误返回给第一次`close`的调用方，但序列仍视为已关闭，不会再次尝试释放。
pub trait CloseableSequence: Sequence {
    fn close(&mut self) -> Result<(), SeqErr>;
}

impl<S: CloseableSequence + ?Sized> CloseableSequence for &mut S {
    fn close(&mut self) -> Result<(), SeqErr> {
        (**self).close()
    }
}

impl<S: CloseableSequence + ?Sized> CloseableSequence for Box<S> {
    fn close(&mut self) -> Result<(), SeqErr> {
        (**self).close()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CloseState {
    Open,
    Closed,
}

/// 委托给内部序列的释放动作。
pub type DelegateRelease<S> = fn(&mut S) -> Result<(), SeqErr>;

fn release_nothing<S>(_: &mut S) -> Result<(), SeqErr> {
    Ok(())
}

/// 可关闭适配器。
///
/// 把任意序列包装为[`CloseableSequence`]，释放动作由构造方式决定：
/// * [`CloseableAdapter::new`]：无释放动作，只记录关闭状态；
/// * [`CloseableAdapter::proxy`]：关闭时委托内部的可关闭序列；
/// * [`CloseableAdapter::with_release`]：关闭时执行给定回调。
///
/// 关闭后不做额外检查，`has_next`/`next`等操作照常委托给内部序列。
/// 被丢弃时若仍未关闭，会自动关闭，释放失败只记录日志。
pub struct CloseableAdapter<S, R = DelegateRelease<S>>
where
    S: Sequence,
    R: FnOnce(&mut S) -> Result<(), SeqErr>,
{
    inner: S,
    release: Option<R>,
    state: CloseState,
}

impl<S: Sequence> CloseableAdapter<S> {
    pub fn new(inner: S) -> Self {
        CloseableAdapter { inner, release: Some(release_nothing::<S> as DelegateRelease<S>), state: CloseState::Open }
    }
}

impl<S: CloseableSequence> CloseableAdapter<S> {
    /// 代理另一个可关闭序列，关闭代理即关闭被代理者，且只关闭一次。
    ///
    /// 代理被丢弃时若仍未关闭，同样会关闭被代理者，即使代理的是借用（`&mut S`）。
    /// 代理结束后仍需继续使用被代理者时，改用`CloseableAdapter::new(&mut inner)`，它不会关闭被代理者。
    pub fn proxy(inner: S) -> Self {
        CloseableAdapter { inner, release: Some(S::close as DelegateRelease<S>), state: CloseState::Open }
    }
}

impl<S, R> CloseableAdapter<S, R>
where
    S: Sequence,
    R: FnOnce(&mut S) -> Result<(), SeqErr>,
{
    pub fn with_release(inner: S, release: R) -> Self {
        CloseableAdapter { inner, release: Some(release), state: CloseState::Open }
    }

    pub fn state(&self) -> CloseState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == CloseState::Closed
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

impl<S, R> Sequence for CloseableAdapter<S, R>
where
    S: Sequence,
    R: FnOnce(&mut S) -> Result<(), SeqErr>,
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

impl<S, R> CloseableSequence for CloseableAdapter<S, R>
where
    S: Sequence,
    R: FnOnce(&mut S) -> Result<(), SeqErr>,
{
    fn close(&mut self) -> Result<(), SeqErr> {
        if self.state == CloseState::Closed {
            return Ok(());
        }
        // 先置关闭标记，释放失败时也不会重复释放
        self.state = CloseState::Closed;
        debug!("closing sequence");
        match self.release.take() {
            Some(release) => release(&mut self.inner).inspect_err(|err| debug!(%err, "release failed")),
            None => Ok(()),
        }
    }
}

impl<S, R> Drop for CloseableAdapter<S, R>
where
    S: Sequence,
    R: FnOnce(&mut S) -> Result<(), SeqErr>,
{
    fn drop(&mut self) {
        if self.state == CloseState::Open
            && let Err(err) = self.close()
        {
            warn!(%err, "release failed while dropping an unclosed sequence");
        }
    }
}

/// 独占资源的序列，关闭时丢弃资源。
///
/// 每次从资源中拉取一个元素：`None`表示耗尽，`Some(Err)`表示读取失败（由`next`返回）。
/// 关闭后视为已耗尽：`has_next`返回`false`，`next`返回[`SeqErr::Exhausted`]。
pub struct ResourceSeq<R, T, F>
where
    F: FnMut(&mut R) -> Option<Result<T, SeqErr>>,
{
    resource: Option<R>,
    pull: F,
    peeked: Option<Result<T, SeqErr>>,
    done: bool,
}

impl<R, T, F> ResourceSeq<R, T, F>
where
    F: FnMut(&mut R) -> Option<Result<T, SeqErr>>,
{
    pub fn new(resource: R, pull: F) -> Self {
        ResourceSeq { resource: Some(resource), pull, peeked: None, done: false }
    }

    pub fn is_closed(&self) -> bool {
        self.resource.is_none()
    }
}

impl<R, T, F> Sequence for ResourceSeq<R, T, F>
where
    F: FnMut(&mut R) -> Option<Result<T, SeqErr>>,
{
    type Item = T;

    fn has_next(&mut self) -> bool {
        if self.peeked.is_some() {
            return true;
        }
        if self.done {
            return false;
        }
        match self.resource.as_mut() {
            Some(resource) => {
                self.peeked = (self.pull)(resource);
                self.done = self.peeked.is_none();
                !self.done
            }
            None => false,
        }
    }

    fn next(&mut self) -> Result<Self::Item, SeqErr> {
        if self.has_next() {
            self.peeked.take().unwrap_or(Err(SeqErr::Exhausted))
        } else {
            Err(SeqErr::Exhausted)
        }
    }
}

impl<R, T, F> CloseableSequence for ResourceSeq<R, T, F>
where
    F: FnMut(&mut R) -> Option<Result<T, SeqErr>>,
{
    fn close(&mut self) -> Result<(), SeqErr> {
        if let Some(resource) = self.resource.take() {
            self.peeked = None;
            self.done = true;
            drop(resource);
            debug!("resource released");
        }
        Ok(())
    }
}

/// 作用域内使用可关闭序列：执行`body`后无论成败都会关闭序列。
///
/// `body`失败时返回其错误（关闭错误只记录日志），否则返回关闭的结果。
pub fn use_closing<S, T, E, B>(mut seq: S, body: B) -> Result<T, E>
where
    S: CloseableSequence,
    E: From<SeqErr>,
    B: FnOnce(&mut S) -> Result<T, E>,
{
    let res = body(&mut seq);
    let closed = seq.close();
    match res {
        Ok(value) => closed.map(|_| value).map_err(E::from),
        Err(err) => {
            if let Err(close_err) = closed {
                warn!(err = %close_err, "close failed after body error");
            }
            Err(err)
        }
    }
}

/// 收集全部元素并关闭序列。
pub fn collect_closing<S: CloseableSequence>(seq: S) -> Result<Vec<S::Item>, SeqErr> {
    use_closing(seq, |seq| seq.collect_vec())
}
