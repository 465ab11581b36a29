//! Process-wide "current blob" slot
//! 进程级"当前代码块"槽位
//!
//! Lifecycle: unset -> published once -> torn down at exit. Reads after
//! publication are lock-free. Nothing may execute blob code before
//! `publish` or after `teardown`.
//! 生命周期：未设置 -> 发布一次 -> 退出时销毁。发布后读取无锁。
//! `publish` 之前与 `teardown` 之后不得执行代码块中的代码。

use std::{
  ptr,
  sync::atomic::{AtomicPtr, Ordering},
};

use crate::{EmbeddedData, Error, OffHeap, Result};

/// Blob backing the runtime / 运行时使用的代码块
#[derive(Debug)]
pub enum Embedded {
  /// Linked into the binary 链接进二进制
  Static(EmbeddedData<'static>),
  /// Copied into pages at startup 启动时拷贝到页内存
  OffHeap(OffHeap),
}

impl Embedded {
  #[inline]
  pub fn data(&self) -> EmbeddedData<'_> {
    match self {
      Embedded::Static(d) => *d,
      Embedded::OffHeap(o) => o.data(),
    }
  }
}

/// Single owner of the current blob, usable as a `static`
/// 当前代码块的唯一所有者，可用作 `static`
#[derive(Debug)]
pub struct Slot {
  ptr: AtomicPtr<Embedded>,
}

impl Default for Slot {
  fn default() -> Self {
    Self::new()
  }
}

impl Slot {
  pub const fn new() -> Self {
    Self {
      ptr: AtomicPtr::new(ptr::null_mut()),
    }
  }

  /// Publish once; a second publish fails and drops `e`
  /// 只能发布一次；再次发布失败并释放 `e`
  pub fn publish(&self, e: Embedded) -> Result<()> {
    let p = Box::into_raw(Box::new(e));
    if self
      .ptr
      .compare_exchange(ptr::null_mut(), p, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      drop(unsafe { Box::from_raw(p) });
      return Err(Error::Published);
    }
    log::debug!("embedded blob published");
    Ok(())
  }

  #[inline]
  pub fn get(&self) -> Option<EmbeddedData<'_>> {
    let p = self.ptr.load(Ordering::Acquire);
    // SAFETY: only `teardown` frees, and its caller excludes readers
    // 只有 `teardown` 会释放，其调用方保证没有读者
    unsafe { p.as_ref() }.map(Embedded::data)
  }

  /// Whether `pc` lies in the current blob's code
  /// `pc` 是否位于当前代码块的代码中
  #[inline]
  pub fn pc_is_off_heap(&self, pc: usize) -> bool {
    self.get().is_some_and(|d| d.contains(pc))
  }

  /// Builtin owning `pc`, if any / 拥有 `pc` 的例程（若存在）
  #[inline]
  pub fn try_lookup(&self, pc: usize) -> Option<usize> {
    self.get().and_then(|d| d.lookup(pc))
  }

  /// Take the blob out for disposal or replacement
  /// 取出代码块以释放或替换
  ///
  /// # Safety
  /// No thread may execute blob code or hold a view from `get`.
  /// 任何线程都不得在执行代码块代码或持有 `get` 返回的视图。
  pub unsafe fn teardown(&self) -> Option<Embedded> {
    let p = self.ptr.swap(ptr::null_mut(), Ordering::AcqRel);
    if p.is_null() {
      return None;
    }
    log::debug!("embedded blob torn down");
    Some(*unsafe { Box::from_raw(p) })
  }
}

impl Drop for Slot {
  fn drop(&mut self) {
    let p = *self.ptr.get_mut();
    if !p.is_null() {
      drop(unsafe { Box::from_raw(p) });
    }
  }
}
