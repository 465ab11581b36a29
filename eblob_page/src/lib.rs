#![cfg_attr(docsrs, feature(doc_cfg))]

//! Page-granular anonymous memory with explicit permissions
//! 带显式权限的页粒度匿名内存
//!
//! Regions start read-write and move to their final permission once filled.
//! A region is never writable and executable at the same time.
//! 区域初始可读写，填充后切换到最终权限，任何时刻都不会同时可写可执行。

mod error;

use std::{
  fmt::{Debug, Formatter, Result as FmtResult},
  io,
  mem::ManuallyDrop,
  ops::Deref,
  ptr::{self, NonNull, copy_nonoverlapping},
  slice::from_raw_parts,
  sync::OnceLock,
};

use Error::{Map, NotWritable, Overflow, Protect, Unmap};
pub use error::{Error, Result};

/// Fallback page size when sysconf fails / sysconf 失败时的默认页大小
pub const PAGE_SIZE: usize = 4096;

/// Page permission / 页权限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perm {
  ReadWrite,
  ReadExecute,
  Read,
}

impl Perm {
  #[inline(always)]
  const fn prot(self) -> libc::c_int {
    match self {
      Perm::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
      Perm::ReadExecute => libc::PROT_READ | libc::PROT_EXEC,
      Perm::Read => libc::PROT_READ,
    }
  }
}

/// Platform allocation page size / 平台分配页大小
pub fn page_size() -> usize {
  static SIZE: OnceLock<usize> = OnceLock::new();
  *SIZE.get_or_init(|| {
    let n = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if n > 0 { n as usize } else { PAGE_SIZE }
  })
}

/// Round `n` up to `align` (power of 2) / 向上对齐到 `align`（2 的幂）
#[inline(always)]
pub const fn round_up(n: usize, align: usize) -> usize {
  (n + align - 1) & !(align - 1)
}

/// Owned page region, released by `free` or on drop
/// 拥有所有权的页区域，通过 `free` 或 Drop 释放
pub struct Pages {
  ptr: NonNull<u8>,
  len: usize,
  cap: usize,
  perm: Perm,
}

// SAFETY: exclusively owned; only written while ReadWrite through &mut self
// 独占所有权，仅在 ReadWrite 状态下通过 &mut self 写入
unsafe impl Send for Pages {}
unsafe impl Sync for Pages {}

impl Pages {
  /// Map at least `size` bytes read-write, rounded up to whole pages
  /// 映射至少 `size` 字节的可读写内存，按整页向上取整
  pub fn alloc(size: usize) -> Result<Self> {
    let cap = round_up(size.max(1), page_size());
    let ptr = unsafe {
      libc::mmap(
        ptr::null_mut(),
        cap,
        Perm::ReadWrite.prot(),
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
        -1,
        0,
      )
    };
    if ptr == libc::MAP_FAILED {
      return Err(Map(cap, io::Error::last_os_error()));
    }
    let ptr = NonNull::new(ptr.cast::<u8>()).ok_or_else(|| Map(cap, io::Error::last_os_error()))?;
    log::debug!("map {cap} bytes at {:p}", ptr.as_ptr());
    Ok(Self {
      ptr,
      len: 0,
      cap,
      perm: Perm::ReadWrite,
    })
  }

  /// Map and fill with `data` / 映射并写入 `data`
  pub fn with_data(data: &[u8]) -> Result<Self> {
    let mut pages = Self::alloc(data.len())?;
    pages.extend(data)?;
    Ok(pages)
  }

  /// Append bytes, only while ReadWrite / 追加字节，仅限可读写状态
  pub fn extend(&mut self, data: &[u8]) -> Result<()> {
    if self.perm != Perm::ReadWrite {
      return Err(NotWritable(self.perm));
    }
    let new_len = self.len + data.len();
    if new_len > self.cap {
      return Err(Overflow(new_len, self.cap));
    }
    unsafe { copy_nonoverlapping(data.as_ptr(), self.ptr.as_ptr().add(self.len), data.len()) };
    self.len = new_len;
    Ok(())
  }

  /// Change permission of the whole region / 修改整个区域的权限
  pub fn protect(&mut self, perm: Perm) -> Result<()> {
    let r = unsafe { libc::mprotect(self.ptr.as_ptr().cast(), self.cap, perm.prot()) };
    if r != 0 {
      return Err(Protect(self.cap, perm, io::Error::last_os_error()));
    }
    self.perm = perm;
    Ok(())
  }

  /// Unmap, reporting failure instead of logging it
  /// 解除映射，失败时返回错误而非仅记录日志
  pub fn free(self) -> Result<()> {
    let me = ManuallyDrop::new(self);
    unsafe { unmap(me.ptr, me.cap) }
  }

  #[inline(always)]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline(always)]
  pub fn cap(&self) -> usize {
    self.cap
  }

  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  #[inline(always)]
  pub fn perm(&self) -> Perm {
    self.perm
  }

  #[inline(always)]
  pub fn as_ptr(&self) -> *const u8 {
    self.ptr.as_ptr()
  }
}

unsafe fn unmap(ptr: NonNull<u8>, cap: usize) -> Result<()> {
  if unsafe { libc::munmap(ptr.as_ptr().cast(), cap) } != 0 {
    return Err(Unmap(cap, io::Error::last_os_error()));
  }
  log::debug!("unmap {cap} bytes at {:p}", ptr.as_ptr());
  Ok(())
}

impl Drop for Pages {
  fn drop(&mut self) {
    if let Err(e) = unsafe { unmap(self.ptr, self.cap) } {
      log::error!("{e}");
    }
  }
}

impl Deref for Pages {
  type Target = [u8];

  #[inline]
  fn deref(&self) -> &[u8] {
    unsafe { from_raw_parts(self.ptr.as_ptr(), self.len) }
  }
}

impl AsRef<[u8]> for Pages {
  #[inline]
  fn as_ref(&self) -> &[u8] {
    self
  }
}

impl Debug for Pages {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Pages")
      .field("ptr", &self.ptr)
      .field("len", &self.len)
      .field("cap", &self.cap)
      .field("perm", &self.perm)
      .finish()
  }
}
