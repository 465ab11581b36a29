//! Blob copy in page-allocated memory outside the managed heap
//! 托管堆外页内存中的代码块拷贝

use eblob_page::{Pages, Perm};

use crate::{EmbeddedData, Result};

/// Code pages (read-execute) and metadata pages (read-only)
/// 代码页（读执行）与元数据页（只读）
#[derive(Debug)]
pub struct OffHeap {
  code: Pages,
  metadata: Pages,
  header: usize,
}

impl OffHeap {
  /// Allocate, copy, then seal permissions. Code is never writable and
  /// executable at once.
  /// 分配、拷贝、再设置权限。代码不会同时可写可执行。
  pub fn new(d: &EmbeddedData) -> Result<Self> {
    let mut code = Pages::alloc(d.code_size())?;
    let mut metadata = Pages::alloc(d.metadata_size())?;

    code.extend(d.code())?;
    code.protect(Perm::ReadExecute)?;

    metadata.extend(d.metadata())?;
    metadata.protect(Perm::Read)?;

    log::debug!(
      "off-heap blob: code {:p}+{}, metadata {:p}+{}",
      code.as_ptr(),
      code.cap(),
      metadata.as_ptr(),
      metadata.cap()
    );
    Ok(Self {
      code,
      metadata,
      header: d.header_size(),
    })
  }

  #[inline]
  pub fn data(&self) -> EmbeddedData<'_> {
    EmbeddedData::new(&self.code, &self.metadata, self.header)
  }

  #[inline]
  pub fn code_ptr(&self) -> *const u8 {
    self.code.as_ptr()
  }

  #[inline]
  pub fn code_size(&self) -> usize {
    self.code.len()
  }

  #[inline]
  pub fn metadata_ptr(&self) -> *const u8 {
    self.metadata.as_ptr()
  }

  #[inline]
  pub fn metadata_size(&self) -> usize {
    self.metadata.len()
  }

  /// Release both regions, reporting the first failure
  /// 释放两个区域，返回第一个失败
  pub fn free(self) -> Result<()> {
    let Self { code, metadata, .. } = self;
    let r = code.free();
    metadata.free()?;
    Ok(r?)
  }
}
