//! Error types for eblob_page
//! eblob_page 错误类型

use std::io;

use thiserror::Error;

use crate::Perm;

#[derive(Error, Debug)]
pub enum Error {
  #[error("mmap {0} bytes failed: {1}")]
  Map(usize, io::Error),

  #[error("mprotect {0} bytes to {1:?} failed: {2}")]
  Protect(usize, Perm, io::Error),

  #[error("munmap {0} bytes failed: {1}")]
  Unmap(usize, io::Error),

  #[error("overflow: {0}/{1}")]
  Overflow(usize, usize),

  #[error("pages not writable: {0:?}")]
  NotWritable(Perm),
}

pub type Result<T> = std::result::Result<T, Error>;
