//! 错误定义 Error definitions

use std::fmt;

use thiserror::Error;

/// 结果类型 Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Why a builtin cannot be embedded / 例程无法嵌入的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
  IsolateDependent,
  AliasesTrampolineReg,
}

/// Offending builtin / 违规例程
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsafe {
  pub index: usize,
  pub name: String,
  pub reason: Reason,
}

impl fmt::Display for Unsafe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.reason {
      Reason::IsolateDependent => write!(f, "{} is not isolate-independent", self.name),
      Reason::AliasesTrampolineReg => {
        write!(f, "{} aliases the off-heap trampoline register", self.name)
      }
    }
  }
}

struct List<'a>(&'a [Unsafe]);

impl fmt::Display for List<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, u) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{u}")?;
    }
    Ok(())
  }
}

/// 错误类型 Error type
#[derive(Error, Debug)]
pub enum Error {
  #[error("page: {0}")]
  Page(#[from] eblob_page::Error),

  #[error("code alignment {0} is not a power of 2")]
  CodeAlign(usize),

  #[error("header size {0} is not a multiple of alignment {1}")]
  HeaderSize(usize, usize),

  #[error("{} unsafe builtin(s): {}", .0.len(), List(.0))]
  Unsafe(Vec<Unsafe>),

  #[error("blob too large: {0} bytes")]
  TooLarge(usize),

  #[error("{name}: heap has {heap} code targets, blob has {blob}")]
  RelocCount {
    name: String,
    heap: usize,
    blob: usize,
  },

  #[error("{name}: reloc mode {heap:?} on heap vs {blob:?} in blob")]
  RelocMode {
    name: String,
    heap: crate::RelocMode,
    blob: crate::RelocMode,
  },

  #[error("{name}: code target {target:#x} is not a builtin")]
  RelocTarget { name: String, target: usize },

  #[error("{name}: code target {target} is not embeddable")]
  RelocNotEmbeddable { name: String, target: String },

  #[error("{name}: reloc field at {pc} out of range {len}")]
  RelocRange { name: String, pc: u32, len: u32 },

  #[error("{name}: displacement {disp} does not fit rel32")]
  RelocOverflow { name: String, disp: i64 },

  #[error("{name}: relative code target on a platform without relative targets")]
  RelocUnsupported { name: String },

  #[error("code size {0} smaller than header {1}")]
  CodeSize(usize, usize),

  #[error("invalid metadata size: {0}")]
  MetadataSize(usize),

  #[error("invalid descriptor {index}: offset {offset} len {len} code size {code_size}")]
  Desc {
    index: usize,
    offset: u32,
    len: u32,
    code_size: usize,
  },

  #[error("checksum mismatch: stored {stored:#018x} computed {computed:#018x}")]
  Checksum { stored: u64, computed: u64 },

  #[error("isolate hash mismatch: blob {found:#018x} expected {expected:#018x}")]
  IsolateHash { found: u64, expected: u64 },

  #[error("embedded blob already published")]
  Published,
}
