//! Read-only view over a blob
//! 代码块只读视图
//!
//! Works the same over a freshly built blob, an off-heap copy or bytes
//! embedded at link time.
//! 对新构建的代码块、堆外拷贝或链接期嵌入的字节行为一致。

use std::ops::{Range, RangeInclusive};

use crate::{
  Desc, Error, Result, blob_hash,
  consts::{BLOB_HASH_OFFSET, DESC_SIZE, HASH_SIZE, ISOLATE_HASH_OFFSET, TABLE_OFFSET},
};

#[inline]
fn read_u64(buf: &[u8], offset: usize) -> u64 {
  let mut b = [0u8; HASH_SIZE];
  b.copy_from_slice(&buf[offset..offset + HASH_SIZE]);
  u64::from_le_bytes(b)
}

/// Borrowed code and metadata of one blob. Descriptor offsets are relative
/// to the raw code right after the reserved header.
/// 单个代码块的代码与元数据借用视图，描述符偏移相对于保留头之后的原始代码。
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedData<'a> {
  code: &'a [u8],
  metadata: &'a [u8],
  header: usize,
}

impl<'a> EmbeddedData<'a> {
  /// Trusted constructor for buffers laid out by this crate
  /// 用于本 crate 布局的缓冲区，不做检查
  #[inline]
  pub(crate) fn new(code: &'a [u8], metadata: &'a [u8], header: usize) -> Self {
    Self {
      code,
      metadata,
      header,
    }
  }

  /// View over bytes loaded from elsewhere, checking table shape
  /// 基于外部加载字节的视图，检查描述符表结构
  pub fn from_parts(code: &'a [u8], metadata: &'a [u8], header: usize) -> Result<Self> {
    let n = metadata.len();
    if n < TABLE_OFFSET || (n - TABLE_OFFSET) % DESC_SIZE != 0 {
      return Err(Error::MetadataSize(n));
    }
    if header > code.len() {
      return Err(Error::CodeSize(code.len(), header));
    }
    let raw_size = code.len() - header;
    let d = Self {
      code,
      metadata,
      header,
    };
    let count = d.count();
    for index in 0..count {
      let Desc { offset, len } = d.desc(index);
      // Sorted, each routine ends before the next begins
      // 有序，每个例程在下一个开始前结束
      let next = if index + 1 < count {
        d.desc(index + 1).offset as usize
      } else {
        raw_size
      };
      if offset as usize + len as usize > next {
        return Err(Error::Desc {
          index,
          offset,
          len,
          code_size: code.len(),
        });
      }
    }
    Ok(d)
  }

  /// Number of builtins / 例程数量
  #[inline]
  pub fn count(&self) -> usize {
    (self.metadata.len() - TABLE_OFFSET) / DESC_SIZE
  }

  #[inline]
  pub fn code(&self) -> &'a [u8] {
    self.code
  }

  #[inline]
  pub fn code_size(&self) -> usize {
    self.code.len()
  }

  #[inline]
  pub fn metadata(&self) -> &'a [u8] {
    self.metadata
  }

  #[inline]
  pub fn metadata_size(&self) -> usize {
    self.metadata.len()
  }

  /// Address of the first code byte / 首个代码字节地址
  #[inline]
  pub fn code_start(&self) -> usize {
    self.code.as_ptr() as usize
  }

  /// Reserved header in front of the first routine / 首个例程前的保留头
  #[inline]
  pub fn header_size(&self) -> usize {
    self.header
  }

  /// Code buffer offset of builtin `i` / 例程 `i` 在代码缓冲区中的偏移
  #[inline]
  pub fn code_offset(&self, i: usize) -> usize {
    self.header + self.desc(i).offset as usize
  }

  /// Descriptor of builtin `i` / 例程 `i` 的描述符
  #[inline]
  pub fn desc(&self, i: usize) -> Desc {
    assert!(i < self.count(), "builtin {i} out of range");
    let at = TABLE_OFFSET + i * DESC_SIZE;
    Desc::decode(&self.metadata[at..at + DESC_SIZE])
  }

  #[inline]
  pub fn instruction_start(&self, i: usize) -> usize {
    self.code_start() + self.code_offset(i)
  }

  #[inline]
  pub fn instruction_size(&self, i: usize) -> u32 {
    self.desc(i).len
  }

  /// Size including trailing padding / 含尾部填充的大小
  #[inline]
  pub fn padded_instruction_size(&self, i: usize) -> usize {
    let end = if i + 1 < self.count() {
      self.code_offset(i + 1)
    } else {
      self.code.len()
    };
    end - self.code_offset(i)
  }

  /// Instructions of builtin `i` / 例程 `i` 的指令
  #[inline]
  pub fn instructions(&self, i: usize) -> &'a [u8] {
    let start = self.code_offset(i);
    &self.code[start..start + self.desc(i).len as usize]
  }

  /// Address range from the first to the end of the last builtin in `r`
  /// 从 `r` 中第一个例程起始到最后一个例程末尾的地址范围
  pub fn span(&self, r: RangeInclusive<usize>) -> Range<usize> {
    let (first, last) = r.into_inner();
    self.instruction_start(first)..self.instruction_start(last) + self.instruction_size(last) as usize
  }

  #[inline]
  pub fn isolate_hash(&self) -> u64 {
    read_u64(self.metadata, ISOLATE_HASH_OFFSET)
  }

  /// Stored self-hash / 存储的自身哈希
  #[inline]
  pub fn blob_hash(&self) -> u64 {
    read_u64(self.metadata, BLOB_HASH_OFFSET)
  }

  /// Recompute the self-hash / 重新计算自身哈希
  #[inline]
  pub fn create_blob_hash(&self) -> u64 {
    blob_hash(self.code, self.metadata)
  }

  pub fn verify(&self) -> Result<()> {
    let stored = self.blob_hash();
    let computed = self.create_blob_hash();
    if stored != computed {
      return Err(Error::Checksum { stored, computed });
    }
    Ok(())
  }

  /// Reject a blob built for another runtime state
  /// 拒绝为其他运行时状态构建的代码块
  pub fn check_isolate(&self, expected: u64) -> Result<()> {
    let found = self.isolate_hash();
    if found != expected {
      return Err(Error::IsolateHash { found, expected });
    }
    Ok(())
  }
}
