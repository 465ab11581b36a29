//! Blob construction
//! 代码块构建

use crate::{
  Builtin, Config, Desc, EmbeddedData, Error, OffHeap, RelocScan, Result, Stat, blob_hash,
  consts::{BLOB_HASH_OFFSET, DESC_SIZE, HASH_SIZE, ISOLATE_HASH_OFFSET, TABLE_OFFSET},
  reloc, validate,
};
use eblob_page::round_up;

/// Owned blob: code buffer plus metadata buffer
/// 拥有所有权的代码块：代码缓冲区与元数据缓冲区
#[derive(Debug)]
pub struct Blob {
  code: Box<[u8]>,
  metadata: Box<[u8]>,
  header: usize,
}

/// Offsets of every routine past the header, and the code buffer size
/// 每个例程相对保留头之后的偏移，以及代码缓冲区大小
pub fn layout(builtin_li: &[Builtin], config: &Config) -> Result<(Vec<Desc>, usize)> {
  let mut total = 0;
  let mut table = Vec::with_capacity(builtin_li.len());
  for b in builtin_li {
    debug_assert_eq!(total % config.code_align, 0);
    let offset = u32::try_from(total).map_err(|_| Error::TooLarge(total))?;
    let len = u32::try_from(b.code.len()).map_err(|_| Error::TooLarge(b.code.len()))?;
    table.push(Desc::new(offset, len));
    total += round_up(b.code.len(), config.code_align);
  }
  let size = config.header_size + total;
  u32::try_from(size).map_err(|_| Error::TooLarge(size))?;
  Ok((table, size))
}

impl Blob {
  /// Build from the full builtin set
  /// 从完整的例程集合构建
  pub fn build(
    builtin_li: &[Builtin],
    isolate_hash: u64,
    scan: &impl RelocScan,
    config: &Config,
  ) -> Result<Self> {
    config.check()?;
    validate(builtin_li, config)?;

    let (table, code_size) = layout(builtin_li, config)?;

    // Poison first so padding traps / 先填充陷阱字节，使填充区执行即陷入
    let mut code = vec![config.poison; code_size].into_boxed_slice();
    let mut metadata = vec![0u8; TABLE_OFFSET + table.len() * DESC_SIZE].into_boxed_slice();

    metadata[ISOLATE_HASH_OFFSET..ISOLATE_HASH_OFFSET + HASH_SIZE]
      .copy_from_slice(&isolate_hash.to_le_bytes());
    for (i, d) in table.iter().enumerate() {
      let at = TABLE_OFFSET + i * DESC_SIZE;
      d.encode(&mut metadata[at..at + DESC_SIZE]);
    }
    for (b, d) in builtin_li.iter().zip(&table) {
      let at = config.header_size + d.offset as usize;
      code[at..at + b.code.len()].copy_from_slice(b.code);
    }

    reloc::fix(builtin_li, &table, &mut code, scan, config)?;

    // Last, every other byte is final / 最后一步，其余字节均已确定
    let hash = blob_hash(&code, &metadata);
    metadata[BLOB_HASH_OFFSET..BLOB_HASH_OFFSET + HASH_SIZE].copy_from_slice(&hash.to_le_bytes());

    let blob = Self {
      code,
      metadata,
      header: config.header_size,
    };
    debug_assert_eq!(blob.data().create_blob_hash(), hash);
    log::debug!(
      "built blob: {} builtins, code {} bytes, metadata {} bytes",
      table.len(),
      blob.code.len(),
      blob.metadata.len()
    );
    if config.stat {
      log::info!("{}", Stat::new(&blob.data()));
    }
    Ok(blob)
  }

  #[inline]
  pub fn data(&self) -> EmbeddedData<'_> {
    EmbeddedData::new(&self.code, &self.metadata, self.header)
  }

  /// Hand both buffers over, e.g. for link-time embedding.
  /// The header size stays with the `Config` that built them.
  /// 交出两个缓冲区，例如用于链接期嵌入。保留头大小由构建时的 `Config` 给出。
  #[inline]
  pub fn into_parts(self) -> (Box<[u8]>, Box<[u8]>) {
    (self.code, self.metadata)
  }

  /// Copy into executable pages and dispose of this blob
  /// 拷贝到可执行页并释放本代码块
  pub fn materialize(self) -> Result<OffHeap> {
    OffHeap::new(&self.data())
  }
}
