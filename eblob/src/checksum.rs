//! Checksum wrapper 校验和封装
//! PCLMULQDQ accelerated via crc_fast 通过 crc_fast 实现硬件加速

use crc_fast::{CrcAlgorithm, Digest, checksum};

use crate::consts::{BLOB_HASH_OFFSET, HASH_SIZE};

const ALGO: CrcAlgorithm = CrcAlgorithm::Crc64Nvme;

/// Hash of runtime state the blob was built against
/// 构建代码块时运行时状态的哈希
#[inline]
pub fn isolate_hash_of(state: &[u8]) -> u64 {
  checksum(ALGO, state)
}

/// Hash every byte except the self-hash field
/// 对除自身哈希字段外的所有字节求哈希
pub fn blob_hash(code: &[u8], metadata: &[u8]) -> u64 {
  let mut d = Digest::new(ALGO);
  d.update(&metadata[..BLOB_HASH_OFFSET]);
  d.update(&metadata[BLOB_HASH_OFFSET + HASH_SIZE..]);
  d.update(code);
  d.finalize()
}
