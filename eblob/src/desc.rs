//! 例程描述符 Routine descriptor

use crate::consts::DESC_SIZE;

/// Offset (from the end of the reserved header) and length of one routine (8 bytes)
/// 例程的偏移（自保留头末尾起）与长度（8 字节）
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Desc {
  pub offset: u32, // 4: 相对保留头之后的原始代码
  pub len: u32,    // 4: 指令长度（不含填充）
}

const _: () = assert!(size_of::<Desc>() == DESC_SIZE);

impl Desc {
  #[inline]
  pub const fn new(offset: u32, len: u32) -> Self {
    Self { offset, len }
  }

  /// 从字节解码 Decode from bytes
  #[inline]
  pub fn decode(buf: &[u8]) -> Self {
    debug_assert!(buf.len() >= DESC_SIZE);
    Self {
      offset: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
      len: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
    }
  }

  /// 编码到字节 Encode to bytes
  #[inline]
  pub fn encode(&self, buf: &mut [u8]) {
    debug_assert!(buf.len() >= DESC_SIZE);
    buf[0..4].copy_from_slice(&self.offset.to_le_bytes());
    buf[4..8].copy_from_slice(&self.len.to_le_bytes());
  }
}
