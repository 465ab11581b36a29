//! Instruction address to builtin lookup
//! 指令地址到例程的查找

use crate::EmbeddedData;

impl EmbeddedData<'_> {
  /// Whether `addr` lies inside the code buffer
  /// `addr` 是否位于代码缓冲区内
  #[inline]
  pub fn contains(&self, addr: usize) -> bool {
    let start = self.code_start();
    start <= addr && addr < start + self.code_size()
  }

  /// Builtin owning `addr`, padding counts for the preceding builtin.
  /// Caller guarantees `contains(addr)` and `addr >= instruction_start(0)`.
  /// 拥有 `addr` 的例程，填充归属前一个例程。
  /// 调用方须保证 `contains(addr)` 且 `addr >= instruction_start(0)`。
  pub fn resolve(&self, addr: usize) -> usize {
    debug_assert!(self.contains(addr));
    let (mut l, mut r) = (0, self.count());
    while l < r {
      let mid = (l + r) / 2;
      let start = self.instruction_start(mid);
      let end = start + self.padded_instruction_size(mid);
      if addr < start {
        r = mid;
      } else if addr >= end {
        l = mid + 1;
      } else {
        return mid;
      }
    }
    unreachable!("{addr:#x} inside blob but owned by no builtin");
  }

  /// `resolve` behind the bounds checks / 带边界检查的 `resolve`
  pub fn lookup(&self, addr: usize) -> Option<usize> {
    if !self.contains(addr) || self.count() == 0 || addr < self.instruction_start(0) {
      return None;
    }
    Some(self.resolve(addr))
  }
}
