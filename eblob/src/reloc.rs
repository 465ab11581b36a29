//! Intra-blob code target fixups
//! 代码块内部调用目标修正
//!
//! Heap-side call targets are rewritten as rel32 displacements to the
//! matching routine inside the blob. Displacements only depend on offsets,
//! so the fixed code stays valid wherever the blob is copied.
//! 堆上调用目标被改写为指向块内对应例程的 rel32 位移。
//! 位移只依赖偏移量，代码块拷贝到任意地址仍然有效。

use std::collections::HashMap;

use crate::{Builtin, Config, Desc, Error, Result, consts::REL_SIZE};

/// Relocation mode / 重定位类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RelocMode {
  CodeTarget = 0,
  RelativeCodeTarget = 1,
  EmbeddedObject = 2,
  ExternalReference = 3,
}

/// Set of relocation modes / 重定位类型集合
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeMask(pub u32);

impl ModeMask {
  /// Modes that name another builtin / 指向其他例程的类型
  pub const CODE_TARGETS: Self =
    Self(Self::of(RelocMode::CodeTarget).0 | Self::of(RelocMode::RelativeCodeTarget).0);

  #[inline]
  pub const fn of(mode: RelocMode) -> Self {
    Self(1 << mode as u32)
  }

  #[inline]
  pub const fn has(self, mode: RelocMode) -> bool {
    self.0 & Self::of(mode).0 != 0
  }
}

/// One relocation record / 单条重定位记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reloc {
  pub mode: RelocMode,
  /// Field offset within the routine 字段在例程内的偏移
  pub pc: u32,
  /// Absolute target address 绝对目标地址
  pub target: usize,
}

/// Relocation iteration capability of the code generator
/// 代码生成器提供的重定位遍历能力
pub trait RelocScan {
  /// Records of builtin `index` in its managed-heap code object
  /// 例程 `index` 托管堆代码对象中的记录
  fn on_heap(&self, index: usize, mask: ModeMask) -> impl Iterator<Item = Reloc>;

  /// Records of builtin `index` found in its blob copy `code`
  /// 例程 `index` 在代码块拷贝 `code` 中的记录
  fn off_heap(&self, index: usize, code: &[u8], mask: ModeMask) -> impl Iterator<Item = Reloc>;
}

/// Code buffer offset a rel32 field at `field` points to, `None` when the
/// field is out of bounds or the target falls before the buffer
/// 位于 `field` 的 rel32 字段指向的代码缓冲区偏移；字段越界或目标位于缓冲区之前时返回 `None`
pub fn rel_target(code: &[u8], field: usize, bias: u32) -> Option<usize> {
  let b: [u8; REL_SIZE] = code.get(field..field.checked_add(REL_SIZE)?)?.try_into().ok()?;
  let disp = i32::from_le_bytes(b) as i64;
  let to = i64::try_from(field).ok()?.checked_add(bias as i64 + disp)?;
  usize::try_from(to).ok()
}

/// Rewrite every code target of every builtin to point into `code`
/// 将所有例程的代码目标改写为指向 `code` 内部
pub fn fix(
  builtin_li: &[Builtin],
  table: &[Desc],
  code: &mut [u8],
  scan: &impl RelocScan,
  config: &Config,
) -> Result<()> {
  let by_heap: HashMap<usize, usize> = builtin_li
    .iter()
    .enumerate()
    .map(|(i, b)| (b.heap_start, i))
    .collect();

  for (i, b) in builtin_li.iter().enumerate() {
    let d = table[i];
    let start = config.header_size + d.offset as usize;
    let end = start + d.len as usize;
    let heap: Vec<Reloc> = scan.on_heap(i, ModeMask::CODE_TARGETS).collect();
    let blob: Vec<Reloc> = scan
      .off_heap(i, &code[start..end], ModeMask::CODE_TARGETS)
      .collect();

    // Without relative targets every call goes through the root register
    // 不支持相对目标时所有调用都经由根寄存器间接跳转
    if !config.relative_targets {
      if !heap.is_empty() || !blob.is_empty() {
        return Err(Error::RelocUnsupported {
          name: b.name.to_owned(),
        });
      }
      continue;
    }

    if heap.len() != blob.len() {
      return Err(Error::RelocCount {
        name: b.name.to_owned(),
        heap: heap.len(),
        blob: blob.len(),
      });
    }

    for (h, o) in heap.iter().zip(&blob) {
      if h.mode != o.mode {
        return Err(Error::RelocMode {
          name: b.name.to_owned(),
          heap: h.mode,
          blob: o.mode,
        });
      }
      let t = *by_heap.get(&h.target).ok_or_else(|| Error::RelocTarget {
        name: b.name.to_owned(),
        target: h.target,
      })?;
      if !builtin_li[t].isolate_independent {
        return Err(Error::RelocNotEmbeddable {
          name: b.name.to_owned(),
          target: builtin_li[t].name.to_owned(),
        });
      }
      if o.pc as usize + REL_SIZE > d.len as usize {
        return Err(Error::RelocRange {
          name: b.name.to_owned(),
          pc: o.pc,
          len: d.len,
        });
      }
      let field = start + o.pc as usize;
      let to = config.header_size + table[t].offset as usize;
      let disp = to as i64 - field as i64 - config.rel_bias as i64;
      let disp = i32::try_from(disp).map_err(|_| Error::RelocOverflow {
        name: b.name.to_owned(),
        disp,
      })?;
      // Off-heap write, no barrier / 堆外写入，无写屏障
      code[field..field + REL_SIZE].copy_from_slice(&disp.to_le_bytes());
    }
  }
  Ok(())
}
