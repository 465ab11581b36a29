//! Blob configuration
//! 代码块配置

use crate::{Error, Reg, Result};

/// Configuration overrides
/// 配置覆盖项
#[derive(Debug, Clone, Copy)]
pub enum Conf {
  /// Routine alignment, power of 2
  /// 例程对齐，必须是 2 的幂
  CodeAlign(usize),

  /// Reserved code header size, multiple of the alignment
  /// 保留代码头大小，必须是对齐的整数倍
  HeaderSize(usize),

  /// Trap byte for padding
  /// 填充用陷阱字节
  Poison(u8),

  /// Register reserved for blob-relative trampolines
  /// 代码块相对跳板保留寄存器
  TrampolineReg(Reg),

  /// Platform supports relative code targets
  /// 平台是否支持相对代码目标
  RelativeTargets(bool),

  /// Displacement base = field address + bias
  /// 位移基址 = 字段地址 + 偏置
  RelBias(u32),

  /// Log statistics after build
  /// 构建后输出统计
  Stat(bool),
}

/// Resolved configuration
/// 解析后的配置
#[derive(Debug, Clone)]
pub struct Config {
  pub code_align: usize,
  pub header_size: usize,
  pub poison: u8,
  pub trampoline_reg: Reg,
  pub relative_targets: bool,
  pub rel_bias: u32,
  pub stat: bool,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      code_align: default::CODE_ALIGN,
      header_size: default::HEADER_SIZE,
      poison: default::POISON,
      trampoline_reg: default::TRAMPOLINE_REG,
      relative_targets: default::RELATIVE_TARGETS,
      rel_bias: default::REL_BIAS,
      stat: false,
    }
  }
}

impl Config {
  /// Reject values the layout cannot honor
  /// 拒绝布局无法满足的取值
  pub fn check(&self) -> Result<()> {
    if !self.code_align.is_power_of_two() {
      return Err(Error::CodeAlign(self.code_align));
    }
    if self.header_size % self.code_align != 0 {
      return Err(Error::HeaderSize(self.header_size, self.code_align));
    }
    Ok(())
  }
}

impl From<&[Conf]> for Config {
  fn from(conf_li: &[Conf]) -> Self {
    let mut config = Self::default();
    for &conf in conf_li {
      match conf {
        Conf::CodeAlign(v) => {
          if v.is_power_of_two() {
            config.code_align = v;
          } else {
            log::warn!("CodeAlign {v} is not a power of 2");
          }
        }
        Conf::HeaderSize(v) => config.header_size = v,
        Conf::Poison(v) => config.poison = v,
        Conf::TrampolineReg(v) => config.trampoline_reg = v,
        Conf::RelativeTargets(v) => config.relative_targets = v,
        Conf::RelBias(v) => config.rel_bias = v,
        Conf::Stat(v) => config.stat = v,
      }
    }
    // Alignment may be set after the header / 对齐可能在头大小之后设置
    if config.header_size % config.code_align != 0 {
      log::warn!(
        "HeaderSize {} not a multiple of {}",
        config.header_size,
        config.code_align
      );
      config.header_size = default::HEADER_SIZE;
    }
    config
  }
}

/// Default values
/// 默认值
pub mod default {
  use crate::Reg;

  /// Instruction fetch granularity on x64
  /// x64 取指粒度
  pub const CODE_ALIGN: usize = 32;

  pub const HEADER_SIZE: usize = 0;

  /// int3
  pub const POISON: u8 = 0xCC;

  /// r10, the x64 scratch register
  /// r10，x64 临时寄存器
  pub const TRAMPOLINE_REG: Reg = Reg(10);

  pub const RELATIVE_TARGETS: bool = true;

  /// rel32 is measured from the end of the field
  /// rel32 从字段末尾开始计算
  pub const REL_BIAS: u32 = 4;
}
