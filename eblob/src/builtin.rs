//! Builtin descriptors handed over by the code generator
//! 代码生成器交付的内置例程描述

/// Machine register number / 机器寄存器编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(pub u8);

/// Builtin kind / 内置例程类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
  /// C++ builtin 调用 C++ 的例程
  Cpp,
  /// Stub with custom call descriptor 自定义调用描述符桩
  Tfc,
  /// Handler 处理器
  Tfh,
  /// JS linkage JS 调用约定
  Tfj,
  /// Stub linkage 桩调用约定
  Tfs,
  /// Bytecode handler 字节码处理器
  Bch,
  /// Hand-written assembly 手写汇编
  Asm,
}

impl Kind {
  /// Kinds that may be reached through a trampoline
  /// 可能经由跳板调用的类别
  #[inline]
  pub const fn uses_trampoline(self) -> bool {
    !matches!(self, Kind::Bch | Kind::Asm)
  }
}

/// Calling convention descriptor / 调用约定描述符
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallDesc {
  pub context: Option<Reg>,
  pub params: Vec<Reg>,
}

impl CallDesc {
  pub fn new(context: Option<Reg>, params: impl Into<Vec<Reg>>) -> Self {
    Self {
      context,
      params: params.into(),
    }
  }

  /// Whether any register slot is `reg` / 是否有寄存器槽位等于 `reg`
  pub fn uses(&self, reg: Reg) -> bool {
    self.context == Some(reg) || self.params.contains(&reg)
  }
}

/// One compiled routine as produced by the code generator
/// 代码生成器产出的单个已编译例程
#[derive(Debug, Clone)]
pub struct Builtin<'a> {
  pub name: &'a str,
  pub kind: Kind,
  /// Instruction bytes 指令字节
  pub code: &'a [u8],
  /// Instruction start on the managed heap 托管堆上的指令起始地址
  pub heap_start: usize,
  pub desc: CallDesc,
  pub isolate_independent: bool,
}
