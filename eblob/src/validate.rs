//! Pre-layout safety checks
//! 布局前安全检查

use crate::{Builtin, Config, Error, Reason, Result, Unsafe};

/// Whether the calling convention of `b` touches the trampoline register
/// `b` 的调用约定是否占用跳板寄存器
pub fn aliases_trampoline_reg(b: &Builtin, config: &Config) -> bool {
  b.kind.uses_trampoline() && b.desc.uses(config.trampoline_reg)
}

/// Check every builtin, collecting all offenders before failing
/// 检查全部例程，收集所有违规项后再失败
pub fn validate(builtin_li: &[Builtin], config: &Config) -> Result<()> {
  let mut unsafe_li = Vec::new();
  for (index, b) in builtin_li.iter().enumerate() {
    if !b.isolate_independent {
      unsafe_li.push(Unsafe {
        index,
        name: b.name.to_owned(),
        reason: Reason::IsolateDependent,
      });
    }
    if aliases_trampoline_reg(b, config) {
      unsafe_li.push(Unsafe {
        index,
        name: b.name.to_owned(),
        reason: Reason::AliasesTrampolineReg,
      });
    }
  }
  if unsafe_li.is_empty() {
    return Ok(());
  }
  for u in &unsafe_li {
    log::error!("{u}");
  }
  Err(Error::Unsafe(unsafe_li))
}
