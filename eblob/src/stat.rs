//! Blob statistics
//! 代码块统计

use std::fmt;

use crate::EmbeddedData;

/// Size report over a blob / 代码块大小报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stat {
  pub total_size: usize,
  pub metadata_size: usize,
  pub instruction_size: usize,
  pub padding: usize,
  pub count: usize,
  pub p50: u32,
  pub p75: u32,
  pub p90: u32,
  pub p99: u32,
}

/// Value at index floor(len * p) of sorted `sizes`
/// 已排序 `sizes` 中下标 floor(len * p) 处的值
pub fn percentile(sizes: &[u32], p: f64) -> u32 {
  if sizes.is_empty() {
    return 0;
  }
  let i = (sizes.len() as f64 * p) as usize;
  sizes[i.min(sizes.len() - 1)]
}

impl Stat {
  pub fn new(d: &EmbeddedData) -> Self {
    let count = d.count();
    let mut sizes: Vec<u32> = (0..count).map(|i| d.instruction_size(i)).collect();
    let instruction_size = sizes.iter().map(|&s| s as usize).sum();
    sizes.sort_unstable();
    Self {
      total_size: d.code_size() + d.metadata_size(),
      metadata_size: d.metadata_size(),
      instruction_size,
      padding: d.code_size() - instruction_size,
      count,
      p50: percentile(&sizes, 0.5),
      p75: percentile(&sizes, 0.75),
      p90: percentile(&sizes, 0.90),
      p99: percentile(&sizes, 0.99),
    }
  }
}

impl fmt::Display for Stat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "EmbeddedData:")?;
    writeln!(f, "  Total size:                         {}", self.total_size)?;
    writeln!(f, "  Metadata size:                      {}", self.metadata_size)?;
    writeln!(f, "  Instruction size:                   {}", self.instruction_size)?;
    writeln!(f, "  Padding:                            {}", self.padding)?;
    writeln!(f, "  Embedded builtin count:             {}", self.count)?;
    writeln!(f, "  Instruction size (50th percentile): {}", self.p50)?;
    writeln!(f, "  Instruction size (75th percentile): {}", self.p75)?;
    writeln!(f, "  Instruction size (90th percentile): {}", self.p90)?;
    write!(f, "  Instruction size (99th percentile): {}", self.p99)
  }
}
