//! 常量定义 Constants
//!
//! Metadata layout 元数据布局:
//! `[isolate_hash: u64][blob_hash: u64][N x {offset: u32, len: u32}]`

/// 哈希字段宽度 Hash field width
pub const HASH_SIZE: usize = 8;

/// 运行时状态哈希偏移 Isolate state hash offset
pub const ISOLATE_HASH_OFFSET: usize = 0;

/// 自身哈希偏移 Blob self-hash offset
pub const BLOB_HASH_OFFSET: usize = ISOLATE_HASH_OFFSET + HASH_SIZE;

/// 描述符表偏移 Descriptor table offset
pub const TABLE_OFFSET: usize = BLOB_HASH_OFFSET + HASH_SIZE;

/// 单个描述符大小 Descriptor entry size
pub const DESC_SIZE: usize = 8;

/// 重定位字段宽度 Relative displacement width (rel32)
pub const REL_SIZE: usize = 4;
