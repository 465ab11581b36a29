#![cfg_attr(docsrs, feature(doc_cfg))]

//! Relocatable blob of precompiled builtins
//! 预编译内置例程的可重定位代码块

mod blob;
mod builtin;
mod checksum;
mod conf;
pub mod consts;
mod data;
mod desc;
mod error;
mod off_heap;
mod pc;
pub mod reloc;
mod slot;
mod stat;
mod validate;

pub use blob::{Blob, layout};
pub use builtin::{Builtin, CallDesc, Kind, Reg};
pub use checksum::{blob_hash, isolate_hash_of};
pub use conf::{Conf, Config, default};
pub use data::EmbeddedData;
pub use desc::Desc;
pub use error::{Error, Reason, Result, Unsafe};
pub use off_heap::OffHeap;
pub use reloc::{ModeMask, Reloc, RelocMode, RelocScan};
pub use slot::{Embedded, Slot};
pub use stat::{Stat, percentile};
pub use validate::{aliases_trampoline_reg, validate};
