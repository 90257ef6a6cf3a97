//! 磁盘布局（位精确）：
//! - 块 0 为启动块：三个 `u32` 计数（目录项/索引节点/数据块）、
//!   52 字节保留区、至多 63 个 64 字节目录项；
//! - 块 `1 + i` 为索引节点 `i`：`u32` 字节长度，随后至多 1023 个
//!   `u32` 数据块编号；
//! - 块 `1 + 节点数 + d` 为数据块 `d`，原始 4096 字节。
//!
//! 所有整数为小端。

mod dir_entry;

pub use self::dir_entry::{DirEntry, FileKind};

/// 启动块内第一个目录项的字节偏移（计数 12 字节 + 保留 52 字节）
pub(crate) const DIR_ENTRIES_OFFSET: usize = 64;
/// 目录项内类型字段的偏移
pub(crate) const KIND_OFFSET: usize = 32;
/// 目录项内索引节点编号的偏移
pub(crate) const INODE_OFFSET: usize = 36;

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}
