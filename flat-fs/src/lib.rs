#![no_std]

extern crate alloc;

/* flat-fs 的整体架构，自上而下 */

// 镜像层：持有整个只读镜像，提供查名、按序号取目录项、读文件内容
mod image;

// 磁盘数据结构层：启动块、目录项、索引节点的布局解码
mod layout;

mod error;

pub use self::{
    error::FsError,
    image::FlatFs,
    layout::{DirEntry, FileKind},
};

/// 块大小，启动块/索引节点块/数据块统一
pub const BLOCK_SIZE: usize = 4096;
/// 文件名长度上限（满 32 字节时不含结尾零）
pub const NAME_LEN: usize = 32;
/// 启动块可容纳的目录项数
pub const DIR_CAPACITY: usize = 63;
/// 单个索引节点可编号的数据块数
pub const INODE_BLOCK_CAPACITY: usize = 1023;
/// 目录项大小
pub const DIR_ENTRY_SIZE: usize = 64;
