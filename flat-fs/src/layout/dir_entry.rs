use crate::error::FsError;
use crate::NAME_LEN;

use super::{read_u32, INODE_OFFSET, KIND_OFFSET};

/// 启动块中的一个目录项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    /// 文件名，满 32 字节时没有结尾零
    pub name: [u8; NAME_LEN],
    pub kind: FileKind,
    /// 索引节点编号，仅普通文件有意义
    pub inode: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// 字符设备（时钟）
    Device,
    Directory,
    Regular,
}

impl FileKind {
    pub fn from_raw(raw: u32) -> Result<Self, FsError> {
        match raw {
            0 => Ok(Self::Device),
            1 => Ok(Self::Directory),
            2 => Ok(Self::Regular),
            _ => Err(FsError::UnknownKind),
        }
    }
}

impl DirEntry {
    /// 从启动块中的 64 字节原始记录解码
    pub(crate) fn parse(raw: &[u8]) -> Result<Self, FsError> {
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&raw[..NAME_LEN]);

        Ok(Self {
            name,
            kind: FileKind::from_raw(read_u32(raw, KIND_OFFSET))?,
            inode: read_u32(raw, INODE_OFFSET),
        })
    }

    /// 文件名的有效部分（到第一个零字节为止）
    pub fn name_bytes(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_LEN);
        &self.name[..end]
    }
}
