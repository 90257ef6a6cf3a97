//! 镜像层：整个文件系统镜像常驻内存，启动时装入一次，之后只读。

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::FsError;
use crate::layout::{read_u32, DirEntry, DIR_ENTRIES_OFFSET};
use crate::{BLOCK_SIZE, DIR_CAPACITY, DIR_ENTRY_SIZE, INODE_BLOCK_CAPACITY, NAME_LEN};

pub struct FlatFs {
    image: Box<[u8]>,
    dir_entries: u32,
    inodes: u32,
    data_blocks: u32,
}

impl FlatFs {
    /// 校验并接管一份镜像。
    /// 镜像必须装得下启动块声明的索引节点区和数据区，
    /// 目录项计数不得超过启动块容量。
    pub fn new(image: Vec<u8>) -> Result<Self, FsError> {
        if image.len() < BLOCK_SIZE {
            return Err(FsError::Corrupted);
        }

        let dir_entries = read_u32(&image, 0);
        let inodes = read_u32(&image, 4);
        let data_blocks = read_u32(&image, 8);

        if dir_entries as usize > DIR_CAPACITY {
            return Err(FsError::Corrupted);
        }
        let blocks = 1 + inodes as usize + data_blocks as usize;
        if image.len() < blocks * BLOCK_SIZE {
            return Err(FsError::Corrupted);
        }

        Ok(Self {
            image: image.into_boxed_slice(),
            dir_entries,
            inodes,
            data_blocks,
        })
    }

    #[inline]
    pub fn dir_entry_count(&self) -> usize {
        self.dir_entries as usize
    }

    #[inline]
    pub fn inode_count(&self) -> usize {
        self.inodes as usize
    }

    #[inline]
    pub fn data_block_count(&self) -> usize {
        self.data_blocks as usize
    }

    /// 按名字解析目录项。
    /// 逐字节比较，任一侧先到零字节即告匹配；首个匹配获胜。
    /// 超过 32 字节的名字不可能存在，直接按未找到处理。
    pub fn lookup_by_name(&self, name: &[u8]) -> Result<DirEntry, FsError> {
        if name.len() > NAME_LEN {
            return Err(FsError::NotFound);
        }

        for i in 0..self.dir_entry_count() {
            let entry = self.dir_entry(i)?;
            if name_matches(name, &entry.name) {
                return Ok(entry);
            }
        }

        Err(FsError::NotFound)
    }

    /// 按启动块内的序号取目录项
    pub fn lookup_by_index(&self, index: usize) -> Result<DirEntry, FsError> {
        if index >= self.dir_entry_count() {
            return Err(FsError::OutOfRange);
        }
        self.dir_entry(index)
    }

    /// 从指定位置（字节偏移）读出文件内容填充 `buf`，返回读到的字节数。
    ///
    /// 读取量被钳制到文件剩余长度，偏移在文件末尾及以后读到 0 字节。
    /// 若途中遇到越界的数据块编号，放弃剩余部分并返回已读字节数
    /// —— 短读而非报错，维持既有镜像的兼容行为。
    pub fn read_at(&self, inode: u32, offset: usize, buf: &mut [u8]) -> Result<usize, FsError> {
        if inode >= self.inodes {
            return Err(FsError::OutOfRange);
        }

        let length = self.length(inode) as usize;
        if offset >= length {
            return Ok(0);
        }

        let mut start = offset;
        // 长度字段撒谎也不越过索引节点块能编号的范围，多出的部分按短读收场
        let end = (offset + buf.len())
            .min(length)
            .min(INODE_BLOCK_CAPACITY * BLOCK_SIZE);

        let mut read_size = 0;
        while start < end {
            // 当前块在文件内的逻辑索引
            let block_index = start / BLOCK_SIZE;
            let current_block_end = ((block_index + 1) * BLOCK_SIZE).min(end);
            let block_read_size = current_block_end - start;

            let block_id = self.inode_block_id(inode, block_index);
            if block_id >= self.data_blocks {
                log::warn!(
                    "inode {inode}: data block index {block_id} out of range, truncating read"
                );
                return Ok(read_size);
            }

            let data = self.data_block(block_id);
            let src = &data[start % BLOCK_SIZE..start % BLOCK_SIZE + block_read_size];
            buf[read_size..read_size + block_read_size].copy_from_slice(src);

            read_size += block_read_size;
            start = current_block_end;
        }

        Ok(read_size)
    }

    /// 索引节点记录的字节长度。直接的字段读取，编号须已经调用方验证。
    pub fn length(&self, inode: u32) -> u32 {
        assert!(inode < self.inodes, "inode {inode} out of range");
        read_u32(self.block(1 + inode as usize), 0)
    }

    #[inline]
    fn block(&self, id: usize) -> &[u8] {
        &self.image[id * BLOCK_SIZE..(id + 1) * BLOCK_SIZE]
    }

    #[inline]
    fn data_block(&self, id: u32) -> &[u8] {
        self.block(1 + self.inodes as usize + id as usize)
    }

    /// 索引节点中第 `block_index` 个数据块的编号
    fn inode_block_id(&self, inode: u32, block_index: usize) -> u32 {
        read_u32(self.block(1 + inode as usize), 4 + block_index * 4)
    }

    fn dir_entry(&self, index: usize) -> Result<DirEntry, FsError> {
        let offset = DIR_ENTRIES_OFFSET + index * DIR_ENTRY_SIZE;
        DirEntry::parse(&self.block(0)[offset..offset + DIR_ENTRY_SIZE])
    }
}

fn name_matches(wanted: &[u8], stored: &[u8; NAME_LEN]) -> bool {
    for j in 0..NAME_LEN {
        let w = wanted.get(j).copied().unwrap_or(0);
        let s = stored[j];
        if w != s {
            return false;
        }
        if w == 0 {
            return true;
        }
    }
    true
}
