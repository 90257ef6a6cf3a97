//! 地址的抽象

use crate::config::PAGE_SIZE;

use derive_more::{From, Into};

/// 物理地址
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, From, Into)]
#[repr(transparent)]
pub struct PhysAddr(pub usize);

/// 虚拟地址
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, From, Into)]
#[repr(transparent)]
pub struct VirtAddr(pub usize);

impl core::ops::Add<usize> for PhysAddr {
    type Output = Self;

    fn add(self, rhs: usize) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl core::ops::Add<usize> for VirtAddr {
    type Output = Self;

    fn add(self, rhs: usize) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl PhysAddr {
    /// 所在 4KiB 页的页框号
    pub const fn frame(self) -> usize {
        self.0 / PAGE_SIZE
    }
}

impl VirtAddr {
    /// 页目录索引，高 10 位
    pub const fn dir_index(self) -> usize {
        self.0 >> 22
    }

    /// 页表索引，中间 10 位
    pub const fn table_index(self) -> usize {
        (self.0 >> 12) & 0x3FF
    }

    pub const fn page_offset(self) -> usize {
        self.0 & (PAGE_SIZE - 1)
    }
}
