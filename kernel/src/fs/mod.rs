//! 按描述符分发的文件表面：控制台、时钟、目录与普通文件。
//!
//! 设备没有动态注册，全部种类收在 [`DeviceKind`] 里，读写按
//! 种类直接分发。0 号与 1 号描述符固定绑到控制台。

mod clock;
mod console;
mod inode;

pub use self::clock::Clock;

use crate::config::MAX_DESCRIPTORS;
use crate::{Kernel, KernelError};

/// 描述符背后的设备种类。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceKind {
    #[default]
    Unused,
    Console,
    Clock,
    Directory,
    Regular,
}

/// 一个打开的描述符。
#[derive(Debug, Clone, Copy)]
pub struct FileDescriptor {
    pub device: DeviceKind,
    pub inode: u32,
    /// 普通文件按字节计，目录按目录项计
    pub offset: usize,
    pub in_use: bool,
}

impl FileDescriptor {
    pub const UNUSED: Self = Self {
        device: DeviceKind::Unused,
        inode: 0,
        offset: 0,
        in_use: false,
    };
}

/// 每进程八个槽位，0/1 固定是控制台，动态打开从 2 号起。
#[derive(Debug, Clone, Copy)]
pub struct FdTable([FileDescriptor; MAX_DESCRIPTORS]);

impl FdTable {
    pub fn new() -> Self {
        let mut table = [FileDescriptor::UNUSED; MAX_DESCRIPTORS];
        for fd in &mut table[..2] {
            fd.device = DeviceKind::Console;
            fd.in_use = true;
        }
        Self(table)
    }

    pub fn get(&self, fd: usize) -> Result<&FileDescriptor, KernelError> {
        self.0
            .get(fd)
            .filter(|d| d.in_use)
            .ok_or(KernelError::BadDescriptor)
    }

    pub fn get_mut(&mut self, fd: usize) -> Result<&mut FileDescriptor, KernelError> {
        self.0
            .get_mut(fd)
            .filter(|d| d.in_use)
            .ok_or(KernelError::BadDescriptor)
    }

    /// 占用编号最小的空槽。
    pub fn insert(&mut self, device: DeviceKind, inode: u32) -> Result<usize, KernelError> {
        let fd = self.0[2..]
            .iter()
            .position(|d| !d.in_use)
            .map(|i| i + 2)
            .ok_or(KernelError::DescriptorExhausted)?;
        self.0[fd] = FileDescriptor {
            device,
            inode,
            offset: 0,
            in_use: true,
        };
        Ok(fd)
    }

    /// 释放一个动态槽位，0/1 不可关闭。
    pub fn remove(&mut self, fd: usize) -> Result<DeviceKind, KernelError> {
        if !(2..MAX_DESCRIPTORS).contains(&fd) || !self.0[fd].in_use {
            return Err(KernelError::BadDescriptor);
        }
        let kind = self.0[fd].device;
        self.0[fd] = FileDescriptor::UNUSED;
        Ok(kind)
    }
}

impl Default for FdTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    /// read 系统调用的设备分发。
    pub(crate) fn device_read(&mut self, fd: usize, buf: &mut [u8]) -> Result<usize, KernelError> {
        let descriptor = *self.current_pcb()?.fd_table.get(fd)?;
        match descriptor.device {
            DeviceKind::Console => self.console_read(buf),
            DeviceKind::Clock => self.clock_read(),
            DeviceKind::Directory => self.dir_read(fd, buf),
            DeviceKind::Regular => self.file_read(fd, buf),
            DeviceKind::Unused => Err(KernelError::BadDescriptor),
        }
    }

    /// write 系统调用的设备分发。文件系统只读，普通文件与目录拒绝写。
    pub(crate) fn device_write(&mut self, fd: usize, buf: &[u8]) -> Result<usize, KernelError> {
        let descriptor = *self.current_pcb()?.fd_table.get(fd)?;
        match descriptor.device {
            DeviceKind::Console => self.console_write(buf),
            DeviceKind::Clock => self.clock_write(buf),
            DeviceKind::Directory | DeviceKind::Regular => Err(KernelError::Unsupported),
            DeviceKind::Unused => Err(KernelError::BadDescriptor),
        }
    }
}

/// 关闭时的按种类收尾。现有设备关闭都无事可做。
pub(crate) fn close_device(kind: DeviceKind) -> Result<(), KernelError> {
    match kind {
        DeviceKind::Console
        | DeviceKind::Clock
        | DeviceKind::Directory
        | DeviceKind::Regular => Ok(()),
        DeviceKind::Unused => Err(KernelError::BadDescriptor),
    }
}
