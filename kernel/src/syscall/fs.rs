use flat_fs::FileKind;

use crate::config::MAX_DESCRIPTORS;
use crate::fs::{self, DeviceKind};
use crate::{Kernel, KernelError};

pub fn sys_read(
    kernel: &mut Kernel,
    fd: isize,
    buf: &mut [u8],
    nbytes: isize,
) -> Result<isize, KernelError> {
    let fd = descriptor_index(fd)?;
    // 1 号是只写的控制台
    if fd == 1 {
        return Err(KernelError::BadDescriptor);
    }
    let n = clamp_len(buf.len(), nbytes)?;

    let read = kernel.device_read(fd, &mut buf[..n])?;
    Ok(read as isize)
}

pub fn sys_write(
    kernel: &mut Kernel,
    fd: isize,
    buf: &[u8],
    nbytes: isize,
) -> Result<isize, KernelError> {
    let fd = descriptor_index(fd)?;
    // 0 号是只读的控制台
    if fd == 0 {
        return Err(KernelError::BadDescriptor);
    }
    let n = clamp_len(buf.len(), nbytes)?;

    let written = kernel.device_write(fd, &buf[..n])?;
    Ok(written as isize)
}

pub fn sys_open(kernel: &mut Kernel, name: &[u8]) -> Result<isize, KernelError> {
    let _mask = kernel.intr.mask();
    let entry = kernel.fs.lookup_by_name(name)?;

    let (device, inode) = match entry.kind {
        FileKind::Device => (DeviceKind::Clock, 0),
        FileKind::Directory => (DeviceKind::Directory, 0),
        FileKind::Regular => (DeviceKind::Regular, entry.inode),
    };

    // 先占槽位，设备自身的打开动作留到确定不会失败之后
    let pid = kernel.terminals[kernel.sched.running]
        .current
        .ok_or(KernelError::NoProcess)?;
    let fd = kernel.procs.get_mut(pid).fd_table.insert(device, inode)?;

    if device == DeviceKind::Clock {
        kernel.clock.open();
    }
    Ok(fd as isize)
}

pub fn sys_close(kernel: &mut Kernel, fd: isize) -> Result<isize, KernelError> {
    let _mask = kernel.intr.mask();
    let fd = descriptor_index(fd)?;
    let pid = kernel.terminals[kernel.sched.running]
        .current
        .ok_or(KernelError::NoProcess)?;
    let kind = kernel.procs.get_mut(pid).fd_table.remove(fd)?;
    fs::close_device(kind)?;
    Ok(0)
}

fn descriptor_index(fd: isize) -> Result<usize, KernelError> {
    usize::try_from(fd)
        .ok()
        .filter(|fd| *fd < MAX_DESCRIPTORS)
        .ok_or(KernelError::BadDescriptor)
}

fn clamp_len(buf_len: usize, nbytes: isize) -> Result<usize, KernelError> {
    let n = usize::try_from(nbytes).map_err(|_| KernelError::BadArgument)?;
    Ok(n.min(buf_len))
}
