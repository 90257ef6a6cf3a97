use core::array;

use flat_fs::FlatFs;

use crate::config::{BIG_PAGE_SIZE, LOAD_OFFSET, MAX_PROCESSES, USER_VIRT_BASE};
use crate::KernelError;

use super::address::VirtAddr;

/// 六个进程各自的 4MiB 物理窗口。程序映像整体装载到窗口内
/// 偏移 [`LOAD_OFFSET`] 处，即虚拟地址 0x804_8000。
pub struct UserWindows {
    frames: [Box<[u8]>; MAX_PROCESSES],
}

impl UserWindows {
    pub fn new() -> Self {
        Self {
            frames: array::from_fn(|_| vec![0u8; BIG_PAGE_SIZE].into_boxed_slice()),
        }
    }

    /// 把可执行文件原样拷进 pid 的窗口，返回装载的字节数。
    /// 调用方已验证过索引节点与文件大小。
    pub fn load(&mut self, pid: usize, fs: &FlatFs, inode: u32) -> usize {
        let window = &mut self.frames[pid];
        window[LOAD_OFFSET..].fill(0);
        fs.read_at(inode, 0, &mut window[LOAD_OFFSET..]).unwrap_or(0)
    }

    fn offset_of(va: VirtAddr, len: usize) -> Result<usize, KernelError> {
        let offset = va
            .0
            .checked_sub(USER_VIRT_BASE)
            .ok_or(KernelError::BadAddress)?;
        if offset + len > BIG_PAGE_SIZE {
            return Err(KernelError::BadAddress);
        }
        Ok(offset)
    }

    /// 以进程的视角往其窗口写一个 u32。
    pub fn write_u32(&mut self, pid: usize, va: VirtAddr, value: u32) -> Result<(), KernelError> {
        let offset = Self::offset_of(va, 4)?;
        self.frames[pid][offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn read_u32(&self, pid: usize, va: VirtAddr) -> Result<u32, KernelError> {
        let offset = Self::offset_of(va, 4)?;
        let bytes = &self.frames[pid][offset..offset + 4];
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn window(&self, pid: usize) -> &[u8] {
        &self.frames[pid]
    }

    pub fn window_mut(&mut self, pid: usize) -> &mut [u8] {
        &mut self.frames[pid]
    }
}

impl Default for UserWindows {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::USER_VIDEO_BASE;

    #[test]
    fn window_round_trip() {
        let mut windows = UserWindows::new();
        let va = VirtAddr(USER_VIRT_BASE + LOAD_OFFSET);
        windows.write_u32(2, va, 0xDEAD_BEEF).unwrap();
        assert_eq!(windows.read_u32(2, va).unwrap(), 0xDEAD_BEEF);
        // 其它窗口不受影响
        assert_eq!(windows.read_u32(3, va).unwrap(), 0);
    }

    #[test]
    fn rejects_out_of_window_addresses() {
        let mut windows = UserWindows::new();
        assert_eq!(
            windows.write_u32(0, VirtAddr(USER_VIRT_BASE - 4), 1),
            Err(KernelError::BadAddress)
        );
        assert_eq!(
            windows.write_u32(0, VirtAddr(USER_VIDEO_BASE - 2), 1),
            Err(KernelError::BadAddress)
        );
        assert_eq!(
            windows.read_u32(0, VirtAddr(USER_VIDEO_BASE)),
            Err(KernelError::BadAddress)
        );
    }
}
