use crate::config::MAX_PROCESSES;
use crate::KernelError;

/// 固定六槽的进程号分配器，总是取编号最小的空槽。
#[derive(Debug, Default)]
pub struct PidAllocator {
    live: [bool; MAX_PROCESSES],
}

impl PidAllocator {
    pub const fn new() -> Self {
        Self {
            live: [false; MAX_PROCESSES],
        }
    }

    pub fn alloc(&mut self) -> Result<usize, KernelError> {
        let pid = self
            .live
            .iter()
            .position(|used| !used)
            .ok_or(KernelError::PidExhausted)?;
        self.live[pid] = true;
        Ok(pid)
    }

    /// 释放可以重入，释放空槽不算错。
    pub fn dealloc(&mut self, pid: usize) -> Result<(), KernelError> {
        let slot = self
            .live
            .get_mut(pid)
            .ok_or(KernelError::BadArgument)?;
        *slot = false;
        Ok(())
    }

    pub fn is_live(&self, pid: usize) -> bool {
        self.live.get(pid).copied().unwrap_or(false)
    }
}
