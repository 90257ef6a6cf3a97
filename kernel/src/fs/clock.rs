use core::hint;

use crate::config::TERMINAL_COUNT;
use crate::{Kernel, KernelError};

/// 虚拟化的实时时钟。硬件以固定最高频率走针，每个终端
/// 记下自己攒了多少个还没被 read 消费的节拍。
#[derive(Debug)]
pub struct Clock {
    rate: u32,
    pending: [u32; TERMINAL_COUNT],
}

impl Clock {
    pub const DEFAULT_RATE: u32 = 2;

    pub const fn new() -> Self {
        Self {
            rate: Self::DEFAULT_RATE,
            pending: [0; TERMINAL_COUNT],
        }
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// 打开即复位到默认 2Hz。
    pub(crate) fn open(&mut self) {
        self.rate = Self::DEFAULT_RATE;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel {
    /// 时钟中断协作者：给每个终端记一拍。
    pub fn clock_tick(&mut self) {
        let _mask = self.intr.mask();
        for pending in &mut self.clock.pending {
            *pending += 1;
        }
    }

    /// 阻塞到下一个节拍，总是返回 0。
    pub(crate) fn clock_read(&mut self) -> Result<usize, KernelError> {
        while self.clock.pending[self.sched.running] == 0 {
            hint::spin_loop();
        }

        let _mask = self.intr.mask();
        self.clock.pending[self.sched.running] -= 1;
        Ok(0)
    }

    /// 改频率：4 字节小端，2 到 1024 之间的 2 的幂。
    pub(crate) fn clock_write(&mut self, buf: &[u8]) -> Result<usize, KernelError> {
        let bytes: [u8; 4] = buf.try_into().map_err(|_| KernelError::BadArgument)?;
        let freq = u32::from_le_bytes(bytes);
        if !freq.is_power_of_two() || !(2..=1024).contains(&freq) {
            return Err(KernelError::BadArgument);
        }

        let _mask = self.intr.mask();
        self.clock.rate = freq;
        Ok(4)
    }
}
