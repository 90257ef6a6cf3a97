use crate::config::KERNEL_DS;

/// 任务状态段里特权级切换要用的两个字段。
/// 每次换进程都要把 esp0 指到该进程的内核栈顶。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tss {
    pub ss0: u16,
    pub esp0: usize,
}

impl Tss {
    pub const fn new() -> Self {
        Self {
            ss0: KERNEL_DS,
            esp0: 0,
        }
    }
}

impl Default for Tss {
    fn default() -> Self {
        Self::new()
    }
}
