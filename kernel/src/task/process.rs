use core::array;

use crate::config::{ARG_CAPACITY, MAX_PROCESSES};
use crate::fs::FdTable;
use crate::KernelError;

use super::pid::PidAllocator;

/// 一次内核栈切换需要保存的寄存器。调度与 halt 返回父进程
/// 都经由这里，而不是裸跳转。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    pub sp: usize,
    pub fp: usize,
}

impl Context {
    pub const fn at_stack_top(top: usize) -> Self {
        Self { sp: top, fp: top }
    }
}

/// execute 命令行里程序名之后的参数字节，getargs 取走时
/// 补一个结尾零。
#[derive(Debug, Clone, Copy)]
pub struct ArgBuffer {
    bytes: [u8; ARG_CAPACITY],
    len: usize,
}

impl ArgBuffer {
    pub const fn empty() -> Self {
        Self {
            bytes: [0; ARG_CAPACITY],
            len: 0,
        }
    }

    /// 调用方保证 `args` 不超过 127 字节。
    pub fn set(&mut self, args: &[u8]) {
        self.bytes[..args.len()].copy_from_slice(args);
        self.len = args.len();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// 进程控制块。`saved` 是 execute 陷入点的上下文，halt 回到它；
/// `resched` 是最近一次被调度换下时的上下文。
#[derive(Debug)]
pub struct ProcessControlBlock {
    pub pid: usize,
    pub parent: Option<usize>,
    pub fd_table: FdTable,
    pub saved: Context,
    pub resched: Context,
    pub args: ArgBuffer,
    pub active: bool,
    /// 子进程 halt 时存入，父进程恢复运行时取走作为 execute 的返回值
    pub completion: Option<i32>,
}

impl ProcessControlBlock {
    fn vacant(pid: usize) -> Self {
        Self {
            pid,
            parent: None,
            fd_table: FdTable::new(),
            saved: Context::default(),
            resched: Context::default(),
            args: ArgBuffer::empty(),
            active: false,
            completion: None,
        }
    }
}

/// 全部六个槽位常驻，分配即复位。
pub struct ProcessTable {
    pids: PidAllocator,
    pcbs: [ProcessControlBlock; MAX_PROCESSES],
}

impl ProcessTable {
    pub fn new() -> Self {
        Self {
            pids: PidAllocator::new(),
            pcbs: array::from_fn(ProcessControlBlock::vacant),
        }
    }

    pub fn allocate_pid(&mut self) -> Result<usize, KernelError> {
        self.pids.alloc()
    }

    pub fn release_pid(&mut self, pid: usize) -> Result<(), KernelError> {
        self.pids.dealloc(pid)?;
        self.pcbs[pid].active = false;
        Ok(())
    }

    /// 把槽位复位成一个刚 execute 出来的进程。
    pub fn init_pcb(&mut self, pid: usize) -> &mut ProcessControlBlock {
        self.pcbs[pid] = ProcessControlBlock::vacant(pid);
        self.pcbs[pid].active = true;
        &mut self.pcbs[pid]
    }

    pub fn get(&self, pid: usize) -> &ProcessControlBlock {
        &self.pcbs[pid]
    }

    pub fn get_mut(&mut self, pid: usize) -> &mut ProcessControlBlock {
        &mut self.pcbs[pid]
    }

    pub fn live(&self, pid: usize) -> bool {
        self.pids.is_live(pid)
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_pcb_resets_slot() {
        let mut procs = ProcessTable::new();
        let pid = procs.allocate_pid().unwrap();
        {
            let pcb = procs.init_pcb(pid);
            pcb.args.set(b"stale");
            pcb.completion = Some(42);
        }
        procs.release_pid(pid).unwrap();

        let pid = procs.allocate_pid().unwrap();
        let pcb = procs.init_pcb(pid);
        assert!(pcb.args.is_empty());
        assert_eq!(pcb.completion, None);
        assert!(pcb.active);
    }

    #[test]
    fn fresh_pcb_has_console_descriptors() {
        let mut procs = ProcessTable::new();
        let pid = procs.allocate_pid().unwrap();
        let pcb = procs.init_pcb(pid);
        assert!(pcb.fd_table.get(0).is_ok());
        assert!(pcb.fd_table.get(1).is_ok());
        assert!(pcb.fd_table.get(2).is_err());
    }
}
