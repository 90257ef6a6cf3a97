use crate::config::{kernel_stack_top, KERNEL_DS, TERMINAL_COUNT};
use crate::kernel::video_frame;
use crate::Kernel;

/// 轮转调度的全部状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedState {
    /// 时间片当前属于哪个终端
    pub running: usize,
    /// 哪个终端在屏
    pub displayed: usize,
    /// 每个时钟中断结束时递增，无论是否切换
    pub eoi: u64,
}

/// 一次时钟中断的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// 没有别的活跃终端，时间片原地续期
    Idle,
    Switched { from: usize, to: usize },
}

impl Kernel {
    /// 时钟中断：从运行终端起环形找下一个活跃终端，换上其
    /// 当前进程。单终端时整个处理只剩一次 EOI。
    pub fn timer_tick(&mut self) -> Tick {
        let _mask = self.intr.mask();

        let from = self.sched.running;
        let next = self.next_active_terminal(from);
        let Some(to) = next else {
            self.sched.eoi += 1;
            return Tick::Idle;
        };

        // unwrap 不会失败：活跃终端必有当前进程
        let out_pid = self.terminals[from].current;
        let in_pid = self.terminals[to].current.unwrap();

        self.paging.map_process(in_pid);
        if let Some(pid) = out_pid {
            self.procs.get_mut(pid).resched = self.cpu;
        }
        self.sched.running = to;

        // 后台进程的 vidmap 页跟着切到后备帧
        let frame = video_frame(&self.sched);
        self.paging.map_video(frame);

        self.tss.ss0 = KERNEL_DS;
        self.tss.esp0 = kernel_stack_top(in_pid);
        self.cpu = self.procs.get(in_pid).resched;

        self.sched.eoi += 1;
        Tick::Switched { from, to }
    }

    /// 环形扫描 `from` 之后的下一个有进程的终端，不含 `from` 自身。
    fn next_active_terminal(&self, from: usize) -> Option<usize> {
        (1..TERMINAL_COUNT)
            .map(|step| (from + step) % TERMINAL_COUNT)
            .find(|&tid| self.terminals[tid].current.is_some())
    }
}
