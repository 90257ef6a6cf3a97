use core::array;

use flat_fs::FlatFs;

use crate::config::{BACKUP_FRAME_BASE, FAULT_STATUS, PAGE_SIZE, TERMINAL_COUNT, VIDEO_FRAME};
use crate::fs::Clock;
use crate::memory::{Paging, PhysAddr, UserWindows, VideoMem};
use crate::sync::IntrState;
use crate::syscall;
use crate::task::{Context, ProcessControlBlock, ProcessTable, SchedState, Terminal, Tss};
use crate::KernelError;

use log::warn;

/// 一次离开内核的控制转移。陷入分发协作者据此执行真正的
/// 特权级切换：iret 进用户程序，或者回到父进程的陷入点。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// 进入 pid 的用户程序入口
    User {
        pid: usize,
        entry: crate::memory::VirtAddr,
    },
    /// 回到父进程，`status` 是其 execute 调用的返回值
    Parent { pid: usize, status: i32 },
}

/// 整个内核核心：文件系统镜像、分页、进程表、三个终端与
/// 调度状态。协作者（陷入分发、键盘、时钟）经公有方法进入。
pub struct Kernel {
    pub(crate) fs: FlatFs,
    pub(crate) paging: Paging,
    pub(crate) windows: UserWindows,
    pub(crate) video: VideoMem,
    pub(crate) procs: ProcessTable,
    pub(crate) terminals: [Terminal; TERMINAL_COUNT],
    pub(crate) sched: SchedState,
    pub(crate) clock: Clock,
    pub(crate) tss: Tss,
    /// 当前栈切换上下文，调度与 execute/halt 都经由它
    pub(crate) cpu: Context,
    pub(crate) intr: IntrState,
}

impl Kernel {
    /// 以一份文件系统镜像冷启动。终端 0 在屏。
    pub fn new(image: Vec<u8>) -> Result<Self, KernelError> {
        crate::logging::init();

        let fs = FlatFs::new(image)?;
        let terminals: [Terminal; TERMINAL_COUNT] = array::from_fn(Terminal::new);

        let mut video = VideoMem::new();
        video.clear(0, terminals[0].attr);
        for (tid, terminal) in terminals.iter().enumerate() {
            video.clear(1 + tid, terminal.attr);
        }

        Ok(Self {
            fs,
            paging: Paging::new(),
            windows: UserWindows::new(),
            video,
            procs: ProcessTable::new(),
            terminals,
            sched: SchedState {
                running: 0,
                displayed: 0,
                eoi: 0,
            },
            clock: Clock::new(),
            tss: Tss::new(),
            cpu: Context::default(),
            intr: IntrState::new(),
        })
    }

    /// 在终端 0 上拉起第一个 shell。
    pub fn boot(&mut self) -> Result<Transfer, KernelError> {
        syscall::sys_execute(self, b"shell")
    }

    pub fn current_pid(&self) -> Option<usize> {
        self.terminals[self.sched.running].current
    }

    pub(crate) fn current_pcb(&self) -> Result<&ProcessControlBlock, KernelError> {
        let pid = self.current_pid().ok_or(KernelError::NoProcess)?;
        Ok(self.procs.get(pid))
    }

    pub(crate) fn current_pcb_mut(&mut self) -> Result<&mut ProcessControlBlock, KernelError> {
        let pid = self.current_pid().ok_or(KernelError::NoProcess)?;
        Ok(self.procs.get_mut(pid))
    }

    /// 异常协作者：当前进程因故障被终结，状态值 256 送达父进程。
    pub fn fault_terminate(&mut self) -> Result<Transfer, KernelError> {
        warn!(
            "fault, terminating pid {:?}",
            self.current_pid()
        );
        syscall::sys_halt(self, FAULT_STATUS)
    }

    /// 键盘协作者：Alt+Fn 切换在屏终端。
    ///
    /// 首次切到一个终端会在其上启动 shell 并转移控制权，
    /// 此时返回 `Some(Transfer)`；其余情况只做帧搬运。
    pub fn switch_display(
        &mut self,
        tid: usize,
    ) -> Result<Option<Transfer>, KernelError> {
        if tid >= TERMINAL_COUNT {
            return Err(KernelError::BadArgument);
        }
        if tid == self.sched.displayed {
            return Ok(None);
        }

        {
            let _mask = self.intr.mask();

            let old = self.sched.displayed;
            self.video.copy_frame(0, 1 + old);
            self.video.copy_frame(1 + tid, 0);
            self.sched.displayed = tid;

            if self.terminals[tid].active {
                // 在屏归属变了，运行进程的视频页可能要换帧
                let frame = video_frame(&self.sched);
                self.paging.map_video(frame);
                return Ok(None);
            }

            // 新终端第一次亮相：把时间片挪过去，给它一个 shell
            if let Some(pid) = self.terminals[self.sched.running].current {
                self.procs.get_mut(pid).resched = self.cpu;
            }
            self.sched.running = tid;

            // 视频页同样立刻跟上新的运行终端
            let frame = video_frame(&self.sched);
            self.paging.map_video(frame);
        }

        syscall::sys_execute(self, b"shell").map(Some)
    }

    /// 子进程 halt 之后取走完成状态，构造回到父进程的转移。
    pub(crate) fn resume_parent(&mut self, parent: usize) -> Result<Transfer, KernelError> {
        let status = self
            .procs
            .get_mut(parent)
            .completion
            .take()
            .ok_or(KernelError::NoProcess)?;
        Ok(Transfer::Parent {
            pid: parent,
            status,
        })
    }

    // 以下只读视图供协作者与测试检查硬件侧状态

    pub fn paging(&self) -> &Paging {
        &self.paging
    }

    pub fn windows(&self) -> &UserWindows {
        &self.windows
    }

    pub fn video(&self) -> &VideoMem {
        &self.video
    }

    pub fn tss(&self) -> &Tss {
        &self.tss
    }

    pub fn scheduler(&self) -> &SchedState {
        &self.sched
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn terminal(&self, tid: usize) -> &Terminal {
        &self.terminals[tid]
    }

    /// 存活进程的控制块。
    pub fn pcb(&self, pid: usize) -> Option<&ProcessControlBlock> {
        self.procs.live(pid).then(|| self.procs.get(pid))
    }

    pub fn pid_live(&self, pid: usize) -> bool {
        self.procs.live(pid)
    }
}

/// 运行终端此刻应该看到的视频帧：在屏用显示帧，后台用自己的后备帧。
pub(crate) fn video_frame(sched: &SchedState) -> PhysAddr {
    if sched.running == sched.displayed {
        PhysAddr(VIDEO_FRAME)
    } else {
        PhysAddr(BACKUP_FRAME_BASE + sched.running * PAGE_SIZE)
    }
}
