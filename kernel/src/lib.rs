//! 单核 x86 教学内核的进程、内存与调度核心。
//!
//! 一颗 CPU 分时复用三个虚拟终端，每个终端承载一条 execute/halt
//! 嵌套的进程链；每个进程独占一个 4MiB 虚拟窗口；系统调用表面
//! (execute/halt/open/read/write/close/getargs/vidmap) 背靠一份
//! 常驻内存的只读 flat-fs 镜像。
//!
//! 硬件侧的状态（页目录、TSS、字符帧、用户窗口、保存的栈指针）
//! 以显式记录建模；陷入分发、扫描码翻译、时钟编程是外部协作者，
//! 经由 [`Kernel`] 上的入口（`push_line`/`clock_tick`/`timer_tick`/
//! `fault_terminate`/`switch_display`）进入本核心。

pub mod config;
mod error;
pub mod fs;
mod kernel;
pub mod logging;
pub mod memory;
pub mod syscall;
pub mod task;

mod sync;

pub use self::error::KernelError;
pub use self::kernel::{Kernel, Transfer};
