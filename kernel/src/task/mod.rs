//! 进程表、终端与时间片调度。
//!
//! 六个进程槽位由全部终端共享；每个终端只记录其进程链的
//! 链尾（当前进程），父子关系存在 PCB 里。调度器在三个
//! 活跃终端的当前进程之间轮转。

mod pid;
mod process;
mod scheduler;
mod terminal;
mod tss;

pub use self::pid::PidAllocator;
pub use self::process::{ArgBuffer, Context, ProcessControlBlock, ProcessTable};
pub use self::scheduler::{SchedState, Tick};
pub use self::terminal::{Terminal, ATTRIBUTES};
pub use self::tss::Tss;
