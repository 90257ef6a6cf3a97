//! 平坦的 x86 分页布局、进程窗口与字符帧。
//!
//! 页目录只用四个槽位：低 4MiB 的页表（含视频帧）、内核 4MiB
//! 大页、当前进程的 4MiB 大页、vidmap 页表。地址翻译与 TLB
//! 刷新以纯数据形式建模。

mod address;
mod paging;
mod video;
mod windows;

pub use self::address::{PhysAddr, VirtAddr};
pub use self::paging::{EntryFlag, Paging};
pub use self::video::VideoMem;
pub use self::windows::UserWindows;
