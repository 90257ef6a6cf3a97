//! Constants used across the kernel core

/// 页大小
pub const PAGE_SIZE: usize = 0x1000;
/// 4MiB 大页
pub const BIG_PAGE_SIZE: usize = 0x40_0000;

/// 内核恒等映射的物理/虚拟基址（4MiB 起）
pub const KERNEL_BASE: usize = 0x40_0000;
/// 进程物理窗口起点：8MiB + pid * 4MiB
pub const USER_PHYS_BASE: usize = 0x80_0000;
/// 进程虚拟窗口基址，128MiB
pub const USER_VIRT_BASE: usize = 0x800_0000;
/// vidmap 暴露给用户的视频页地址，132MiB
pub const USER_VIDEO_BASE: usize = 0x840_0000;
/// 进程窗口占用的页目录槽位（128MiB / 4MiB）
pub const USER_DIR_INDEX: usize = 32;
/// 视频页占用的页目录槽位
pub const VIDEO_DIR_INDEX: usize = 33;

/// 在屏字符帧
pub const VIDEO_FRAME: usize = 0xB8000;
/// 三个终端的后备帧从这里起，每终端一页
pub const BACKUP_FRAME_BASE: usize = 0xB9000;

/// 程序装载点在进程窗口内的偏移（虚拟 0x804_8000）
pub const LOAD_OFFSET: usize = 0x4_8000;
/// 入口点在可执行文件内的字节偏移
pub const ENTRY_POINT_OFFSET: usize = 24;
/// 可执行文件的魔数
pub const EXEC_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// 全系统同时存活的进程上限，三个终端共享
pub const MAX_PROCESSES: usize = 6;
/// 每进程描述符表的槽数
pub const MAX_DESCRIPTORS: usize = 8;
pub const TERMINAL_COUNT: usize = 3;

/// 每进程内核栈 8KiB，从 8MiB 向下排布
pub const KERNEL_STACK_SIZE: usize = 0x2000;
/// 参数缓冲容量（127 字节参数 + 结尾零）
pub const ARG_CAPACITY: usize = 128;
/// 终端行缓冲容量
pub const LINE_CAPACITY: usize = 128;

/// 由故障协作者代为 halt 时送达父进程的状态值
pub const FAULT_STATUS: i32 = 256;

pub const TEXT_COLS: usize = 80;
pub const TEXT_ROWS: usize = 25;

pub const KERNEL_DS: u16 = 0x18;

/// pid 对应的内核栈顶。-4 避开栈底的边界
pub const fn kernel_stack_top(pid: usize) -> usize {
    USER_PHYS_BASE - KERNEL_STACK_SIZE * pid - 4
}
