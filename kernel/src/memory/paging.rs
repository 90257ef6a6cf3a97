use crate::config::{
    BACKUP_FRAME_BASE, BIG_PAGE_SIZE, KERNEL_BASE, PAGE_SIZE, TERMINAL_COUNT, USER_DIR_INDEX,
    USER_PHYS_BASE, VIDEO_DIR_INDEX, VIDEO_FRAME,
};

use super::address::{PhysAddr, VirtAddr};

use enumflags2::{bitflags, BitFlags};

const TABLE_CAPACITY: usize = 1024;

/// 页目录/页表项
///
/// - [12:31] 页框号（4MiB 大页时为物理基址的高 10 位）
/// - [0:8]   保护位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Entry(u32);

/// 保护位
/// - P(Present)：项是否有效；
/// - RW(Read/Write)：是否允许写；
/// - US(User/Supervisor)：用户态能否访问；
/// - PS(Page Size)：目录项直指 4MiB 大页；
/// - G(Global)：切换地址空间时不冲刷对应的 TLB 条目。
#[bitflags]
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFlag {
    P = 0b0_0000_0001,
    RW = 0b0_0000_0010,
    US = 0b0_0000_0100,
    PWT = 0b0_0000_1000,
    PCD = 0b0_0001_0000,
    A = 0b0_0010_0000,
    D = 0b0_0100_0000,
    PS = 0b0_1000_0000,
    G = 0b1_0000_0000,
}

impl Entry {
    pub fn new(base: PhysAddr, flags: BitFlags<EntryFlag>) -> Self {
        Self(((base.frame() as u32) << 12) | flags.bits() as u32)
    }

    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn base(self) -> PhysAddr {
        PhysAddr(((self.0 >> 12) as usize) * PAGE_SIZE)
    }

    pub fn flags(self) -> BitFlags<EntryFlag> {
        BitFlags::from_bits_truncate(self.0 as u16)
    }

    pub fn is_present(self) -> bool {
        self.flags().contains(EntryFlag::P)
    }

    pub fn is_big(self) -> bool {
        self.flags().contains(EntryFlag::PS)
    }
}

/// 启动时一次性排布的页目录与两张页表。
/// 映射变动只发生在两个槽位：当前进程的大页与 vidmap 页。
pub struct Paging {
    directory: [Entry; TABLE_CAPACITY],
    /// 低 4MiB 的恒等页表，字符帧在其中
    low_table: [Entry; TABLE_CAPACITY],
    /// vidmap 的单页页表
    video_table: [Entry; TABLE_CAPACITY],
    /// 每次冲刷 TLB 递增，测试据此断言刷新确实发生
    tlb_epoch: u64,
}

impl Paging {
    pub fn new() -> Self {
        let mut low_table = [Entry::empty(); TABLE_CAPACITY];
        // 低 4MiB 恒等铺开，默认不在场
        for (i, entry) in low_table.iter_mut().enumerate() {
            *entry = Entry::new(PhysAddr(i * PAGE_SIZE), EntryFlag::RW.into());
        }
        // 字符帧与三个后备帧可见
        let video_first = PhysAddr(VIDEO_FRAME).frame();
        let video_last = PhysAddr(BACKUP_FRAME_BASE).frame() + TERMINAL_COUNT - 1;
        for i in video_first..=video_last {
            low_table[i] = Entry::new(
                PhysAddr(i * PAGE_SIZE),
                EntryFlag::P | EntryFlag::RW | EntryFlag::US,
            );
        }

        let mut directory = [Entry::empty(); TABLE_CAPACITY];
        // 目录项里页表的"物理地址"以页表自身的恒等地址占位
        directory[0] = Entry::new(PhysAddr(0), EntryFlag::P | EntryFlag::RW);
        directory[1] = Entry::new(
            PhysAddr(KERNEL_BASE),
            EntryFlag::P | EntryFlag::RW | EntryFlag::PS | EntryFlag::G,
        );

        Self {
            directory,
            low_table,
            video_table: [Entry::empty(); TABLE_CAPACITY],
            tlb_epoch: 0,
        }
    }

    /// 把 128MiB 的大页切换到 pid 的物理窗口并冲刷 TLB。
    pub fn map_process(&mut self, pid: usize) {
        self.directory[USER_DIR_INDEX] = Entry::new(
            PhysAddr(USER_PHYS_BASE + pid * BIG_PAGE_SIZE),
            EntryFlag::P | EntryFlag::RW | EntryFlag::US | EntryFlag::PS,
        );
        self.flush();
    }

    /// 把 132MiB 处的用户视频页指向 `frame` 并冲刷 TLB。
    pub fn map_video(&mut self, frame: PhysAddr) {
        self.directory[VIDEO_DIR_INDEX] = Entry::new(
            PhysAddr(0),
            EntryFlag::P | EntryFlag::RW | EntryFlag::US,
        );
        self.video_table[0] = Entry::new(frame, EntryFlag::P | EntryFlag::RW | EntryFlag::US);
        self.flush();
    }

    pub fn flush(&mut self) {
        self.tlb_epoch += 1;
    }

    pub fn epoch(&self) -> u64 {
        self.tlb_epoch
    }

    /// 走一遍两级查找，失败即该地址此刻不可访问。
    pub fn translate(&self, va: VirtAddr) -> Option<PhysAddr> {
        let dir = self.directory[va.dir_index()];
        if !dir.is_present() {
            return None;
        }
        if dir.is_big() {
            return Some(dir.base() + (va.0 & (BIG_PAGE_SIZE - 1)));
        }

        let table = match va.dir_index() {
            0 => &self.low_table,
            VIDEO_DIR_INDEX => &self.video_table,
            _ => return None,
        };
        let entry = table[va.table_index()];
        entry
            .is_present()
            .then(|| entry.base() + va.page_offset())
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{USER_VIDEO_BASE, USER_VIRT_BASE};

    #[test]
    fn kernel_big_page_is_identity() {
        let paging = Paging::new();
        let va = VirtAddr(KERNEL_BASE + 0x1234);
        assert_eq!(paging.translate(va), Some(PhysAddr(KERNEL_BASE + 0x1234)));
    }

    #[test]
    fn video_frames_visible_low() {
        let paging = Paging::new();
        assert_eq!(
            paging.translate(VirtAddr(VIDEO_FRAME + 10)),
            Some(PhysAddr(VIDEO_FRAME + 10))
        );
        assert_eq!(
            paging.translate(VirtAddr(BACKUP_FRAME_BASE + 2 * PAGE_SIZE)),
            Some(PhysAddr(BACKUP_FRAME_BASE + 2 * PAGE_SIZE))
        );
        // 其余低地址不在场
        assert_eq!(paging.translate(VirtAddr(0x1000)), None);
    }

    #[test]
    fn map_process_retargets_user_window() {
        let mut paging = Paging::new();
        assert_eq!(paging.translate(VirtAddr(USER_VIRT_BASE)), None);

        paging.map_process(0);
        assert_eq!(
            paging.translate(VirtAddr(USER_VIRT_BASE + 0x4_8000)),
            Some(PhysAddr(USER_PHYS_BASE + 0x4_8000))
        );

        paging.map_process(3);
        assert_eq!(
            paging.translate(VirtAddr(USER_VIRT_BASE)),
            Some(PhysAddr(USER_PHYS_BASE + 3 * BIG_PAGE_SIZE))
        );
    }

    #[test]
    fn map_video_targets_chosen_frame() {
        let mut paging = Paging::new();
        assert_eq!(paging.translate(VirtAddr(USER_VIDEO_BASE)), None);

        paging.map_video(PhysAddr(VIDEO_FRAME));
        assert_eq!(
            paging.translate(VirtAddr(USER_VIDEO_BASE + 2)),
            Some(PhysAddr(VIDEO_FRAME + 2))
        );

        paging.map_video(PhysAddr(BACKUP_FRAME_BASE));
        assert_eq!(
            paging.translate(VirtAddr(USER_VIDEO_BASE)),
            Some(PhysAddr(BACKUP_FRAME_BASE))
        );
    }

    #[test]
    fn remap_bumps_tlb_epoch() {
        let mut paging = Paging::new();
        let before = paging.epoch();
        paging.map_process(1);
        paging.map_video(PhysAddr(VIDEO_FRAME));
        assert_eq!(paging.epoch(), before + 2);
    }
}
