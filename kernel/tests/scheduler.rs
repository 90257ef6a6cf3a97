//! 终端切换与时间片轮转：测试扮演键盘与时钟协作者。

mod common;

use kernel::config::{
    kernel_stack_top, BACKUP_FRAME_BASE, LOAD_OFFSET, USER_PHYS_BASE, USER_VIRT_BASE, VIDEO_FRAME,
};
use kernel::memory::{PhysAddr, VirtAddr};
use kernel::syscall::{dispatch, Outcome, Request};
use kernel::task::Tick;
use kernel::{Kernel, Transfer};

use common::booted;

/// 把三个终端都拉起 shell：pid 0/1/2 分属终端 0/1/2。
fn three_terminals() -> Kernel {
    let (mut kernel, _) = booted();
    for tid in [1, 2] {
        let transfer = kernel.switch_display(tid).unwrap();
        assert!(matches!(transfer, Some(Transfer::User { .. })));
    }
    kernel
}

#[test]
fn lone_terminal_tick_is_idle() {
    let (mut kernel, _) = booted();

    let eoi = kernel.scheduler().eoi;
    let epoch = kernel.paging().epoch();
    let tss = *kernel.tss();
    assert_eq!(kernel.timer_tick(), Tick::Idle);
    assert_eq!(kernel.timer_tick(), Tick::Idle);

    // 不切换也要应答中断，但分页与 TSS 纹丝不动
    assert_eq!(kernel.scheduler().eoi, eoi + 2);
    assert_eq!(kernel.scheduler().running, 0);
    assert_eq!(kernel.paging().epoch(), epoch);
    assert_eq!(*kernel.tss(), tss);
}

#[test]
fn first_switch_starts_shell_on_new_terminal() {
    let (mut kernel, _) = booted();

    let transfer = kernel.switch_display(1).unwrap();
    let Some(Transfer::User { pid, .. }) = transfer else {
        panic!("no shell was started");
    };
    assert_eq!(pid, 1);
    assert_eq!(kernel.scheduler().displayed, 1);
    assert_eq!(kernel.scheduler().running, 1);
    assert_eq!(kernel.terminal(1).current, Some(1));
    assert!(kernel.terminal(1).active);

    // 回到已启动的终端只搬帧，不再拉 shell
    assert_eq!(kernel.switch_display(0).unwrap(), None);
    assert_eq!(kernel.switch_display(0).unwrap(), None);
    assert!(kernel.switch_display(3).is_err());
}

#[test]
fn round_robin_over_active_terminals() {
    let mut kernel = three_terminals();
    assert_eq!(kernel.scheduler().running, 2);

    assert_eq!(kernel.timer_tick(), Tick::Switched { from: 2, to: 0 });
    assert_eq!(kernel.tss().esp0, kernel_stack_top(0));
    // 大页跟着换到 pid 0 的窗口
    assert_eq!(
        kernel.paging().translate(VirtAddr(USER_VIRT_BASE + LOAD_OFFSET)),
        Some(PhysAddr(USER_PHYS_BASE + LOAD_OFFSET))
    );

    assert_eq!(kernel.timer_tick(), Tick::Switched { from: 0, to: 1 });
    assert_eq!(kernel.timer_tick(), Tick::Switched { from: 1, to: 2 });
    assert_eq!(kernel.timer_tick(), Tick::Switched { from: 2, to: 0 });
    assert_eq!(kernel.scheduler().eoi, 4);
}

#[test]
fn context_round_trips_through_reschedule() {
    let mut kernel = three_terminals();

    let saved = kernel.pcb(2).unwrap().resched;
    kernel.timer_tick(); // 2 -> 0
    assert_eq!(kernel.pcb(2).unwrap().resched, saved);

    kernel.timer_tick(); // 0 -> 1
    kernel.timer_tick(); // 1 -> 2，换回来
    assert_eq!(kernel.scheduler().running, 2);
}

#[test]
fn background_writes_land_in_backup_frame() {
    let mut kernel = three_terminals();
    kernel.timer_tick(); // 显示 2，运行 0

    let outcome = dispatch(
        &mut kernel,
        Request::Write { fd: 1, buf: b"bg", nbytes: 2 },
    );
    assert_eq!(outcome, Outcome::Value(2));

    // 终端 0 的后备帧是 1 号帧，属性白色
    assert_eq!(kernel.video().char_at(1, 0, 0), (b'b', 0x0F));
    assert_eq!(kernel.video().char_at(1, 1, 0), (b'g', 0x0F));
    // 在屏的帧不受影响
    assert_eq!(kernel.video().char_at(0, 0, 0), (b' ', 0x05));
}

#[test]
fn display_switch_swaps_frames() {
    let (mut kernel, _) = booted();

    dispatch(
        &mut kernel,
        Request::Write { fd: 1, buf: b"t0", nbytes: 2 },
    );
    kernel.switch_display(1).unwrap();

    // 终端 0 的画面被收进其后备帧，新终端的空帧上屏
    assert_eq!(kernel.video().char_at(1, 0, 0), (b't', 0x0F));
    assert_eq!(kernel.video().char_at(1, 1, 0), (b'0', 0x0F));
    assert_eq!(kernel.video().char_at(0, 0, 0), (b' ', 0x0A));

    // 切回来画面复原
    kernel.switch_display(0).unwrap();
    assert_eq!(kernel.video().char_at(0, 0, 0), (b't', 0x0F));
}

#[test]
fn vidmap_follows_scheduler() {
    let mut kernel = three_terminals();
    kernel.timer_tick(); // 显示 2，运行 0

    let out = VirtAddr(USER_VIRT_BASE + 0x20_0000);
    assert_eq!(dispatch(&mut kernel, Request::VidMap { out }), Outcome::Value(0));

    // 后台进程拿到的是终端 0 的后备帧
    assert_eq!(
        kernel.paging().translate(VirtAddr(kernel::config::USER_VIDEO_BASE)),
        Some(PhysAddr(BACKUP_FRAME_BASE))
    );

    // 轮转到在屏终端后，vidmap 页换回显示帧
    kernel.timer_tick(); // 0 -> 1
    kernel.timer_tick(); // 1 -> 2，running == displayed
    assert_eq!(
        kernel.paging().translate(VirtAddr(kernel::config::USER_VIDEO_BASE)),
        Some(PhysAddr(VIDEO_FRAME))
    );
}

#[test]
fn first_touch_switch_retargets_video_page() {
    let (mut kernel, _) = booted();
    kernel.switch_display(1).unwrap(); // 运行 1，显示 1

    // 轮转把视频页指到终端 0 的后备帧
    kernel.timer_tick();
    assert_eq!(kernel.scheduler().running, 0);
    assert_eq!(
        kernel.paging().translate(VirtAddr(kernel::config::USER_VIDEO_BASE)),
        Some(PhysAddr(BACKUP_FRAME_BASE))
    );

    // 首次切到终端 2：新 shell 在屏运行，映射不能留在旧帧上
    let transfer = kernel.switch_display(2).unwrap();
    assert!(matches!(transfer, Some(Transfer::User { .. })));
    assert_eq!(
        kernel.paging().translate(VirtAddr(kernel::config::USER_VIDEO_BASE)),
        Some(PhysAddr(VIDEO_FRAME))
    );
}

#[test]
fn input_goes_to_displayed_terminal() {
    let mut kernel = three_terminals();
    // 显示 2，运行 2：行直接进运行终端
    kernel.push_line(b"go\n");

    let mut buf = [0u8; 8];
    let outcome = dispatch(
        &mut kernel,
        Request::Read { fd: 0, buf: &mut buf, nbytes: 8 },
    );
    assert_eq!(outcome, Outcome::Value(3));
    assert_eq!(&buf[..3], b"go\n");

    // 后台运行时，送往在屏终端的行不会出现在运行终端的缓冲里
    kernel.timer_tick(); // 运行 0，显示 2
    kernel.push_line(b"for t2\n");
    assert!(!kernel.terminal(0).line_ready);
    assert!(kernel.terminal(2).line_ready);
}

#[test]
fn per_terminal_clock_queues() {
    let mut kernel = three_terminals();

    let Outcome::Value(fd) = dispatch(&mut kernel, Request::Open { name: b"rtc" }) else {
        unreachable!()
    };

    kernel.clock_tick();
    let mut empty: [u8; 0] = [];
    // 运行终端（2）的节拍被消费
    assert_eq!(
        dispatch(&mut kernel, Request::Read { fd, buf: &mut empty, nbytes: 0 }),
        Outcome::Value(0)
    );

    // 其它终端的节拍各自保留
    kernel.timer_tick(); // 运行 0
    let Outcome::Value(fd0) = dispatch(&mut kernel, Request::Open { name: b"rtc" }) else {
        unreachable!()
    };
    assert_eq!(
        dispatch(&mut kernel, Request::Read { fd: fd0, buf: &mut empty, nbytes: 0 }),
        Outcome::Value(0)
    );
}

#[test]
fn halt_on_background_terminal_stays_there() {
    let mut kernel = three_terminals();
    kernel.timer_tick(); // 运行 0，显示 2

    // 终端 0 的 shell 上再跑一个程序并退出
    let Outcome::Transfer(Transfer::User { pid, .. }) =
        dispatch(&mut kernel, Request::Execute { command: b"prog" })
    else {
        panic!("execute failed");
    };
    assert_eq!(kernel.terminal(0).current, Some(pid));

    let outcome = dispatch(&mut kernel, Request::Halt { status: 3 });
    assert_eq!(
        outcome,
        Outcome::Transfer(Transfer::Parent { pid: 0, status: 3 })
    );
    assert_eq!(kernel.terminal(0).current, Some(0));
    // 显示终端不受影响
    assert_eq!(kernel.scheduler().displayed, 2);
}
