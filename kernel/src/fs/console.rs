use core::hint;

use crate::config::{LINE_CAPACITY, TEXT_COLS, TEXT_ROWS};
use crate::memory::VideoMem;
use crate::task::Terminal;
use crate::{Kernel, KernelError};

impl Kernel {
    /// 阻塞到键盘送来一整行，拷贝后清掉行缓冲。
    /// 等待期间中断保持开启，拷贝在屏蔽下完成。
    pub(crate) fn console_read(&mut self, buf: &mut [u8]) -> Result<usize, KernelError> {
        while !self.terminals[self.sched.running].line_ready {
            hint::spin_loop();
        }

        let _mask = self.intr.mask();
        let terminal = &mut self.terminals[self.sched.running];
        let n = terminal.line_len.min(buf.len());
        buf[..n].copy_from_slice(&terminal.line[..n]);
        terminal.line_len = 0;
        terminal.line_ready = false;
        Ok(n)
    }

    /// 全部字节写到运行终端的帧上：在屏则直写显示帧，
    /// 后台则写其后备帧。
    pub(crate) fn console_write(&mut self, buf: &[u8]) -> Result<usize, KernelError> {
        let _mask = self.intr.mask();
        let running = self.sched.running;
        let frame = if running == self.sched.displayed {
            0
        } else {
            1 + running
        };

        for &byte in buf {
            putc(
                &mut self.video,
                &mut self.terminals[running],
                frame,
                byte,
            );
        }
        Ok(buf.len())
    }

    /// 键盘协作者递交一整行（含结尾换行），送往在屏终端。
    /// 超过行缓冲的部分丢弃。
    pub fn push_line(&mut self, line: &[u8]) {
        let _mask = self.intr.mask();
        let terminal = &mut self.terminals[self.sched.displayed];
        let n = line.len().min(LINE_CAPACITY);
        terminal.line[..n].copy_from_slice(&line[..n]);
        terminal.line_len = n;
        terminal.line_ready = true;
    }
}

/// 往 `frame` 打一个字符并推进 `terminal` 的光标，
/// 行满换行，屏满滚动。
pub(crate) fn putc(video: &mut VideoMem, terminal: &mut Terminal, frame: usize, byte: u8) {
    let (mut x, mut y) = terminal.cursor;

    if byte == b'\n' {
        x = 0;
        y += 1;
    } else {
        video.put_at(frame, x, y, byte, terminal.attr);
        x += 1;
        if x == TEXT_COLS {
            x = 0;
            y += 1;
        }
    }

    if y == TEXT_ROWS {
        video.scroll(frame, terminal.attr);
        y = TEXT_ROWS - 1;
    }
    terminal.cursor = (x, y);
}
