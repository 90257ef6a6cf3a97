use crate::config::{PAGE_SIZE, TERMINAL_COUNT, TEXT_COLS, TEXT_ROWS};

/// 文本模式的字符帧：帧 0 在屏（0xB8000），帧 1..=3 是
/// 三个终端的后备帧。每个字符单元两字节：字符 + 属性。
pub struct VideoMem {
    frames: [[u8; PAGE_SIZE]; 1 + TERMINAL_COUNT],
}

impl VideoMem {
    pub fn new() -> Self {
        Self {
            frames: [[0; PAGE_SIZE]; 1 + TERMINAL_COUNT],
        }
    }

    /// 整帧填充空格与属性字节。
    pub fn clear(&mut self, frame: usize, attr: u8) {
        let cells = &mut self.frames[frame];
        for i in 0..TEXT_COLS * TEXT_ROWS {
            cells[2 * i] = b' ';
            cells[2 * i + 1] = attr;
        }
    }

    pub fn put_at(&mut self, frame: usize, x: usize, y: usize, byte: u8, attr: u8) {
        let i = y * TEXT_COLS + x;
        self.frames[frame][2 * i] = byte;
        self.frames[frame][2 * i + 1] = attr;
    }

    /// 整帧上移一行，底行清成空格。
    pub fn scroll(&mut self, frame: usize, attr: u8) {
        let cells = &mut self.frames[frame];
        cells.copy_within(2 * TEXT_COLS..2 * TEXT_COLS * TEXT_ROWS, 0);
        for i in TEXT_COLS * (TEXT_ROWS - 1)..TEXT_COLS * TEXT_ROWS {
            cells[2 * i] = b' ';
            cells[2 * i + 1] = attr;
        }
    }

    /// 终端切换时的整帧搬运。
    pub fn copy_frame(&mut self, src: usize, dst: usize) {
        let frame = self.frames[src];
        self.frames[dst] = frame;
    }

    pub fn char_at(&self, frame: usize, x: usize, y: usize) -> (u8, u8) {
        let i = y * TEXT_COLS + x;
        (self.frames[frame][2 * i], self.frames[frame][2 * i + 1])
    }
}

impl Default for VideoMem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_fills_cells() {
        let mut video = VideoMem::new();
        video.clear(1, 0x0A);
        assert_eq!(video.char_at(1, 0, 0), (b' ', 0x0A));
        assert_eq!(video.char_at(1, TEXT_COLS - 1, TEXT_ROWS - 1), (b' ', 0x0A));
    }

    #[test]
    fn scroll_shifts_rows_up() {
        let mut video = VideoMem::new();
        video.clear(0, 0x0F);
        video.put_at(0, 3, 1, b'x', 0x0F);
        video.put_at(0, 5, TEXT_ROWS - 1, b'y', 0x0F);

        video.scroll(0, 0x0F);
        assert_eq!(video.char_at(0, 3, 0), (b'x', 0x0F));
        assert_eq!(video.char_at(0, 5, TEXT_ROWS - 2), (b'y', 0x0F));
        assert_eq!(video.char_at(0, 5, TEXT_ROWS - 1), (b' ', 0x0F));
    }

    #[test]
    fn copy_frame_moves_whole_page() {
        let mut video = VideoMem::new();
        video.clear(2, 0x05);
        video.put_at(2, 0, 0, b'z', 0x05);

        video.copy_frame(2, 0);
        assert_eq!(video.char_at(0, 0, 0), (b'z', 0x05));
    }
}
