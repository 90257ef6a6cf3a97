use crate::config::LINE_CAPACITY;

/// 三个终端各自的显示属性字节：白、绿、紫。
pub const ATTRIBUTES: [u8; 3] = [0x0F, 0x0A, 0x05];

/// 一个虚拟终端：行缓冲、光标与其进程链的链尾。
#[derive(Debug)]
pub struct Terminal {
    pub id: usize,
    /// 终端进程链的当前进程
    pub current: Option<usize>,
    /// 是否已经启动过 shell
    pub active: bool,
    pub line: [u8; LINE_CAPACITY],
    pub line_len: usize,
    pub line_ready: bool,
    /// (列, 行)
    pub cursor: (usize, usize),
    pub attr: u8,
}

impl Terminal {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            current: None,
            active: false,
            line: [0; LINE_CAPACITY],
            line_len: 0,
            line_ready: false,
            cursor: (0, 0),
            attr: ATTRIBUTES[id],
        }
    }
}
