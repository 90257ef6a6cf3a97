use flat_fs::FsError;

/// 系统调用层的失败原因。对用户程序一律折叠成 -1，
/// 区分出来是为了内核内部的日志与测试断言。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// 名字在文件系统里不存在
    NotFound,
    /// 文件开头不是可执行魔数
    NotExecutable,
    /// 装载内容或参数超出容量
    TooLarge,
    /// 六个进程槽位已满
    PidExhausted,
    /// 描述符表没有空槽
    DescriptorExhausted,
    /// 描述符编号越界、未打开或方向不符
    BadDescriptor,
    /// 用户地址不在进程可见的窗口内
    BadAddress,
    /// 参数本身非法（负长度、非法频率等）
    BadArgument,
    /// 当前终端上没有进程
    NoProcess,
    /// 操作未实现或设备不支持
    Unsupported,
}

impl From<FsError> for KernelError {
    fn from(e: FsError) -> Self {
        match e {
            FsError::NotFound => Self::NotFound,
            FsError::OutOfRange => Self::BadArgument,
            // 类型字段损坏的目录项视同不存在
            FsError::UnknownKind => Self::NotFound,
            FsError::Corrupted => Self::BadArgument,
        }
    }
}
