#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    /// 名字没有匹配任何目录项，或名字超过 32 字节
    NotFound,
    /// 目录项序号或索引节点编号越界
    OutOfRange,
    /// 目录项的类型字段不在 {设备, 目录, 普通文件} 之内
    UnknownKind,
    /// 镜像装不下启动块声明的区域
    Corrupted,
}
