//! 系统调用表面。
//!
//! 陷入分发是外部协作者：它把寄存器摆成 [`Request`]，经
//! [`dispatch`] 进入内核，拿回 [`Outcome`]。普通调用得到
//! 一个返回值；execute/halt 得到一次控制转移。

mod fs;
mod process;

pub use self::fs::{sys_close, sys_open, sys_read, sys_write};
pub use self::process::{
    sys_execute, sys_getargs, sys_halt, sys_set_handler, sys_sigreturn, sys_vidmap,
};

use crate::memory::VirtAddr;
use crate::{Kernel, Transfer};

pub const HALT: usize = 1;
pub const EXECUTE: usize = 2;
pub const READ: usize = 3;
pub const WRITE: usize = 4;
pub const OPEN: usize = 5;
pub const CLOSE: usize = 6;
pub const GETARGS: usize = 7;
pub const VIDMAP: usize = 8;
pub const SET_HANDLER: usize = 9;
pub const SIGRETURN: usize = 10;

/// 陷入层翻译好的一次系统调用。
///
/// 指针参数在这一层已经变成借用；用户传空指针或坏地址时，
/// 陷入层以空切片或越界的 [`VirtAddr`] 表达。
pub enum Request<'a> {
    Halt { status: u8 },
    Execute { command: &'a [u8] },
    Read { fd: isize, buf: &'a mut [u8], nbytes: isize },
    Write { fd: isize, buf: &'a [u8], nbytes: isize },
    Open { name: &'a [u8] },
    Close { fd: isize },
    GetArgs { buf: &'a mut [u8], nbytes: isize },
    VidMap { out: VirtAddr },
    SetHandler { signum: isize },
    SigReturn,
}

impl Request<'_> {
    pub fn number(&self) -> usize {
        match self {
            Self::Halt { .. } => HALT,
            Self::Execute { .. } => EXECUTE,
            Self::Read { .. } => READ,
            Self::Write { .. } => WRITE,
            Self::Open { .. } => OPEN,
            Self::Close { .. } => CLOSE,
            Self::GetArgs { .. } => GETARGS,
            Self::VidMap { .. } => VIDMAP,
            Self::SetHandler { .. } => SET_HANDLER,
            Self::SigReturn => SIGRETURN,
        }
    }
}

/// 一次系统调用的结局。
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// 返回值交还给发起调用的进程
    Value(isize),
    /// 控制权转移到别的进程
    Transfer(Transfer),
}

/// 失败一律折叠成 -1，这是用户程序唯一看得到的错误形态。
pub fn dispatch(kernel: &mut Kernel, request: Request<'_>) -> Outcome {
    match request {
        Request::Halt { status } => match sys_halt(kernel, status as i32) {
            Ok(transfer) => Outcome::Transfer(transfer),
            Err(_) => Outcome::Value(-1),
        },
        Request::Execute { command } => match sys_execute(kernel, command) {
            Ok(transfer) => Outcome::Transfer(transfer),
            Err(_) => Outcome::Value(-1),
        },
        Request::Read { fd, buf, nbytes } => value(sys_read(kernel, fd, buf, nbytes)),
        Request::Write { fd, buf, nbytes } => value(sys_write(kernel, fd, buf, nbytes)),
        Request::Open { name } => value(sys_open(kernel, name)),
        Request::Close { fd } => value(sys_close(kernel, fd)),
        Request::GetArgs { buf, nbytes } => value(sys_getargs(kernel, buf, nbytes)),
        Request::VidMap { out } => value(sys_vidmap(kernel, out)),
        Request::SetHandler { signum } => value(sys_set_handler(kernel, signum)),
        Request::SigReturn => value(sys_sigreturn(kernel)),
    }
}

fn value(result: Result<isize, crate::KernelError>) -> Outcome {
    Outcome::Value(result.unwrap_or(-1))
}
