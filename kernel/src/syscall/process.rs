use flat_fs::FileKind;

use crate::config::{
    kernel_stack_top, ARG_CAPACITY, BIG_PAGE_SIZE, ENTRY_POINT_OFFSET, EXEC_MAGIC, KERNEL_DS,
    LOAD_OFFSET, MAX_DESCRIPTORS, USER_VIDEO_BASE,
};
use crate::fs;
use crate::kernel::video_frame;
use crate::memory::VirtAddr;
use crate::task::Context;
use crate::{Kernel, KernelError, Transfer};

use log::{debug, info};

/// 装载并启动一个新进程，挂在运行终端的进程链尾。
///
/// 所有校验都在占用 pid 之前完成，失败不留任何痕迹。
pub fn sys_execute(kernel: &mut Kernel, command: &[u8]) -> Result<Transfer, KernelError> {
    let (name, args) = parse_command(command)?;
    info!("execute {:?}", core::str::from_utf8(name).unwrap_or("?"));

    let _mask = kernel.intr.mask();

    let entry = kernel.fs.lookup_by_name(name)?;
    if entry.kind != FileKind::Regular {
        return Err(KernelError::NotExecutable);
    }
    let inode = entry.inode;

    let mut magic = [0u8; 4];
    if kernel.fs.read_at(inode, 0, &mut magic)? != 4 || magic != EXEC_MAGIC {
        return Err(KernelError::NotExecutable);
    }

    let mut word = [0u8; 4];
    if kernel.fs.read_at(inode, ENTRY_POINT_OFFSET, &mut word)? != 4 {
        return Err(KernelError::NotExecutable);
    }
    let entry_point = u32::from_le_bytes(word) as usize;

    if LOAD_OFFSET + kernel.fs.length(inode) as usize > BIG_PAGE_SIZE {
        return Err(KernelError::TooLarge);
    }

    // 自此再无失败路径
    let pid = kernel.procs.allocate_pid()?;
    debug!("pid {pid} <- {:?}", core::str::from_utf8(name).ok());

    kernel.paging.map_process(pid);
    kernel.windows.load(pid, &kernel.fs, inode);

    // 父进程是运行终端的链尾；终端上还没有进程时这是链首
    let tid = kernel.sched.running;
    let parent = if kernel.terminals[tid].active {
        kernel.terminals[tid].current
    } else {
        None
    };
    kernel.terminals[tid].active = true;
    kernel.terminals[tid].current = Some(pid);

    let fresh = Context::at_stack_top(kernel_stack_top(pid));
    let pcb = kernel.procs.init_pcb(pid);
    pcb.parent = parent;
    pcb.args.set(args);
    pcb.saved = kernel.cpu;
    pcb.resched = fresh;

    if let Some(parent) = parent {
        kernel.procs.get_mut(parent).completion = None;
    }

    kernel.tss.ss0 = KERNEL_DS;
    kernel.tss.esp0 = kernel_stack_top(pid);
    kernel.cpu = fresh;

    Ok(Transfer::User {
        pid,
        entry: VirtAddr(entry_point),
    })
}

/// 结束当前进程，回到父进程的 execute 陷入点。
/// 链首进程结束时在同一终端上重新拉起 shell。
pub fn sys_halt(kernel: &mut Kernel, status: i32) -> Result<Transfer, KernelError> {
    let parent;
    {
        let _mask = kernel.intr.mask();

        let tid = kernel.sched.running;
        let pid = kernel.terminals[tid]
            .current
            .ok_or(KernelError::NoProcess)?;

        // 动态描述符全部收回
        for fd in 2..MAX_DESCRIPTORS {
            if let Ok(kind) = kernel.procs.get_mut(pid).fd_table.remove(fd) {
                let _ = fs::close_device(kind);
            }
        }

        kernel.procs.release_pid(pid)?;
        info!("halt pid {pid}, status {status}");

        match kernel.procs.get(pid).parent {
            None => {
                // 链首退场，终端回到未启动状态，原地重新拉起 shell
                kernel.terminals[tid].current = None;
                kernel.terminals[tid].active = false;
                drop(_mask);
                return sys_execute(kernel, b"shell");
            }
            Some(p) => {
                kernel.paging.map_process(p);
                kernel.terminals[tid].current = Some(p);
                kernel.tss.ss0 = KERNEL_DS;
                kernel.tss.esp0 = kernel_stack_top(p);
                kernel.cpu = kernel.procs.get(p).saved;
                kernel.procs.get_mut(p).completion = Some(status);
                parent = p;
            }
        }
    }

    kernel.resume_parent(parent)
}

/// 把 execute 命令行里的参数拷给用户，带结尾零。
/// 无参数或装不下都按失败处理。
pub fn sys_getargs(
    kernel: &mut Kernel,
    buf: &mut [u8],
    nbytes: isize,
) -> Result<isize, KernelError> {
    let n = usize::try_from(nbytes).map_err(|_| KernelError::BadArgument)?;
    let _mask = kernel.intr.mask();

    let tid = kernel.sched.running;
    let pid = kernel.terminals[tid]
        .current
        .ok_or(KernelError::NoProcess)?;
    let args = kernel.procs.get(pid).args;
    let bytes = args.as_bytes();

    if bytes.is_empty() {
        return Err(KernelError::BadArgument);
    }
    // 结尾零也要装得下
    if bytes.len() + 1 > n.min(buf.len()) {
        return Err(KernelError::TooLarge);
    }

    buf[..bytes.len()].copy_from_slice(bytes);
    buf[bytes.len()] = 0;
    Ok(0)
}

/// 把视频页映射进当前进程并把其虚拟地址写到 `out` 指向的位置。
/// `out` 必须落在进程自己的 4MiB 窗口内。
pub fn sys_vidmap(kernel: &mut Kernel, out: VirtAddr) -> Result<isize, KernelError> {
    let _mask = kernel.intr.mask();

    let tid = kernel.sched.running;
    let pid = kernel.terminals[tid]
        .current
        .ok_or(KernelError::NoProcess)?;

    // 后台终端的进程拿到的是自己的后备帧
    let frame = video_frame(&kernel.sched);
    kernel.paging.map_video(frame);
    kernel.windows.write_u32(pid, out, USER_VIDEO_BASE as u32)?;
    Ok(0)
}

pub fn sys_set_handler(_kernel: &mut Kernel, _signum: isize) -> Result<isize, KernelError> {
    Err(KernelError::Unsupported)
}

pub fn sys_sigreturn(_kernel: &mut Kernel) -> Result<isize, KernelError> {
    Err(KernelError::Unsupported)
}

/// 拆出程序名与参数。两者之间与各自前后的空格全部吃掉，
/// 参数内部保持原样。
fn parse_command(command: &[u8]) -> Result<(&[u8], &[u8]), KernelError> {
    let rest = trim_spaces(command);
    if rest.is_empty() {
        return Err(KernelError::NotFound);
    }

    let name_end = rest
        .iter()
        .position(|&b| b == b' ')
        .unwrap_or(rest.len());
    let (name, tail) = rest.split_at(name_end);
    let args = trim_spaces(tail);

    if args.len() >= ARG_CAPACITY {
        return Err(KernelError::TooLarge);
    }
    Ok((name, args))
}

fn trim_spaces(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|&b| b != b' ')
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ')
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_args() {
        assert_eq!(parse_command(b"cat frame0.txt").unwrap(), (&b"cat"[..], &b"frame0.txt"[..]));
        assert_eq!(parse_command(b"shell").unwrap(), (&b"shell"[..], &b""[..]));
    }

    #[test]
    fn eats_surrounding_spaces() {
        assert_eq!(
            parse_command(b"   grep   very long pattern  ").unwrap(),
            (&b"grep"[..], &b"very long pattern"[..])
        );
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert_eq!(parse_command(b""), Err(KernelError::NotFound));
        assert_eq!(parse_command(b"    "), Err(KernelError::NotFound));

        let mut long = b"prog ".to_vec();
        long.extend(std::iter::repeat_n(b'x', ARG_CAPACITY));
        assert_eq!(parse_command(&long), Err(KernelError::TooLarge));

        let mut fits = b"prog ".to_vec();
        fits.extend(std::iter::repeat_n(b'x', ARG_CAPACITY - 1));
        assert!(parse_command(&fits).is_ok());
    }
}
