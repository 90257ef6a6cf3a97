#![allow(dead_code)]

use flat_fs::FileKind;
use flat_fs_fuse::{executable, ImagePacker};
use kernel::{Kernel, Transfer};

pub const SHELL_ENTRY: u32 = 0x0804_8100;
pub const PROG_ENTRY: u32 = 0x0804_8200;

/// 带 shell、测试程序与几份普通文件的启动镜像。
pub fn boot_image() -> Vec<u8> {
    let mut packer = ImagePacker::new();
    packer.add(".", FileKind::Directory, &[]);
    packer.add("rtc", FileKind::Device, &[]);
    packer.add(
        "shell",
        FileKind::Regular,
        &executable(SHELL_ENTRY, b"shell body"),
    );
    packer.add(
        "prog",
        FileKind::Regular,
        &executable(PROG_ENTRY, b"prog body"),
    );
    packer.add("frame0.txt", FileKind::Regular, b"a fish jumped over the moon");
    packer.add("notes", FileKind::Regular, b"plain text, not a program");
    packer.pack()
}

/// 冷启动并拉起终端 0 的 shell，返回内核与 shell 的 pid。
pub fn booted() -> (Kernel, usize) {
    let mut kernel = Kernel::new(boot_image()).unwrap();
    match kernel.boot().unwrap() {
        Transfer::User { pid, .. } => (kernel, pid),
        other => panic!("boot produced {other:?}"),
    }
}
