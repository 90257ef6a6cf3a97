use flat_fs::NAME_LEN;

use crate::{Kernel, KernelError};

impl Kernel {
    /// 普通文件读：从描述符的当前偏移读，随后推进偏移。
    pub(crate) fn file_read(&mut self, fd: usize, buf: &mut [u8]) -> Result<usize, KernelError> {
        let descriptor = *self.current_pcb()?.fd_table.get(fd)?;
        let n = self.fs.read_at(descriptor.inode, descriptor.offset, buf)?;
        self.current_pcb_mut()?.fd_table.get_mut(fd)?.offset += n;
        Ok(n)
    }

    /// 目录读：每次返回一个文件名（不带结尾零），偏移按目录项计，
    /// 读尽返回 0。
    pub(crate) fn dir_read(&mut self, fd: usize, buf: &mut [u8]) -> Result<usize, KernelError> {
        let index = self.current_pcb()?.fd_table.get(fd)?.offset;
        if index >= self.fs.dir_entry_count() {
            return Ok(0);
        }

        let entry = self.fs.lookup_by_index(index)?;
        let name = entry.name_bytes();
        let n = name.len().min(NAME_LEN).min(buf.len());
        buf[..n].copy_from_slice(&name[..n]);

        self.current_pcb_mut()?.fd_table.get_mut(fd)?.offset += 1;
        Ok(n)
    }
}
