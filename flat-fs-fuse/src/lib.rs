//! 在宿主机上打包位精确的 flat-fs 镜像，供内核测试与制镜像工具使用。


use flat_fs::{FileKind, BLOCK_SIZE, DIR_CAPACITY, DIR_ENTRY_SIZE, INODE_BLOCK_CAPACITY, NAME_LEN};

/// 可执行文件的魔数
pub const EXEC_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];
/// 入口点在文件内的字节偏移
pub const ENTRY_POINT_OFFSET: usize = 24;

struct PackedFile {
    name: String,
    kind: FileKind,
    data: Vec<u8>,
}

/// 逐个收集条目，[`pack`] 一次性排布出镜像。
///
/// [`pack`]: ImagePacker::pack
#[derive(Default)]
pub struct ImagePacker {
    files: Vec<PackedFile>,
}

impl ImagePacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个目录项。目录与设备不占索引节点，`data` 会被忽略。
    pub fn add(&mut self, name: &str, kind: FileKind, data: &[u8]) {
        assert!(name.len() <= NAME_LEN, "name too long: {name}");
        assert!(self.files.len() < DIR_CAPACITY, "boot block is full");
        assert!(
            data.len() <= INODE_BLOCK_CAPACITY * BLOCK_SIZE,
            "file too large: {name}"
        );
        self.files.push(PackedFile {
            name: name.to_string(),
            kind,
            data: data.to_vec(),
        });
    }

    /// 排布镜像：启动块、索引节点区、数据区。
    pub fn pack(&self) -> Vec<u8> {
        let regulars: Vec<&PackedFile> = self
            .files
            .iter()
            .filter(|f| f.kind == FileKind::Regular)
            .collect();
        let data_blocks: usize = regulars
            .iter()
            .map(|f| f.data.len().div_ceil(BLOCK_SIZE))
            .sum();

        let total = 1 + regulars.len() + data_blocks;
        let mut image = vec![0u8; total * BLOCK_SIZE];

        // 启动块计数
        image[0..4].copy_from_slice(&(self.files.len() as u32).to_le_bytes());
        image[4..8].copy_from_slice(&(regulars.len() as u32).to_le_bytes());
        image[8..12].copy_from_slice(&(data_blocks as u32).to_le_bytes());

        // 目录项
        let mut inode = 0u32;
        for (i, file) in self.files.iter().enumerate() {
            let offset = 64 + i * DIR_ENTRY_SIZE;
            image[offset..offset + file.name.len()].copy_from_slice(file.name.as_bytes());

            let raw_kind = match file.kind {
                FileKind::Device => 0u32,
                FileKind::Directory => 1,
                FileKind::Regular => 2,
            };
            image[offset + 32..offset + 36].copy_from_slice(&raw_kind.to_le_bytes());

            if file.kind == FileKind::Regular {
                image[offset + 36..offset + 40].copy_from_slice(&inode.to_le_bytes());
                inode += 1;
            }
        }

        // 索引节点区与数据区
        let data_area = (1 + regulars.len()) * BLOCK_SIZE;
        let mut next_block = 0u32;
        for (i, file) in regulars.iter().enumerate() {
            let inode_offset = (1 + i) * BLOCK_SIZE;
            image[inode_offset..inode_offset + 4]
                .copy_from_slice(&(file.data.len() as u32).to_le_bytes());

            for (j, chunk) in file.data.chunks(BLOCK_SIZE).enumerate() {
                let index_offset = inode_offset + 4 + j * 4;
                image[index_offset..index_offset + 4].copy_from_slice(&next_block.to_le_bytes());

                let chunk_offset = data_area + next_block as usize * BLOCK_SIZE;
                image[chunk_offset..chunk_offset + chunk.len()].copy_from_slice(chunk);
                next_block += 1;
            }
        }

        image
    }
}

/// 构造一个最小的合法可执行文件：魔数开头，入口点在偏移 24 处，
/// 随后是任意负载。
pub fn executable(entry_point: u32, payload: &[u8]) -> Vec<u8> {
    let mut file = vec![0u8; ENTRY_POINT_OFFSET + 4];
    file[..4].copy_from_slice(&EXEC_MAGIC);
    file[ENTRY_POINT_OFFSET..ENTRY_POINT_OFFSET + 4].copy_from_slice(&entry_point.to_le_bytes());
    file.extend_from_slice(payload);
    file
}
