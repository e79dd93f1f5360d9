//! Advisory-локи для файла хранилища.
//!
//! Два уровня:
//! - Sidecar "<store>.lock" (fs2, эксклюзив): страхует гонку create/open —
//!   кто первым взял lock, тот и создаёт файл. Снимается по Drop.
//! - Байт-диапазонные локи на самом файле хранилища: эксклюзив на 8-байтовый
//!   слот головы сегмента на время put (и на заголовок — на время резервирования
//!   EOF и flush). На Linux — OFD-локи (принадлежат описанию файла, поэтому два
//!   хэндла одного процесса тоже исключают друг друга); на прочих unix — fcntl
//!   F_SETLKW (процессная семантика). Вне unix диапазонные локи деградируют до
//!   эксклюзива на sidecar-файле: все писатели сериализуются, формат совместим.

use crate::errors::Result;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Путь sidecar-локфайла: "<store>.lock" рядом с файлом хранилища.
pub fn sidecar_lock_path(store_path: &Path) -> PathBuf {
    let mut os = store_path.as_os_str().to_os_string();
    os.push(".lock");
    PathBuf::from(os)
}

pub fn open_sidecar_lock(store_path: &Path) -> Result<File> {
    let p = sidecar_lock_path(store_path);
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(&p)?;
    Ok(f)
}

/// Эксклюзивный lock на весь файл (sidecar). Блокируется до получения.
pub struct FileLockGuard<'a> {
    file: &'a File,
}

impl<'a> FileLockGuard<'a> {
    pub fn exclusive(file: &'a File) -> Result<Self> {
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for FileLockGuard<'_> {
    fn drop(&mut self) {
        // Ошибки unlock в Drop игнорируются сознательно.
        let _ = self.file.unlock();
    }
}

#[cfg(unix)]
mod sys {
    use std::fs::File;
    use std::io;
    use std::os::unix::io::AsRawFd;

    #[cfg(target_os = "linux")]
    const CMD_SETLKW: libc::c_int = libc::F_OFD_SETLKW;
    #[cfg(target_os = "linux")]
    const CMD_SETLK: libc::c_int = libc::F_OFD_SETLK;
    #[cfg(not(target_os = "linux"))]
    const CMD_SETLKW: libc::c_int = libc::F_SETLKW;
    #[cfg(not(target_os = "linux"))]
    const CMD_SETLK: libc::c_int = libc::F_SETLK;

    fn apply(
        file: &File,
        cmd: libc::c_int,
        lock_type: libc::c_short,
        offset: u64,
        len: u64,
    ) -> io::Result<()> {
        let mut fl: libc::flock = unsafe { std::mem::zeroed() };
        fl.l_type = lock_type;
        fl.l_whence = libc::SEEK_SET as libc::c_short;
        fl.l_start = offset as libc::off_t;
        fl.l_len = len as libc::off_t;
        // OFD-локи требуют l_pid == 0 (zeroed выше).
        loop {
            let rc = unsafe { libc::fcntl(file.as_raw_fd(), cmd, &fl) };
            if rc == 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    pub fn lock_exclusive(file: &File, offset: u64, len: u64) -> io::Result<()> {
        apply(file, CMD_SETLKW, libc::F_WRLCK as libc::c_short, offset, len)
    }

    pub fn unlock(file: &File, offset: u64, len: u64) -> io::Result<()> {
        apply(file, CMD_SETLK, libc::F_UNLCK as libc::c_short, offset, len)
    }
}

/// Эксклюзивный байт-диапазонный lock; снимается по Drop на всех путях выхода.
pub struct RangeLockGuard<'a> {
    #[cfg(unix)]
    file: &'a File,
    #[cfg(unix)]
    offset: u64,
    #[cfg(unix)]
    len: u64,
    #[cfg(not(unix))]
    _whole: FileLockGuard<'a>,
}

/// Взять эксклюзивный lock на диапазон [offset, offset+len) файла хранилища.
/// Блокируется до получения.
#[allow(unused_variables)]
pub fn lock_range_exclusive<'a>(
    store_file: &'a File,
    sidecar: &'a File,
    offset: u64,
    len: u64,
) -> Result<RangeLockGuard<'a>> {
    #[cfg(unix)]
    {
        sys::lock_exclusive(store_file, offset, len)?;
        Ok(RangeLockGuard {
            file: store_file,
            offset,
            len,
        })
    }
    #[cfg(not(unix))]
    {
        Ok(RangeLockGuard {
            _whole: FileLockGuard::exclusive(sidecar)?,
        })
    }
}

#[cfg(unix)]
impl Drop for RangeLockGuard<'_> {
    fn drop(&mut self) {
        let _ = sys::unlock(self.file, self.offset, self.len);
    }
}
