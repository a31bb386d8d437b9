//! hidraw device access
//!
//! Linux and Android expose raw HID devices as `/dev/input/hidrawN` (or
//! `/dev/hidrawN`). Descriptor and identity queries go through the
//! `HIDIOCG*` ioctls from `linux/hidraw.h`. Other platforms get a source
//! that never finds anything.

use super::{DeviceSource, HidError};

/// Device source for the current platform
pub fn system_source() -> Box<dyn DeviceSource> {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        Box::new(linux::LinuxHidraw)
    }
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    {
        log::warn!("hidraw is not available on this platform, mouse polling disabled");
        Box::new(UnsupportedSource)
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
pub use linux::LinuxHidraw;

/// Source used where hidraw does not exist
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedSource;

impl DeviceSource for UnsupportedSource {
    fn is_readable(&self, _path: &std::path::Path) -> bool {
        false
    }

    fn open(&self, _path: &std::path::Path) -> Result<Box<dyn super::HidrawDevice>, HidError> {
        Err(HidError::PlatformNotSupported)
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux {
    use std::ffi::CString;
    use std::fs::File;
    use std::io::{self, Read};
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::io::AsRawFd;
    use std::path::Path;

    use log::debug;

    use crate::hid::constants::{HID_MAX_DESCRIPTOR_SIZE, RAW_NAME_LEN};
    use crate::hid::{DeviceSource, HidError, HidrawDevice, RawInfo};

    // ========================================================================
    // ioctl encoding (asm-generic/ioctl.h)
    // ========================================================================

    const IOC_READ: u32 = 2;
    const HIDRAW_IOC_TYPE: u32 = b'H' as u32;

    const fn ioc_read(nr: u32, size: usize) -> u32 {
        (IOC_READ << 30) | ((size as u32) << 16) | (HIDRAW_IOC_TYPE << 8) | nr
    }

    #[repr(C)]
    struct ReportDescriptor {
        size: u32,
        value: [u8; HID_MAX_DESCRIPTOR_SIZE],
    }

    #[repr(C)]
    #[derive(Default)]
    struct DevInfo {
        bustype: u32,
        vendor: i16,
        product: i16,
    }

    const HIDIOCGRDESCSIZE: u32 = ioc_read(0x01, std::mem::size_of::<libc::c_int>());
    const HIDIOCGRDESC: u32 = ioc_read(0x02, std::mem::size_of::<ReportDescriptor>());
    const HIDIOCGRAWINFO: u32 = ioc_read(0x03, std::mem::size_of::<DevInfo>());
    const HIDIOCGRAWNAME: u32 = ioc_read(0x04, RAW_NAME_LEN);

    /// Real hidraw nodes
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LinuxHidraw;

    impl DeviceSource for LinuxHidraw {
        fn is_readable(&self, path: &Path) -> bool {
            let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
                return false;
            };
            unsafe { libc::access(c_path.as_ptr(), libc::R_OK) == 0 }
        }

        fn open(&self, path: &Path) -> Result<Box<dyn HidrawDevice>, HidError> {
            let file = File::open(path).map_err(|source| HidError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            debug!("Opened {}", path.display());
            Ok(Box::new(HidrawFile { file }))
        }
    }

    /// An open hidraw node
    struct HidrawFile {
        file: File,
    }

    impl HidrawFile {
        /// Issue a read-direction ioctl that fills `arg`
        fn ioctl<T>(&self, name: &'static str, request: u32, arg: *mut T) -> Result<(), HidError> {
            let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, arg) };
            if rc < 0 {
                return Err(HidError::Ioctl {
                    request: name,
                    source: io::Error::last_os_error(),
                });
            }
            Ok(())
        }
    }

    impl HidrawDevice for HidrawFile {
        fn report_descriptor(&mut self) -> Result<Vec<u8>, HidError> {
            let mut size: libc::c_int = 0;
            self.ioctl("HIDIOCGRDESCSIZE", HIDIOCGRDESCSIZE, &mut size)?;

            let len = usize::try_from(size).unwrap_or(0).min(HID_MAX_DESCRIPTOR_SIZE);
            let mut desc = Box::new(ReportDescriptor {
                size: len as u32,
                value: [0; HID_MAX_DESCRIPTOR_SIZE],
            });
            self.ioctl("HIDIOCGRDESC", HIDIOCGRDESC, &mut *desc)?;

            Ok(desc.value[..len].to_vec())
        }

        fn raw_info(&mut self) -> Result<RawInfo, HidError> {
            let mut info = DevInfo::default();
            self.ioctl("HIDIOCGRAWINFO", HIDIOCGRAWINFO, &mut info)?;
            Ok(RawInfo {
                bustype: info.bustype,
                vendor: info.vendor as u16,
                product: info.product as u16,
            })
        }

        fn raw_name(&mut self) -> Result<String, HidError> {
            let mut buf = [0u8; RAW_NAME_LEN];
            self.ioctl("HIDIOCGRAWNAME", HIDIOCGRAWNAME, buf.as_mut_ptr())?;
            let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
            Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
        }

        fn read_report(&mut self, buf: &mut [u8]) -> Result<usize, HidError> {
            self.file.read(buf).map_err(HidError::Read)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_ioctl_numbers_match_kernel_headers() {
            assert_eq!(HIDIOCGRDESCSIZE, 0x8004_4801);
            assert_eq!(HIDIOCGRDESC, 0x9004_4802);
            assert_eq!(HIDIOCGRAWINFO, 0x8008_4803);
            assert_eq!(HIDIOCGRAWNAME, 0x8100_4804);
        }

        #[test]
        fn test_missing_node_is_not_readable() {
            let source = LinuxHidraw;
            assert!(!source.is_readable(Path::new("/dev/input/hidraw-does-not-exist")));
            assert!(matches!(
                source.open(Path::new("/dev/input/hidraw-does-not-exist")),
                Err(HidError::Open { .. })
            ));
        }
    }
}
