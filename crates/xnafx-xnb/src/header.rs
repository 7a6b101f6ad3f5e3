use crate::error::XnbError;
use crate::reader::ContentReader;

/// Bytes before the payload of an uncompressed file: magic, platform, version, flags, size.
pub const HEADER_LEN: usize = 10;
/// Compressed files add the decompressed size.
pub const COMPRESSED_HEADER_LEN: usize = 14;

const FLAG_COMPRESSED: u8 = 0x80;
const FLAG_HIDEF: u8 = 0x01;

/// Target platform byte following the `XNB` magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Xbox360,
    WindowsPhone,
    Ios,
    Android,
    DesktopGl,
    MacOsX,
    WindowsStoreApp,
    NativeClient,
    Ouya,
    PlayStationMobile,
    WindowsPhone8,
    RaspberryPi,
    PlayStation4,
    WindowsGl,
    Linux,
}

impl Platform {
    pub fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            b'w' => Platform::Windows,
            b'x' => Platform::Xbox360,
            b'm' => Platform::WindowsPhone,
            b'i' => Platform::Ios,
            b'a' => Platform::Android,
            b'd' => Platform::DesktopGl,
            b'X' => Platform::MacOsX,
            b'W' => Platform::WindowsStoreApp,
            b'n' => Platform::NativeClient,
            b'u' => Platform::Ouya,
            b'p' => Platform::PlayStationMobile,
            b'M' => Platform::WindowsPhone8,
            b'r' => Platform::RaspberryPi,
            b'P' => Platform::PlayStation4,
            b'g' => Platform::WindowsGl,
            b'l' => Platform::Linux,
            _ => return None,
        })
    }

    pub fn id(self) -> u8 {
        match self {
            Platform::Windows => b'w',
            Platform::Xbox360 => b'x',
            Platform::WindowsPhone => b'm',
            Platform::Ios => b'i',
            Platform::Android => b'a',
            Platform::DesktopGl => b'd',
            Platform::MacOsX => b'X',
            Platform::WindowsStoreApp => b'W',
            Platform::NativeClient => b'n',
            Platform::Ouya => b'u',
            Platform::PlayStationMobile => b'p',
            Platform::WindowsPhone8 => b'M',
            Platform::RaspberryPi => b'r',
            Platform::PlayStation4 => b'P',
            Platform::WindowsGl => b'g',
            Platform::Linux => b'l',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XnbHeader {
    pub platform: Platform,
    pub version: u8,
    pub flags: u8,
    /// Total file size, header included.
    pub file_size: u32,
    /// Present only for compressed files.
    pub decompressed_size: Option<u32>,
}

impl XnbHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    pub fn is_hidef(&self) -> bool {
        self.flags & FLAG_HIDEF != 0
    }

    pub fn header_len(&self) -> usize {
        if self.is_compressed() {
            COMPRESSED_HEADER_LEN
        } else {
            HEADER_LEN
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, XnbError> {
        let mut r = ContentReader::new(bytes);
        let magic = r.read_bytes(3)?;
        if magic != b"XNB" {
            return Err(XnbError::BadMagic {
                found: [magic[0], magic[1], magic[2]],
            });
        }
        let platform_id = r.read_u8()?;
        let platform = Platform::from_id(platform_id)
            .ok_or(XnbError::UnknownPlatform(char::from(platform_id)))?;
        let version = r.read_u8()?;
        if version != 4 && version != 5 {
            return Err(XnbError::UnsupportedVersion(version));
        }
        let flags = r.read_u8()?;
        let file_size = r.read_u32()?;
        let decompressed_size = if flags & FLAG_COMPRESSED != 0 {
            Some(r.read_u32()?)
        } else {
            None
        };
        Ok(Self {
            platform,
            version,
            flags,
            file_size,
            decompressed_size,
        })
    }
}
