//! Media container detection from leading bytes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// MP4 / QuickTime (`ftyp` box).
    Mp4,
    /// Matroska / WebM (EBML header).
    Matroska,
    Ogg,
    TransportStream,
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Matroska => "matroska",
            ContainerFormat::Ogg => "ogg",
            ContainerFormat::TransportStream => "mpeg-ts",
        };
        f.write_str(name)
    }
}

/// Detect a playable container from the first bytes of a resource.
/// Returns None for anything else (HTML error pages, truncated bodies).
pub fn detect_container(header: &[u8]) -> Option<ContainerFormat> {
    // MP4/MOV: bytes 4..8 == "ftyp"
    if header.len() >= 8 && &header[4..8] == b"ftyp" {
        return Some(ContainerFormat::Mp4);
    }

    if header.len() >= 4 && header[0..4] == [0x1A, 0x45, 0xDF, 0xA3] {
        return Some(ContainerFormat::Matroska);
    }

    if header.len() >= 4 && &header[0..4] == b"OggS" {
        return Some(ContainerFormat::Ogg);
    }

    // MPEG-TS: sync byte at offset 0 and at the next 188-byte packet
    if header.len() > 188 && header[0] == 0x47 && header[188] == 0x47 {
        return Some(ContainerFormat::TransportStream);
    }

    None
}
