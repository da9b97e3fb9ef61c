/// Kind of coded media frame handed to the send path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// H.264 keyframe (IDR)
    H264Key,
    /// H.264 inter frame
    H264Inter,
    /// AAC frame with ADTS framing
    AacAdts,
    /// AAC frame with LATM framing
    AacLatm,
}

impl MediaKind {
    pub fn is_video(&self) -> bool {
        matches!(self, MediaKind::H264Key | MediaKind::H264Inter)
    }

    pub fn is_audio(&self) -> bool {
        !self.is_video()
    }

    /// FLV video tag frame-type/codec byte; audio kinds have none
    pub fn frame_type_byte(&self) -> Option<u8> {
        match self {
            MediaKind::H264Key => Some(0x17),
            MediaKind::H264Inter => Some(0x27),
            MediaKind::AacAdts | MediaKind::AacLatm => None,
        }
    }
}
