use crate::amf::{Amf0Properties, Amf0Value};
use crate::media::MediaKind;
use crate::{Error, Result};

/// Stream parameters announced to the server before media flows
#[derive(Debug, Clone, Default)]
pub struct MetadataParams {
    pub width: u32,
    pub height: u32,
    pub video_codec_id: String,
    pub video_data_rate: u32,
    pub frame_rate: u32,
    pub audio_codec_id: String,
    pub audio_data_rate: u32,
    pub sample_rate: u32,
    pub channel_count: u32,
    /// AudioSpecificConfig bytes from the encoder
    pub audio_config: Vec<u8>,
    /// H.264 sequence parameter set, including the NAL header byte
    pub sps: Vec<u8>,
    /// H.264 picture parameter set, including the NAL header byte
    pub pps: Vec<u8>,
}

/// The onMetaData property map, keys in the order servers expect
pub fn metadata_properties(params: &MetadataParams) -> Amf0Value {
    let mut props = Amf0Properties::new();
    props.set("width", Amf0Value::Number(params.width as f64));
    props.set("height", Amf0Value::Number(params.height as f64));
    props.set("videocodecid", Amf0Value::string("avc1"));
    props.set("framerate", Amf0Value::Number(params.frame_rate as f64));
    props.set("audiocodecid", Amf0Value::string("mp4a"));
    props.set("stereo", Amf0Value::Number(1.0));
    props.set("audiosamplerate", Amf0Value::Number(params.sample_rate as f64));
    props.set("audiosamplesize", Amf0Value::Number(16.0));
    props.into_ecma_array()
}

/// AAC sequence header tag. Fixed payload: the AudioSpecificConfig bytes
/// are not derived from the encoder parameters.
pub fn aac_sequence_header() -> Vec<u8> {
    vec![0xAF, 0x00, 0x15, 0x88]
}

/// AVC sequence header tag: FLV video header (keyframe, AVC, packet type
/// sequence header) followed by an AVCDecoderConfigurationRecord built
/// from the SPS/PPS.
pub fn avc_sequence_header(sps: &[u8], pps: &[u8]) -> Result<Vec<u8>> {
    if sps.len() < 4 {
        return Err(Error::protocol(format!(
            "SPS too short for configuration record: {} bytes",
            sps.len()
        )));
    }
    if pps.is_empty() {
        return Err(Error::protocol("PPS is empty"));
    }

    let mut tag = Vec::with_capacity(16 + sps.len() + pps.len());
    tag.extend_from_slice(&[0x17, 0x00, 0x00, 0x00, 0x00]);

    // AVCDecoderConfigurationRecord: version, profile/compat/level from
    // the SPS, NALU length size 4, one SPS, one PPS
    tag.push(0x01);
    tag.push(sps[1]);
    tag.push(sps[2]);
    tag.push(sps[3]);
    tag.push(0xFF);
    tag.push(0xE1);
    tag.extend_from_slice(&(sps.len() as u16).to_be_bytes());
    tag.extend_from_slice(sps);
    tag.push(0x01);
    tag.extend_from_slice(&(pps.len() as u16).to_be_bytes());
    tag.extend_from_slice(pps);

    Ok(tag)
}

/// Wrap a coded frame in its FLV tag prefix: `AF 01` for AAC raw frames,
/// `17|27 01 00 00 00` for AVC NALUs (composition time 0).
pub fn wrap_frame(kind: MediaKind, data: &[u8]) -> Vec<u8> {
    let mut tag = Vec::with_capacity(data.len() + 5);

    match kind.frame_type_byte() {
        Some(frame_type) => {
            tag.push(frame_type);
            tag.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]);
        }
        None => {
            tag.extend_from_slice(&[0xAF, 0x01]);
        }
    }

    tag.extend_from_slice(data);
    tag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_property_order() {
        let params = MetadataParams {
            width: 1280,
            height: 720,
            frame_rate: 30,
            sample_rate: 44100,
            ..Default::default()
        };

        let meta = metadata_properties(&params);
        let pairs = meta.as_pairs().unwrap();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "width",
                "height",
                "videocodecid",
                "framerate",
                "audiocodecid",
                "stereo",
                "audiosamplerate",
                "audiosamplesize"
            ]
        );

        assert_eq!(
            meta.get_property("videocodecid").and_then(|v| v.as_string()),
            Some("avc1")
        );
        assert_eq!(
            meta.get_property("audiosamplerate").and_then(|v| v.as_number()),
            Some(44100.0)
        );
    }

    #[test]
    fn test_aac_sequence_header_bytes() {
        assert_eq!(aac_sequence_header(), vec![0xAF, 0x00, 0x15, 0x88]);
    }

    #[test]
    fn test_avc_sequence_header_layout() {
        let sps = [0x67, 0x42, 0x00, 0x1E];
        let pps = [0x68, 0xCE, 0x3C, 0x80];

        let tag = avc_sequence_header(&sps, &pps).unwrap();
        let expected: Vec<u8> = vec![
            0x17, 0x00, 0x00, 0x00, 0x00, // FLV video tag header
            0x01, 0x42, 0x00, 0x1E, // record version + profile/compat/level
            0xFF, 0xE1, // NALU length size + SPS count
            0x00, 0x04, 0x67, 0x42, 0x00, 0x1E, // SPS
            0x01, 0x00, 0x04, 0x68, 0xCE, 0x3C, 0x80, // PPS
        ];
        assert_eq!(tag, expected);
    }

    #[test]
    fn test_short_sps_rejected() {
        assert!(avc_sequence_header(&[0x67, 0x42], &[0x68]).is_err());
        assert!(avc_sequence_header(&[0x67, 0x42, 0x00, 0x1E], &[]).is_err());
    }

    #[test]
    fn test_frame_prefixes() {
        assert_eq!(wrap_frame(MediaKind::AacAdts, &[1, 2]), vec![0xAF, 0x01, 1, 2]);
        assert_eq!(
            wrap_frame(MediaKind::H264Key, &[9]),
            vec![0x17, 0x01, 0x00, 0x00, 0x00, 9]
        );
        assert_eq!(
            wrap_frame(MediaKind::H264Inter, &[9]),
            vec![0x27, 0x01, 0x00, 0x00, 0x00, 9]
        );
    }
}
