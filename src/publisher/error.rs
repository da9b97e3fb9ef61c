use std::fmt;

/// Failure category reported through the listener. Every fatal condition
/// maps to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishErrorKind {
    /// init called while a connection is active
    IllegalState,
    /// Target URL failed to parse
    UrlIncorrect,
    /// TCP connect failed or timed out
    ConnectServerFail,
    HandshakeFail,
    SetChunkSizeFail,
    ConnectCmdFail,
    ReleaseCmdFail,
    FcPublishCmdFail,
    CreateStreamCmdFail,
    PublishCmdFail,
    /// Bad server reply or a fatal condition in the read loop
    ReceiveRtmpFail,
    /// Internal task or queue stopped unexpectedly
    ThreadInterrupt,
    SendMetaDataFail,
    SendAudioHeaderFail,
    SendVideoHeaderFail,
    SendDataFail,
}

impl fmt::Display for PublishErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishErrorKind::IllegalState => "IllegalState",
            PublishErrorKind::UrlIncorrect => "UrlIncorrect",
            PublishErrorKind::ConnectServerFail => "ConnectServerFail",
            PublishErrorKind::HandshakeFail => "HandshakeFail",
            PublishErrorKind::SetChunkSizeFail => "SetChunkSizeFail",
            PublishErrorKind::ConnectCmdFail => "ConnectCmdFail",
            PublishErrorKind::ReleaseCmdFail => "ReleaseCmdFail",
            PublishErrorKind::FcPublishCmdFail => "FcPublishCmdFail",
            PublishErrorKind::CreateStreamCmdFail => "CreateStreamCmdFail",
            PublishErrorKind::PublishCmdFail => "PublishCmdFail",
            PublishErrorKind::ReceiveRtmpFail => "ReceiveRtmpFail",
            PublishErrorKind::ThreadInterrupt => "ThreadInterrupt",
            PublishErrorKind::SendMetaDataFail => "SendMetaDataFail",
            PublishErrorKind::SendAudioHeaderFail => "SendAudioHeaderFail",
            PublishErrorKind::SendVideoHeaderFail => "SendVideoHeaderFail",
            PublishErrorKind::SendDataFail => "SendDataFail",
        };
        write!(f, "{}", name)
    }
}
