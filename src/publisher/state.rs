/// Publisher lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherState {
    /// Idle; init is accepted
    New,
    /// Connection setup in progress
    Repairing,
    /// Published; media may be sent
    Ready,
    /// A fatal error was reported; init is accepted again
    Fail,
}

impl PublisherState {
    /// init is only legal from an idle or failed publisher
    pub fn accepts_init(&self) -> bool {
        matches!(self, PublisherState::New | PublisherState::Fail)
    }
}
