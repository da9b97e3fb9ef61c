/// Rebases media timestamps so the stream starts at zero. The origin is
/// captured from the first non-zero timestamp seen; anything observed
/// before that passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampOrigin {
    origin: Option<u32>,
}

impl TimestampOrigin {
    pub fn new() -> Self {
        TimestampOrigin::default()
    }

    /// Map an incoming timestamp to its wire value
    pub fn normalize(&mut self, timestamp: u32) -> u32 {
        match self.origin {
            Some(origin) => timestamp.saturating_sub(origin),
            None => {
                if timestamp == 0 {
                    return 0;
                }
                self.origin = Some(timestamp);
                0
            }
        }
    }

    pub fn reset(&mut self) {
        self.origin = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebase_sequence() {
        let mut origin = TimestampOrigin::new();
        let input = [0u32, 0, 1000, 1500, 2200];
        let output: Vec<u32> = input.iter().map(|&t| origin.normalize(t)).collect();
        assert_eq!(output, vec![0, 0, 0, 500, 1200]);
    }

    #[test]
    fn test_never_negative() {
        let mut origin = TimestampOrigin::new();
        assert_eq!(origin.normalize(1000), 0);
        // A timestamp behind the origin clamps to zero
        assert_eq!(origin.normalize(400), 0);
        assert_eq!(origin.normalize(1040), 40);
    }

    #[test]
    fn test_reset_recaptures() {
        let mut origin = TimestampOrigin::new();
        origin.normalize(500);
        origin.reset();
        assert_eq!(origin.normalize(2000), 0);
        assert_eq!(origin.normalize(2100), 100);
    }
}
