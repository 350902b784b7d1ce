/// Transport-level progress of one upload.
///
/// The percentage never goes backwards and only reaches 100 once the
/// transport reports completion, whatever the progress events claim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadProgress {
    percent: u8,
    uploading: bool,
    error: Option<String>,
}

impl UploadProgress {
    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn start(&mut self) {
        self.percent = 0;
        self.uploading = true;
        self.error = None;
    }

    /// Records a progress event of `loaded` out of `total` bytes.
    pub fn advance(&mut self, loaded: u64, total: u64) {
        if !self.uploading || total == 0 {
            return;
        }
        let pct = (loaded.min(total) * 100 / total).min(99) as u8;
        self.percent = self.percent.max(pct);
    }

    pub fn complete(&mut self) {
        self.percent = 100;
        self.uploading = false;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.uploading = false;
        self.error = Some(message.into());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotonic_and_capped_until_complete() {
        let mut progress = UploadProgress::default();
        progress.start();
        progress.advance(50, 100);
        assert_eq!(progress.percent(), 50);
        progress.advance(20, 100);
        assert_eq!(progress.percent(), 50);
        progress.advance(100, 100);
        assert_eq!(progress.percent(), 99);
        progress.complete();
        assert_eq!(progress.percent(), 100);
        assert!(!progress.is_uploading());
    }

    #[test]
    fn events_outside_an_upload_are_ignored() {
        let mut progress = UploadProgress::default();
        progress.advance(10, 20);
        assert_eq!(progress.percent(), 0);
        progress.start();
        progress.advance(10, 0);
        assert_eq!(progress.percent(), 0);
    }

    #[test]
    fn failure_stops_the_upload_and_keeps_the_message() {
        let mut progress = UploadProgress::default();
        progress.start();
        progress.advance(30, 100);
        progress.fail("Network error");
        assert!(!progress.is_uploading());
        assert_eq!(progress.error(), Some("Network error"));

        progress.start();
        assert_eq!(progress.error(), None);
        assert_eq!(progress.percent(), 0);
    }
}
