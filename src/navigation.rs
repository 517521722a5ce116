use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    PatientData,
    LiveCamera,
    DiagnosisHistory,
    DiagnosisResult,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::PatientData,
        Page::LiveCamera,
        Page::DiagnosisHistory,
        Page::DiagnosisResult,
    ];

    pub fn frame_name(self) -> &'static str {
        match self {
            Page::Home => "TransAIDScreen",
            Page::PatientData => "PatientDataScreen",
            Page::LiveCamera => "LiveCameraScreen",
            Page::DiagnosisHistory => "DiagnosisHistoryScreen",
            Page::DiagnosisResult => "DiagnosisResultScreen",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::PatientData => "Patient Data",
            Page::LiveCamera => "Capture",
            Page::DiagnosisHistory => "Examination History",
            Page::DiagnosisResult => "Examination Result",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::PatientData => "intake",
            Page::LiveCamera => "capture",
            Page::DiagnosisHistory => "history",
            Page::DiagnosisResult => "result",
        }
    }

    pub fn from_name(name: &str) -> Option<Page> {
        let name = name.trim();
        Page::ALL.into_iter().find(|page| {
            page.frame_name().eq_ignore_ascii_case(name) || page.alias().eq_ignore_ascii_case(name)
        })
    }
}

/// Page switching plus the hand-off into the result viewer.
pub trait Navigator {
    fn show_frame(&mut self, page: Page);
    fn load_images(&mut self, first: &Path, second: &Path, label: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRequest {
    pub first: PathBuf,
    pub second: PathBuf,
    pub label: String,
}

#[derive(Debug)]
pub struct Router {
    current: Page,
    pending_result: Option<ResultRequest>,
}

impl Router {
    pub fn new(start: Page) -> Self {
        Self {
            current: start,
            pending_result: None,
        }
    }

    pub fn current(&self) -> Page {
        self.current
    }

    pub fn take_result_request(&mut self) -> Option<ResultRequest> {
        self.pending_result.take()
    }
}

impl Navigator for Router {
    fn show_frame(&mut self, page: Page) {
        log::debug!("show_frame({})", page.frame_name());
        self.current = page;
    }

    fn load_images(&mut self, first: &Path, second: &Path, label: &str) {
        self.pending_result = Some(ResultRequest {
            first: first.to_path_buf(),
            second: second.to_path_buf(),
            label: label.to_string(),
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every call so tests can assert on navigation side effects.
    #[derive(Debug, Default)]
    pub struct RecordingNavigator {
        pub frames: Vec<Page>,
        pub loaded: Vec<ResultRequest>,
    }

    impl Navigator for RecordingNavigator {
        fn show_frame(&mut self, page: Page) {
            self.frames.push(page);
        }

        fn load_images(&mut self, first: &Path, second: &Path, label: &str) {
            self.loaded.push(ResultRequest {
                first: first.to_path_buf(),
                second: second.to_path_buf(),
                label: label.to_string(),
            });
        }
    }

    #[test]
    fn page_names_resolve_both_ways() {
        for page in Page::ALL {
            assert_eq!(Page::from_name(page.frame_name()), Some(page));
        }
        assert_eq!(Page::from_name("History"), Some(Page::DiagnosisHistory));
        assert_eq!(Page::from_name(" intake "), Some(Page::PatientData));
        assert_eq!(Page::from_name("settings"), None);
    }

    #[test]
    fn router_keeps_last_result_request_until_taken() {
        let mut router = Router::new(Page::Home);
        router.load_images(Path::new("a/1.1.png"), Path::new("a/1.2.png"), "Pasien-1");
        router.show_frame(Page::DiagnosisResult);

        assert_eq!(router.current(), Page::DiagnosisResult);
        let request = router.take_result_request().expect("request should be pending");
        assert_eq!(request.label, "Pasien-1");
        assert_eq!(request.second, PathBuf::from("a/1.2.png"));
        assert!(router.take_result_request().is_none());
    }
}
