use crate::engine::presentation::config::Branding;
use crate::engine::presentation::state::PresentationState;
use constants::loading_screen::REPORTED_RAM_KB;

/// One line of the resource log, e.g. `Loaded computerSetupModel       ... 33%`.
pub fn format_load_line(source_name: &str, percent: u32, column_width: usize) -> String {
    format!("Loaded {source_name:<column_width$} ... {percent}%")
}

/// Total resource count as displayed. Zero means the loader has not started yet.
pub fn format_total(to_load: u32) -> String {
    if to_load == 0 {
        "-".to_string()
    } else {
        to_load.to_string()
    }
}

pub fn status_line(loaded: u32, to_load: u32, complete: bool) -> String {
    if complete {
        "FINISHED LOADING RESOURCES".to_string()
    } else {
        format!("LOADING RESOURCES ({loaded}/{})", format_total(to_load))
    }
}

pub fn ram_check_line() -> String {
    format!("Checking RAM : {REPORTED_RAM_KB} OK")
}

pub fn launch_banner(branding: &Branding) -> String {
    format!(
        "All Content Loaded, launching '{}' {}",
        branding.title, branding.version
    )
}

pub fn footer_lines(date: &str) -> Vec<String> {
    vec![
        "Press DEL to enter SETUP , ESC to skip memory test".to_string(),
        date.to_string(),
    ]
}

/// Today's date the way the boot screen footer prints it.
pub fn current_date() -> String {
    chrono::Local::now().format("%m/%d/%Y").to_string()
}

/// Progress counters the boot text is rendered from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCounters {
    pub loaded: u32,
    pub to_load: u32,
}

/// Everything written on the boot screen for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootScreenText {
    pub vendor: Vec<String>,
    pub header_info: Vec<String>,
    pub body: Vec<String>,
    pub log: Vec<String>,
    pub banner: Option<String>,
    pub footer: Vec<String>,
}

impl BootScreenText {
    pub fn compose<'a>(
        branding: &Branding,
        state: PresentationState,
        counters: ProgressCounters,
        log: impl IntoIterator<Item = &'a str>,
        date: &str,
    ) -> Self {
        let mut body = vec![branding.board_line.clone()];
        if state.shows_bios_info() {
            body.push(branding.product_line.clone());
            body.push(ram_check_line());
            body.push(if state == PresentationState::BiosInfoShown {
                "WAIT".to_string()
            } else {
                status_line(counters.loaded, counters.to_load, state.is_load_complete())
            });
        }

        Self {
            vendor: branding.vendor_lines.clone(),
            header_info: vec![branding.release_line.clone(), branding.bios_line.clone()],
            body,
            log: log.into_iter().map(str::to_string).collect(),
            banner: state.is_load_complete().then(|| launch_banner(branding)),
            footer: footer_lines(date),
        }
    }
}

/// Text of the confirmation popup.
pub fn start_popup_lines(branding: &Branding, narrow_viewport: bool) -> Vec<String> {
    let mut lines = vec![branding.title.clone()];
    if narrow_viewport {
        lines.push(String::new());
        lines.push("WARNING: This experience is best viewed on".to_string());
        lines.push("a desktop or laptop computer.".to_string());
        lines.push(String::new());
    }
    lines.push("Click start to begin".to_string());
    lines
}

/// Terminal notice shown by a failure state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    /// Severity label printed in red, e.g. `FATAL ERROR:`.
    pub label: &'static str,
    pub headline: String,
    pub lines: Vec<String>,
}

impl ErrorNotice {
    /// `failure` carries the name and reason of the resource that broke the
    /// session; it is only read in `LoadFailed`.
    pub fn for_state(state: PresentationState, failure: Option<(&str, &str)>) -> Option<Self> {
        match state {
            PresentationState::UnsupportedBrowser => Some(Self {
                label: "FATAL ERROR:",
                headline: "Unsupported Browser Detected".to_string(),
                lines: vec![
                    "Due to a bug in your browser, this website is temporarily inaccessible for anyone using it.".to_string(),
                    String::new(),
                    "In the mean time if you want to access this site you will need to use a different browser.".to_string(),
                ],
            }),
            PresentationState::NoGpu => Some(Self {
                label: "CRITICAL ERROR:",
                headline: "No WebGL Detected".to_string(),
                lines: vec![
                    "WebGL is required to run this site.".to_string(),
                    "Please enable it or switch to a browser which supports WebGL".to_string(),
                ],
            }),
            PresentationState::LoadFailed => {
                let detail = match failure {
                    Some((name, reason)) => format!("Resource '{name}' could not be loaded: {reason}"),
                    None => "A resource could not be loaded.".to_string(),
                };
                Some(Self {
                    label: "FATAL ERROR:",
                    headline: "Resource Load Failed".to_string(),
                    lines: vec![detail, "Reload the page to try again.".to_string()],
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_line_pads_name_to_column() {
        assert_eq!(
            format_load_line("monitorTexture", 67, 24),
            "Loaded monitorTexture           ... 67%"
        );
    }

    #[test]
    fn long_names_are_not_truncated() {
        let line = format_load_line("aVeryLongResourceNameThatOverflows", 100, 24);
        assert!(line.starts_with("Loaded aVeryLongResourceNameThatOverflows ... "));
    }

    #[test]
    fn unknown_total_renders_placeholder() {
        assert_eq!(status_line(0, 0, false), "LOADING RESOURCES (0/-)");
        assert_eq!(status_line(1, 3, false), "LOADING RESOURCES (1/3)");
        assert_eq!(status_line(3, 3, true), "FINISHED LOADING RESOURCES");
    }

    #[test]
    fn booting_hides_bios_info() {
        let branding = Branding::default();
        let text = BootScreenText::compose(
            &branding,
            PresentationState::Booting,
            ProgressCounters::default(),
            std::iter::empty(),
            "01/01/2000",
        );
        assert_eq!(text.body, vec![branding.board_line.clone()]);
        assert_eq!(text.banner, None);
        assert_eq!(text.footer[1], "01/01/2000");
    }

    #[test]
    fn completed_load_shows_banner() {
        let branding = Branding::default();
        let text = BootScreenText::compose(
            &branding,
            PresentationState::LoadComplete,
            ProgressCounters { loaded: 3, to_load: 3 },
            ["Loaded a ... 100%"],
            "01/01/2000",
        );
        assert!(text.body.contains(&"FINISHED LOADING RESOURCES".to_string()));
        assert!(text.body.contains(&ram_check_line()));
        assert_eq!(text.log, vec!["Loaded a ... 100%"]);
        assert!(text.banner.is_some());
    }

    #[test]
    fn mobile_warning_follows_viewport() {
        let branding = Branding::default();
        assert_eq!(start_popup_lines(&branding, false).len(), 2);
        assert!(start_popup_lines(&branding, true)
            .iter()
            .any(|line| line.starts_with("WARNING")));
    }

    #[test]
    fn failure_states_have_distinct_notices() {
        let browser = ErrorNotice::for_state(PresentationState::UnsupportedBrowser, None).unwrap();
        let gpu = ErrorNotice::for_state(PresentationState::NoGpu, None).unwrap();
        let load = ErrorNotice::for_state(PresentationState::LoadFailed, Some(("deskModel", "404"))).unwrap();

        assert_ne!(browser.headline, gpu.headline);
        assert_eq!(browser.headline, "Unsupported Browser Detected");
        assert!(load.lines[0].contains("deskModel"));
        assert!(ErrorNotice::for_state(PresentationState::ResourcesLoading, None).is_none());
    }
}
