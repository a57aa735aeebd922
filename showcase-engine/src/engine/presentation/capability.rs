use crate::engine::channel::payloads::CapabilityCheck;
use constants::loading_screen::{NARROW_VIEWPORT_WIDTH, UNSUPPORTED_BROWSER_MARKERS};
use serde::Serialize;

/// Environment queries the loading screen needs at mount and on resize.
pub trait EnvironmentProbe {
    /// The browser is known to break the showcase.
    fn is_unsupported_browser(&self) -> bool;

    /// A GPU rendering context can be acquired.
    fn has_gpu_context(&self) -> bool;

    /// Current viewport width in logical pixels.
    fn viewport_width(&self) -> f32;

    /// The loading screen should be skipped.
    fn debug_requested(&self) -> bool {
        false
    }
}

/// Capability flags shown by the loading screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityFlags {
    pub unsupported_browser: bool,
    pub missing_gpu_capability: bool,
    /// Advisory only, never gates progression.
    pub narrow_viewport: bool,
}

impl From<CapabilityFlags> for CapabilityCheck {
    fn from(flags: CapabilityFlags) -> Self {
        Self {
            unsupported_browser: flags.unsupported_browser,
            missing_gpu_capability: flags.missing_gpu_capability,
            narrow_viewport: flags.narrow_viewport,
        }
    }
}

/// Outcome of the one-time capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityVerdict {
    UnsupportedBrowser,
    NoGpu,
    Supported,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapabilityReport {
    pub flags: CapabilityFlags,
    pub debug_skip: bool,
}

impl CapabilityReport {
    pub fn verdict(&self) -> CapabilityVerdict {
        if self.flags.unsupported_browser {
            CapabilityVerdict::UnsupportedBrowser
        } else if self.flags.missing_gpu_capability {
            CapabilityVerdict::NoGpu
        } else {
            CapabilityVerdict::Supported
        }
    }
}

/// Run the capability check. The GPU is only probed when the browser passes.
pub fn check_capabilities(probe: &dyn EnvironmentProbe, narrow_threshold: f32) -> CapabilityReport {
    let unsupported_browser = probe.is_unsupported_browser();
    let missing_gpu_capability = !unsupported_browser && !probe.has_gpu_context();

    CapabilityReport {
        flags: CapabilityFlags {
            unsupported_browser,
            missing_gpu_capability,
            narrow_viewport: is_narrow(probe.viewport_width(), narrow_threshold),
        },
        debug_skip: probe.debug_requested(),
    }
}

pub fn is_narrow(width: f32, threshold: f32) -> bool {
    width < threshold
}

/// Match a user agent string against the known-incompatible browsers.
pub fn user_agent_is_unsupported(user_agent: &str) -> bool {
    let user_agent = user_agent.to_lowercase();
    UNSUPPORTED_BROWSER_MARKERS
        .iter()
        .any(|marker| user_agent.contains(marker))
}

/// Probe for native builds: no browser, GPU presence decided by the renderer.
#[derive(Debug, Clone, Copy)]
pub struct NativeProbe {
    gpu_available: bool,
    viewport_width: f32,
    debug: bool,
}

impl NativeProbe {
    pub fn new(gpu_available: bool, viewport_width: f32, debug: bool) -> Self {
        Self {
            gpu_available,
            viewport_width,
            debug,
        }
    }

    /// Reads the debug flag from `SHOWCASE_DEBUG`.
    pub fn from_env(gpu_available: bool, viewport_width: Option<f32>) -> Self {
        let debug = std::env::var_os(constants::loading_screen::DEBUG_ENV_VAR).is_some();
        Self::new(
            gpu_available,
            viewport_width.unwrap_or(NARROW_VIEWPORT_WIDTH),
            debug,
        )
    }
}

impl EnvironmentProbe for NativeProbe {
    fn is_unsupported_browser(&self) -> bool {
        false
    }

    fn has_gpu_context(&self) -> bool {
        self.gpu_available
    }

    fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    fn debug_requested(&self) -> bool {
        self.debug
    }
}

/// Probe backed by the hosting browser window.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct WebProbe;

#[cfg(target_arch = "wasm32")]
impl EnvironmentProbe for WebProbe {
    fn is_unsupported_browser(&self) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        window
            .navigator()
            .user_agent()
            .map(|agent| user_agent_is_unsupported(&agent))
            .unwrap_or(false)
    }

    fn has_gpu_context(&self) -> bool {
        use wasm_bindgen::{JsCast, JsValue};

        let Some(window) = web_sys::window() else {
            return false;
        };

        // WebGPU first, then fall back to asking a throwaway canvas for WebGL.
        let navigator = window.navigator();
        if js_sys::Reflect::has(&navigator, &JsValue::from_str("gpu")).unwrap_or(false) {
            return true;
        }

        let Some(canvas) = window
            .document()
            .and_then(|document| document.create_element("canvas").ok())
            .and_then(|element| element.dyn_into::<web_sys::HtmlCanvasElement>().ok())
        else {
            return false;
        };

        ["webgl2", "webgl", "experimental-webgl"]
            .iter()
            .any(|kind| matches!(canvas.get_context(kind), Ok(Some(_))))
    }

    fn viewport_width(&self) -> f32 {
        web_sys::window()
            .and_then(|window| window.inner_width().ok())
            .and_then(|width| width.as_f64())
            .map_or(NARROW_VIEWPORT_WIDTH, |width| width as f32)
    }

    fn debug_requested(&self) -> bool {
        let Some(search) = web_sys::window().and_then(|window| window.location().search().ok()) else {
            return false;
        };
        web_sys::UrlSearchParams::new_with_str(&search)
            .map(|params| params.has(constants::loading_screen::DEBUG_QUERY_PARAM))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeProbe {
        unsupported: bool,
        gpu: bool,
        width: f32,
        gpu_probed: Cell<bool>,
    }

    impl FakeProbe {
        fn new(unsupported: bool, gpu: bool, width: f32) -> Self {
            Self {
                unsupported,
                gpu,
                width,
                gpu_probed: Cell::new(false),
            }
        }
    }

    impl EnvironmentProbe for FakeProbe {
        fn is_unsupported_browser(&self) -> bool {
            self.unsupported
        }

        fn has_gpu_context(&self) -> bool {
            self.gpu_probed.set(true);
            self.gpu
        }

        fn viewport_width(&self) -> f32 {
            self.width
        }
    }

    #[test]
    fn unsupported_browser_short_circuits_gpu_probe() {
        let probe = FakeProbe::new(true, false, 1280.0);
        let report = check_capabilities(&probe, NARROW_VIEWPORT_WIDTH);

        assert_eq!(report.verdict(), CapabilityVerdict::UnsupportedBrowser);
        assert!(!report.flags.missing_gpu_capability);
        assert!(!probe.gpu_probed.get());
    }

    #[test]
    fn missing_gpu_reported_when_browser_passes() {
        let probe = FakeProbe::new(false, false, 1280.0);
        let report = check_capabilities(&probe, NARROW_VIEWPORT_WIDTH);

        assert_eq!(report.verdict(), CapabilityVerdict::NoGpu);
        assert!(probe.gpu_probed.get());
    }

    #[test]
    fn narrow_viewport_does_not_affect_verdict() {
        let probe = FakeProbe::new(false, true, 390.0);
        let report = check_capabilities(&probe, NARROW_VIEWPORT_WIDTH);

        assert!(report.flags.narrow_viewport);
        assert_eq!(report.verdict(), CapabilityVerdict::Supported);
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(is_narrow(767.9, 768.0));
        assert!(!is_narrow(768.0, 768.0));
    }

    #[test]
    fn detects_firefox_user_agents() {
        assert!(user_agent_is_unsupported(
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
        ));
        assert!(!user_agent_is_unsupported(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 Safari/605.1.15"
        ));
    }
}
