mod engine;
mod rpc;

use engine::core::app_setup::create_app;

#[cfg(target_arch = "wasm32")]
use engine::presentation::capability::{CapabilityVerdict, WebProbe, check_capabilities};

fn main() {
    #[cfg(target_arch = "wasm32")]
    {
        // The renderer cannot start without a GPU, so the host page shows the
        // notice instead of the overlay.
        let report = check_capabilities(&WebProbe, constants::loading_screen::NARROW_VIEWPORT_WIDTH);
        if report.verdict() == CapabilityVerdict::NoGpu {
            rpc::web_rpc::report_capabilities_to_host(report.flags.into());
            return;
        }

        let mut app = create_app();
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_app().run();
    }
}
