use crate::engine::channel::event_channel::EventChannel;
use crate::engine::presentation::boot_text::{BootScreenText, current_date};
use crate::engine::presentation::config::LoadingScreenConfig;
use crate::engine::presentation::controller::PresentationController;
use crate::engine::presentation::loading_screen::LoadingScreen;
use crate::engine::presentation::state::PresentationState;
use crate::engine::presentation::visuals::VisualParams;
use bevy::prelude::*;
use bevy::ui::FocusPolicy;
use bevy::window::{PrimaryWindow, WindowResized};
use constants::loading_screen::{CURSOR_BLINK_SECS, OVERLAY_FADE_SECS};
use constants::theme::{
    BOOT_FONT_SIZE, BOOT_TEXT, FATAL_RED, OVERLAY_BACKGROUND, POPUP_BORDER, POPUP_BORDER_WIDTH,
    VENDOR_GREEN,
};

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::presentation::capability::NativeProbe;
#[cfg(target_arch = "wasm32")]
use crate::engine::presentation::capability::WebProbe;

/// Root node of the loading screen.
#[derive(Component)]
pub struct LoadingOverlay;

/// Which block of boot text a `Text` node renders.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
enum BootSection {
    Vendor,
    HeaderInfo,
    Body,
    Footer,
}

#[derive(Component)]
struct StandaloneCursor;

#[derive(Component)]
struct StartPopup;

#[derive(Component)]
struct StartPopupText;

#[derive(Component)]
struct StartButton;

#[derive(Component)]
struct ErrorPopup;

#[derive(Component)]
struct ErrorLabel;

#[derive(Component)]
struct ErrorPopupText;

/// Opacity group a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FadeLayer {
    Overlay,
    BootText,
    StartPopup,
    ErrorPopup,
    Cursor,
}

/// Text colour at full opacity.
#[derive(Component, Clone, Copy)]
struct Faded {
    layer: FadeLayer,
    base: Color,
}

impl Faded {
    fn new(layer: FadeLayer, base: Color) -> Self {
        Self { layer, base }
    }
}

/// Background and border colours of a container at full opacity.
#[derive(Component, Clone, Copy)]
struct FadedBox {
    layer: FadeLayer,
    background: Color,
    border: Color,
}

impl FadedBox {
    fn new(layer: FadeLayer, background: Color, border: Color) -> Self {
        Self {
            layer,
            background,
            border,
        }
    }
}

/// Displayed opacities, eased towards the machine's [`VisualParams`].
#[derive(Resource, Debug, Clone)]
pub struct OverlayFade {
    overlay: f32,
    scale: f32,
    boot_text: f32,
    start_popup: f32,
    error_popup: f32,
    date: String,
}

impl Default for OverlayFade {
    fn default() -> Self {
        Self {
            overlay: 1.0,
            scale: 1.0,
            boot_text: 1.0,
            start_popup: 0.0,
            error_popup: 0.0,
            date: current_date(),
        }
    }
}

impl OverlayFade {
    fn ease(&mut self, target: &VisualParams, delta_secs: f32) {
        let step = delta_secs / OVERLAY_FADE_SECS;
        self.overlay = approach(self.overlay, target.overlay_opacity, step);
        self.boot_text = approach(self.boot_text, target.boot_text_opacity, step);
        self.start_popup = approach(self.start_popup, target.start_popup_opacity, step);
        self.error_popup = approach(self.error_popup, target.error_popup_opacity, step);
        // Scale moves over the same duration as opacity.
        let scale_step = step * (target.overlay_scale - 1.0).abs().max(f32::EPSILON);
        self.scale = approach(self.scale, target.overlay_scale, scale_step);
    }

    fn alpha(&self, layer: FadeLayer, cursor_on: bool) -> f32 {
        let own = match layer {
            FadeLayer::Overlay => 1.0,
            FadeLayer::BootText => self.boot_text,
            FadeLayer::StartPopup => self.start_popup,
            FadeLayer::ErrorPopup => self.error_popup,
            FadeLayer::Cursor => {
                if cursor_on {
                    1.0
                } else {
                    0.0
                }
            }
        };
        own * self.overlay
    }
}

/// Move `current` towards `target` by at most `step`.
fn approach(current: f32, target: f32, step: f32) -> f32 {
    if (target - current).abs() <= step {
        target
    } else {
        current + step.copysign(target - current)
    }
}

fn cursor_visible(elapsed_secs: f32) -> bool {
    (elapsed_secs / CURSOR_BLINK_SECS) as u32 % 2 == 0
}

fn section_text(text: &BootScreenText, section: BootSection, cursor_on: bool) -> String {
    match section {
        BootSection::Vendor => text.vendor.join("\n"),
        BootSection::HeaderInfo => text.header_info.join("\n"),
        BootSection::Footer => text.footer.join("\n"),
        BootSection::Body => {
            let mut lines = text.body.clone();
            lines.push(String::new());
            lines.extend(text.log.iter().cloned());
            lines.push(String::new());
            if let Some(banner) = &text.banner {
                lines.push(banner.clone());
                lines.push(String::new());
            }
            lines.push((if cursor_on { "_" } else { " " }).to_string());
            lines.join("\n")
        }
    }
}

fn boot_font() -> TextFont {
    TextFont {
        font_size: BOOT_FONT_SIZE,
        ..default()
    }
}

fn popup_node() -> Node {
    Node {
        position_type: PositionType::Absolute,
        align_self: AlignSelf::Center,
        justify_self: JustifySelf::Center,
        max_width: Val::Px(500.0),
        padding: UiRect::all(Val::Px(48.0)),
        border: UiRect::all(Val::Px(POPUP_BORDER_WIDTH)),
        flex_direction: FlexDirection::Column,
        row_gap: Val::Px(16.0),
        ..default()
    }
}

// Spawns the full-screen boot overlay with its popups hidden
pub fn spawn_loading_overlay(mut commands: Commands) {
    commands
        .spawn((
            LoadingOverlay,
            Name::new("LoadingOverlay"),
            BackgroundColor(OVERLAY_BACKGROUND),
            FadedBox::new(FadeLayer::Overlay, OVERLAY_BACKGROUND, Color::NONE),
            GlobalZIndex(i32::MAX),
            FocusPolicy::Block,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                padding: UiRect::all(Val::Px(48.0)),
                display: Display::Grid,
                ..default()
            },
        ))
        .with_children(|overlay| {
            overlay
                .spawn(Node {
                    flex_direction: FlexDirection::Column,
                    justify_content: JustifyContent::SpaceBetween,
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    ..default()
                })
                .with_children(|screen| {
                    screen
                        .spawn(Node {
                            flex_direction: FlexDirection::Row,
                            column_gap: Val::Px(32.0),
                            ..default()
                        })
                        .with_children(|header| {
                            header.spawn((
                                BootSection::Vendor,
                                Text::default(),
                                boot_font(),
                                TextColor(VENDOR_GREEN),
                                Faded::new(FadeLayer::BootText, VENDOR_GREEN),
                            ));
                            header.spawn((
                                BootSection::HeaderInfo,
                                Text::default(),
                                boot_font(),
                                TextColor(BOOT_TEXT),
                                Faded::new(FadeLayer::BootText, BOOT_TEXT),
                            ));
                        });

                    screen.spawn((
                        BootSection::Body,
                        Text::default(),
                        boot_font(),
                        TextColor(BOOT_TEXT),
                        Faded::new(FadeLayer::BootText, BOOT_TEXT),
                        Node {
                            flex_grow: 1.0,
                            margin: UiRect::vertical(Val::Px(32.0)),
                            ..default()
                        },
                    ));

                    screen.spawn((
                        BootSection::Footer,
                        Text::default(),
                        boot_font(),
                        TextColor(BOOT_TEXT),
                        Faded::new(FadeLayer::BootText, BOOT_TEXT),
                    ));
                });

            overlay.spawn((
                StandaloneCursor,
                Text::new("_"),
                boot_font(),
                TextColor(BOOT_TEXT),
                Faded::new(FadeLayer::Cursor, BOOT_TEXT),
                Visibility::Hidden,
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(48.0),
                    top: Val::Px(48.0),
                    ..default()
                },
            ));

            overlay
                .spawn((
                    StartPopup,
                    Name::new("StartPopup"),
                    BackgroundColor(OVERLAY_BACKGROUND),
                    BorderColor(POPUP_BORDER),
                    FadedBox::new(FadeLayer::StartPopup, OVERLAY_BACKGROUND, POPUP_BORDER),
                    Visibility::Hidden,
                    popup_node(),
                ))
                .with_children(|popup| {
                    popup.spawn((
                        StartPopupText,
                        Text::default(),
                        boot_font(),
                        TextColor(BOOT_TEXT),
                        Faded::new(FadeLayer::StartPopup, BOOT_TEXT),
                    ));
                    popup
                        .spawn((
                            StartButton,
                            Button,
                            Name::new("StartButton"),
                            BorderColor(POPUP_BORDER),
                            FadedBox::new(FadeLayer::StartPopup, Color::NONE, POPUP_BORDER),
                            Node {
                                align_self: AlignSelf::FlexEnd,
                                padding: UiRect::axes(Val::Px(24.0), Val::Px(8.0)),
                                border: UiRect::all(Val::Px(2.0)),
                                ..default()
                            },
                        ))
                        .with_children(|button| {
                            button.spawn((
                                Text::new("START"),
                                boot_font(),
                                TextColor(BOOT_TEXT),
                                Faded::new(FadeLayer::StartPopup, BOOT_TEXT),
                            ));
                        });
                });

            overlay
                .spawn((
                    ErrorPopup,
                    Name::new("ErrorPopup"),
                    BackgroundColor(OVERLAY_BACKGROUND),
                    BorderColor(POPUP_BORDER),
                    FadedBox::new(FadeLayer::ErrorPopup, OVERLAY_BACKGROUND, POPUP_BORDER),
                    Visibility::Hidden,
                    popup_node(),
                ))
                .with_children(|popup| {
                    popup.spawn((
                        ErrorLabel,
                        Text::default(),
                        boot_font(),
                        TextColor(FATAL_RED),
                        Faded::new(FadeLayer::ErrorPopup, FATAL_RED),
                    ));
                    popup.spawn((
                        ErrorPopupText,
                        Text::default(),
                        boot_font(),
                        TextColor(BOOT_TEXT),
                        Faded::new(FadeLayer::ErrorPopup, BOOT_TEXT),
                    ));
                });
        });
}

/// Runs the one-time capability check against the host environment.
pub fn mount_loading_screen(
    controller: Res<PresentationController>,
    windows: Query<&Window, With<PrimaryWindow>>,
    adapter: Option<Res<bevy::render::renderer::RenderAdapterInfo>>,
) {
    #[cfg(target_arch = "wasm32")]
    let probe = {
        let _ = (&windows, &adapter);
        WebProbe
    };

    #[cfg(not(target_arch = "wasm32"))]
    let probe = NativeProbe::from_env(
        adapter.is_some(),
        windows.single().ok().map(|window| window.width()),
    );

    match controller.mount(&probe) {
        Ok(state) => info!("Loading screen mounted in {:?}", state),
        Err(e) => error!("Loading screen failed to mount: {}", e),
    }
}

pub fn track_viewport_width(
    mut resized: EventReader<WindowResized>,
    controller: Res<PresentationController>,
) {
    if let Some(event) = resized.read().last() {
        controller.set_viewport_width(event.width);
    }
}

pub fn tick_loading_screen(time: Res<Time>, controller: Res<PresentationController>) {
    controller.tick(time.delta());
}

/// START button or Enter confirms once the prompt is showing.
pub fn handle_start_input(
    controller: Res<PresentationController>,
    buttons: Query<&Interaction, (Changed<Interaction>, With<StartButton>)>,
    keys: Res<ButtonInput<KeyCode>>,
) {
    if controller.state() != PresentationState::AwaitingUserStart {
        return;
    }

    let clicked = buttons.iter().any(|i| *i == Interaction::Pressed);
    if clicked || keys.just_pressed(KeyCode::Enter) {
        match controller.confirm_start() {
            Ok(_) => info!("✓ Start confirmed, handing off to scene"),
            Err(e) => warn!("Start ignored: {}", e),
        }
    }
}

/// Writes the current boot text into the overlay's text nodes.
pub fn update_overlay_text(
    controller: Res<PresentationController>,
    fade: Res<OverlayFade>,
    time: Res<Time>,
    mut sections: Query<(&BootSection, &mut Text)>,
    mut start_text: Query<&mut Text, (With<StartPopupText>, Without<BootSection>)>,
    mut error_label: Query<
        &mut Text,
        (With<ErrorLabel>, Without<BootSection>, Without<StartPopupText>),
    >,
    mut error_text: Query<
        &mut Text,
        (
            With<ErrorPopupText>,
            Without<BootSection>,
            Without<StartPopupText>,
            Without<ErrorLabel>,
        ),
    >,
) {
    let cursor_on = cursor_visible(time.elapsed_secs());
    let (boot, start_lines, notice) = controller.with_screen(|screen: &LoadingScreen| {
        (
            screen.boot_text(&fade.date),
            screen.start_popup_text(),
            screen.error_notice(),
        )
    });

    for (section, mut text) in &mut sections {
        let content = section_text(&boot, *section, cursor_on);
        if text.0 != content {
            text.0 = content;
        }
    }
    if let Ok(mut text) = start_text.single_mut() {
        let content = start_lines.join("\n");
        if text.0 != content {
            text.0 = content;
        }
    }
    if let Some(notice) = notice {
        if let Ok(mut label) = error_label.single_mut() {
            label.0 = format!("{} {}", notice.label, notice.headline);
        }
        if let Ok(mut text) = error_text.single_mut() {
            text.0 = notice.lines.join("\n");
        }
    }
}

/// Eases opacities and scale, and releases input once the overlay is gone.
pub fn update_overlay_visuals(
    controller: Res<PresentationController>,
    time: Res<Time>,
    mut fade: ResMut<OverlayFade>,
    mut texts: Query<(&Faded, &mut TextColor)>,
    mut boxes: Query<(&FadedBox, &mut BackgroundColor, &mut BorderColor)>,
    mut root: Query<(&mut Transform, &mut Visibility, &mut FocusPolicy), With<LoadingOverlay>>,
    mut popups: ParamSet<(
        Query<&mut Visibility, (With<StartPopup>, Without<LoadingOverlay>)>,
        Query<&mut Visibility, (With<ErrorPopup>, Without<LoadingOverlay>)>,
        Query<&mut Visibility, (With<StandaloneCursor>, Without<LoadingOverlay>)>,
    )>,
) {
    let target = controller.with_screen(LoadingScreen::visuals);
    fade.ease(&target, time.delta_secs());
    let cursor_on = target.standalone_cursor && cursor_visible(time.elapsed_secs());

    for (faded, mut colour) in &mut texts {
        let alpha = fade.alpha(faded.layer, cursor_on);
        colour.0 = faded.base.with_alpha(faded.base.alpha() * alpha);
    }
    for (faded, mut background, mut border) in &mut boxes {
        let alpha = fade.alpha(faded.layer, cursor_on);
        background.0 = faded.background.with_alpha(faded.background.alpha() * alpha);
        border.0 = faded.border.with_alpha(faded.border.alpha() * alpha);
    }

    let shown = |alpha: f32| {
        if alpha > 0.0 {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        }
    };
    if let Ok(mut visibility) = popups.p0().single_mut() {
        visibility.set_if_neq(shown(fade.start_popup));
    }
    if let Ok(mut visibility) = popups.p1().single_mut() {
        visibility.set_if_neq(shown(fade.error_popup));
    }
    if let Ok(mut visibility) = popups.p2().single_mut() {
        visibility.set_if_neq(shown(if target.standalone_cursor { 1.0 } else { 0.0 }));
    }

    let Ok((mut transform, mut visibility, mut focus)) = root.single_mut() else {
        return;
    };
    transform.scale = Vec3::splat(fade.scale);
    if !target.pointer_events && fade.overlay <= 0.0 && *visibility != Visibility::Hidden {
        *visibility = Visibility::Hidden;
        *focus = FocusPolicy::Pass;
        release_host_pointer_events();
        info!("Loading overlay removed");
    }
}

/// Stop the host page's overlay element from intercepting pointer input.
#[cfg(target_arch = "wasm32")]
fn release_host_pointer_events() {
    use wasm_bindgen::JsCast;

    let Some(element) = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| {
            document.get_element_by_id(constants::loading_screen::HOST_OVERLAY_ELEMENT_ID)
        })
        .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok())
    else {
        return;
    };
    if let Err(e) = element.style().set_property("pointer-events", "none") {
        warn!("Could not release host pointer events: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn release_host_pointer_events() {}

/// Boot overlay, capability mount and per-frame machine updates.
pub struct LoadingScreenPlugin {
    pub config: LoadingScreenConfig,
}

impl Default for LoadingScreenPlugin {
    fn default() -> Self {
        Self {
            config: LoadingScreenConfig::default(),
        }
    }
}

impl Plugin for LoadingScreenPlugin {
    fn build(&self, app: &mut App) {
        let channel = app.world_mut().get_resource_or_init::<EventChannel>().clone();

        app.insert_resource(PresentationController::new(self.config.clone(), channel))
            .init_resource::<OverlayFade>()
            .add_systems(Startup, (spawn_loading_overlay, mount_loading_screen).chain())
            .add_systems(
                Update,
                (
                    track_viewport_width,
                    handle_start_input,
                    tick_loading_screen,
                    update_overlay_text,
                    update_overlay_visuals,
                )
                    .chain(),
            );
    }
}
