//! Drag-to-rotate and wheel zoom for the globe.
//!
//! Dragging follows a subject model: at pointer-down the current rotation is
//! turned into a virtual pointer position (`λ / s`, `-φ / s` with `s` the
//! sensitivity), every move adds the total pointer offset to it and converts
//! back. The elevation clamp is applied by `GlobeView` on the way in.
//!
//! Zoom scales the whole drawing surface rather than the projection. Each
//! wheel step updates the target scale immediately and eases the displayed
//! scale toward it over a short transition.

use foundation::math::Rotation;
use foundation::{Time, TimeSpan, ease_cubic_in_out};
use formats::Parameters;

/// Length of the zoom transition.
const ZOOM_TRANSITION_S: f64 = 0.1;

/// `WheelEvent.deltaMode` values.
const DOM_DELTA_LINE: u32 = 1;
const DOM_DELTA_PAGE: u32 = 2;

/// Exponent per unit of wheel delta, by delta mode.
pub fn wheel_delta_factor(delta_mode: u32) -> f64 {
    match delta_mode {
        DOM_DELTA_LINE => 0.05,
        DOM_DELTA_PAGE => 1.0,
        _ => 0.002,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    start_pos_px: [f64; 2],
    subject: [f64; 2],
    gamma_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ZoomState {
    from: f64,
    target: f64,
    span: TimeSpan,
}

impl ZoomState {
    fn at_rest(k: f64) -> Self {
        Self {
            from: k,
            target: k,
            span: TimeSpan::instant(Time(0.0)),
        }
    }

    fn scale_at(&self, now: Time) -> f64 {
        let t = ease_cubic_in_out(self.span.progress(now));
        self.from + (self.target - self.from) * t
    }
}

#[derive(Debug, Clone)]
pub struct GlobeController {
    sensitivity: f64,
    scale_extent: [f64; 2],
    drag: Option<DragState>,
    zoom: ZoomState,
}

impl GlobeController {
    pub fn new(sensitivity: f64, scale_extent: [f64; 2]) -> Self {
        let k = 1.0_f64.clamp(scale_extent[0], scale_extent[1]);
        Self {
            sensitivity,
            scale_extent,
            drag: None,
            zoom: ZoomState::at_rest(k),
        }
    }

    pub fn from_params(params: &Parameters) -> Self {
        Self::new(params.sensitivity, params.earth.scale_extent)
    }

    /// Handle pointer down event.
    ///
    /// - `pos_px`: pointer position in pixels.
    /// - `rotation`: the rotation currently applied to the globe.
    pub fn on_pointer_down(&mut self, pos_px: [f64; 2], rotation: Rotation) {
        let s = self.sensitivity;
        self.drag = Some(DragState {
            start_pos_px: pos_px,
            subject: [rotation.lambda_deg / s, -rotation.phi_deg / s],
            gamma_deg: rotation.gamma_deg,
        });
    }

    /// Rotation requested by a pointer move, before the elevation clamp.
    /// `None` when no drag is in progress.
    pub fn on_pointer_move(&self, pos_px: [f64; 2]) -> Option<Rotation> {
        let drag = self.drag?;
        let s = self.sensitivity;
        let x = drag.subject[0] + (pos_px[0] - drag.start_pos_px[0]);
        let y = drag.subject[1] + (pos_px[1] - drag.start_pos_px[1]);
        Some(Rotation::new(x * s, -y * s, drag.gamma_deg))
    }

    pub fn on_pointer_up(&mut self) {
        self.drag = None;
    }

    /// Handle a wheel step at time `now`.
    ///
    /// - `delta_y`: `WheelEvent.deltaY` (positive zooms out).
    /// - `delta_mode`: `WheelEvent.deltaMode`.
    pub fn on_wheel(&mut self, delta_y: f64, delta_mode: u32, now: Time) {
        let [k0, k1] = self.scale_extent;
        let factor = 2f64.powf(-delta_y * wheel_delta_factor(delta_mode));
        let target = (self.zoom.target * factor).clamp(k0, k1);
        self.zoom = ZoomState {
            from: self.zoom.scale_at(now),
            target,
            span: TimeSpan::starting_at(now, ZOOM_TRANSITION_S),
        };
    }

    /// Displayed scale at `now`.
    pub fn scale_at(&self, now: Time) -> f64 {
        self.zoom.scale_at(now)
    }

    pub fn target_scale(&self) -> f64 {
        self.zoom.target
    }

    pub fn is_zooming(&self, now: Time) -> bool {
        self.zoom.span.progress(now) < 1.0
    }
}
