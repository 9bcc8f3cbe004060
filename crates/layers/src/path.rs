//! SVG path data from geographic geometry.
//!
//! When the projection has a clip angle, everything outside the small circle
//! of that radius around the view center is cut away: lines break at the
//! horizon and polygon rings are closed along the projected horizon circle.

use std::f64::consts::{PI, TAU};
use std::fmt::Write as _;

use foundation::math::{GeoProjection, LonLat, Vec2, Vec3};
use formats::Geometry;
use scene::num;

fn push_xy(out: &mut String, cmd: char, p: Vec2) {
    let _ = write!(out, "{cmd}{},{}", num(p.x), num(p.y));
}

/// Unit vectors spanning the plane perpendicular to `axis`, ordered so that
/// angles measured in that plane turn counterclockwise about `axis`.
fn tangent_basis(axis: Vec3) -> (Vec3, Vec3) {
    let helper = if axis.x.abs() < 0.9 {
        Vec3::new(1.0, 0.0, 0.0)
    } else {
        Vec3::new(0.0, 1.0, 0.0)
    };
    let e1 = axis.cross(helper).normalize();
    (e1, axis.cross(e1))
}

fn wrap_angle(a: f64) -> f64 {
    (a + PI).rem_euclid(TAU) - PI
}

struct Horizon {
    center: Vec3,
    cos_radius: f64,
    sin_radius: f64,
    e1: Vec3,
    e2: Vec3,
    screen_radius: f64,
    /// Whether counterclockwise turns about `center` draw with SVG sweep flag 1.
    ccw_sweep: bool,
}

impl Horizon {
    fn new<P: GeoProjection + ?Sized>(projection: &P, radius: f64) -> Self {
        let center = projection.view_center().to_unit();
        let (e1, e2) = tangent_basis(center);
        let mut horizon = Self {
            center,
            cos_radius: radius.cos(),
            sin_radius: radius.sin(),
            e1,
            e2,
            screen_radius: projection.scale() * radius.sin(),
            ccw_sweep: true,
        };
        let origin = projection.translate();
        let rim = |angle: f64| {
            projection.project(LonLat::from_unit(horizon.point_at(angle))) - origin
        };
        let (a, b) = (rim(0.0), rim(0.5 * PI));
        horizon.ccw_sweep = a.x * b.y - a.y * b.x > 0.0;
        horizon
    }

    fn visible(&self, u: Vec3) -> bool {
        u.dot(self.center) > self.cos_radius
    }

    /// Point of the clip circle at `angle` about the view center.
    fn point_at(&self, angle: f64) -> Vec3 {
        let rim = self.e1.scale(angle.cos()) + self.e2.scale(angle.sin());
        self.center.scale(self.cos_radius) + rim.scale(self.sin_radius)
    }

    fn angle_of(&self, u: Vec3) -> f64 {
        u.dot(self.e2).atan2(u.dot(self.e1))
    }

    /// Point where the great-circle edge `a -> b` crosses the clip circle.
    fn crossing(&self, a: Vec3, b: Vec3) -> Vec3 {
        let a_in = self.visible(a);
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        for _ in 0..40 {
            let mid = 0.5 * (lo + hi);
            let p = (a.scale(1.0 - mid) + b.scale(mid)).normalize();
            if self.visible(p) == a_in {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let t = if a_in { lo } else { hi };
        (a.scale(1.0 - t) + b.scale(t)).normalize()
    }

    /// Direction to follow the circle after a ring leaves the view along
    /// `before -> exit`: `1.0` counterclockwise about the center, `-1.0`
    /// clockwise. The polygon interior lies on the right of its rings.
    fn interior_turn(&self, before: Vec3, exit: Vec3) -> f64 {
        let heading = before.cross(exit).cross(exit);
        let right = heading.cross(exit);
        if self.center.cross(exit).dot(right) >= 0.0 {
            1.0
        } else {
            -1.0
        }
    }
}

pub struct PathGenerator<'a, P: ?Sized> {
    projection: &'a P,
    point_radius: f64,
    horizon: Option<Horizon>,
}

impl<'a, P: GeoProjection + ?Sized> PathGenerator<'a, P> {
    pub fn new(projection: &'a P) -> Self {
        let horizon = projection
            .clip_angle()
            .map(|angle_deg| Horizon::new(projection, angle_deg.to_radians()));
        Self {
            projection,
            point_radius: 4.5,
            horizon,
        }
    }

    pub fn with_point_radius(mut self, radius: f64) -> Self {
        self.point_radius = radius;
        self
    }

    pub fn point_radius(&self) -> f64 {
        self.point_radius
    }

    pub fn is_visible(&self, p: LonLat) -> bool {
        self.horizon
            .as_ref()
            .is_none_or(|h| h.visible(p.to_unit()))
    }

    pub fn geometry(&self, geometry: &Geometry) -> String {
        let mut out = String::new();
        match geometry {
            Geometry::Point(p) => self.write_point(&mut out, *p),
            Geometry::MultiPoint(ps) => ps.iter().for_each(|p| self.write_point(&mut out, *p)),
            Geometry::LineString(line) => self.write_line(&mut out, line),
            Geometry::MultiLineString(lines) => {
                lines.iter().for_each(|l| self.write_line(&mut out, l))
            }
            Geometry::Polygon(rings) => self.write_polygon(&mut out, rings),
            Geometry::MultiPolygon(polys) => {
                polys.iter().for_each(|p| self.write_polygon(&mut out, p))
            }
        }
        out
    }

    pub fn point(&self, p: LonLat) -> String {
        let mut out = String::new();
        self.write_point(&mut out, p);
        out
    }

    pub fn line(&self, points: &[LonLat]) -> String {
        let mut out = String::new();
        self.write_line(&mut out, points);
        out
    }

    fn project_unit(&self, u: Vec3) -> Vec2 {
        self.projection.project(LonLat::from_unit(u))
    }

    fn write_point(&self, out: &mut String, p: LonLat) {
        if !self.is_visible(p) {
            return;
        }
        let xy = self.projection.project(p);
        let r = num(self.point_radius);
        let d = num(2.0 * self.point_radius);
        push_xy(out, 'M', xy);
        let _ = write!(out, "m0,{r}a{r},{r} 0 1,1 0,-{d}a{r},{r} 0 1,1 0,{d}Z");
    }

    fn write_line(&self, out: &mut String, points: &[LonLat]) {
        let Some(horizon) = &self.horizon else {
            self.write_run(out, points.iter().copied());
            return;
        };
        for run in clip_line(horizon, points) {
            self.write_run(out, run.into_iter().map(LonLat::from_unit));
        }
    }

    fn write_run(&self, out: &mut String, points: impl Iterator<Item = LonLat>) {
        for (i, p) in points.enumerate() {
            push_xy(out, if i == 0 { 'M' } else { 'L' }, self.projection.project(p));
        }
    }

    fn write_closed_ring(&self, out: &mut String, ring: &[LonLat]) {
        self.write_run(out, ring.iter().copied());
        out.push('Z');
    }

    fn write_polygon(&self, out: &mut String, rings: &[Vec<LonLat>]) {
        let rings: Vec<&[LonLat]> = rings
            .iter()
            .map(|r| open_ring(r))
            .filter(|r| r.len() >= 3)
            .collect();
        let Some(horizon) = &self.horizon else {
            rings.iter().for_each(|r| self.write_closed_ring(out, r));
            return;
        };

        let mut runs = Vec::new();
        for ring in &rings {
            match clip_ring(horizon, ring) {
                RingClip::Hidden => {}
                RingClip::Whole => self.write_closed_ring(out, ring),
                RingClip::Runs(r) => runs.extend(r),
            }
        }
        if !runs.is_empty() {
            self.write_rejoined(out, horizon, &runs);
        } else if polygon_contains(&rings, horizon.point_at(0.0)) {
            // No ring touches the horizon, yet the polygon covers it: the
            // whole disc is inside, minus any visible holes.
            self.write_horizon_disc(out, horizon);
        }
    }

    /// Closes clipped stretches into subpaths. Each stretch leaves the view
    /// and continues along the horizon, on the interior side, to the nearest
    /// stretch entering it.
    fn write_rejoined(&self, out: &mut String, horizon: &Horizon, runs: &[Vec<Vec3>]) {
        let entries: Vec<f64> = runs.iter().map(|r| horizon.angle_of(r[0])).collect();
        let mut done = vec![false; runs.len()];
        for first in 0..runs.len() {
            if done[first] {
                continue;
            }
            push_xy(out, 'M', self.project_unit(runs[first][0]));
            let mut current = first;
            loop {
                done[current] = true;
                let run = &runs[current];
                for u in &run[1..] {
                    push_xy(out, 'L', self.project_unit(*u));
                }
                let [.., before, exit] = run.as_slice() else {
                    break;
                };
                let turn = horizon.interior_turn(*before, *exit);
                let from = horizon.angle_of(*exit);
                let next = entries
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j == first || !done[*j])
                    .map(|(j, a)| (j, ((a - from) * turn).rem_euclid(TAU)))
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                let Some((next, gap)) = next else {
                    break;
                };
                let to = self.project_unit(runs[next][0]);
                self.write_horizon_arc(out, horizon, from, turn * gap, to);
                if next == first {
                    break;
                }
                current = next;
            }
            out.push('Z');
        }
    }

    /// The full clip circle, clockwise about the view center so the disc
    /// lies on its right like any other exterior ring.
    fn write_horizon_disc(&self, out: &mut String, horizon: &Horizon) {
        let start = self.project_unit(horizon.point_at(0.0));
        push_xy(out, 'M', start);
        self.write_horizon_arc(out, horizon, 0.0, -TAU, start);
        out.push('Z');
    }

    /// Follows the horizon from angle `from` through the signed angle `span`
    /// (positive turns counterclockwise about the view center), ending at `to`.
    fn write_horizon_arc(
        &self,
        out: &mut String,
        horizon: &Horizon,
        from: f64,
        span: f64,
        to: Vec2,
    ) {
        let r = num(horizon.screen_radius);
        let sweep = u8::from((span > 0.0) == horizon.ccw_sweep);
        // Near-full turns are split so each arc has distinct endpoints.
        let pieces = if span.abs() > 1.5 * PI { 2 } else { 1 };
        let piece = span / pieces as f64;
        let large = u8::from(piece.abs() > PI);
        for k in 1..=pieces {
            let end = if k == pieces {
                to
            } else {
                self.project_unit(horizon.point_at(from + piece * k as f64))
            };
            let _ = write!(out, "A{r},{r} 0 {large},{sweep} {},{}", num(end.x), num(end.y));
        }
    }
}

fn open_ring(ring: &[LonLat]) -> &[LonLat] {
    match (ring.first(), ring.last()) {
        (Some(a), Some(b)) if ring.len() > 1 && a == b => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// Whether `p` is inside the spherical polygon: on the interior side of
/// every ring.
fn polygon_contains(rings: &[&[LonLat]], p: Vec3) -> bool {
    !rings.is_empty() && rings.iter().all(|ring| ring_encloses(ring, p))
}

/// Whether `p` is on the interior side of `ring`, the side to the right when
/// walking the ring as seen from outside the sphere.
///
/// A ring that winds about `p` answers directly by its direction. Otherwise
/// the ring is unrolled around `p` (azimuth against height) and its signed
/// area tells which side is the interior.
fn ring_encloses(ring: &[LonLat], p: Vec3) -> bool {
    let Some(last) = ring.last() else {
        return false;
    };
    let (e1, e2) = tangent_basis(p);
    let azimuth = |u: Vec3| u.dot(e2).atan2(u.dot(e1));

    let mut prev = last.to_unit();
    let mut prev_theta = azimuth(prev);
    let mut turned = 0.0;
    let mut area = 0.0;
    for q in ring {
        let u = q.to_unit();
        let step = wrap_angle(azimuth(u) - azimuth(prev));
        let theta = prev_theta + step;
        area += prev_theta * u.dot(p) - theta * prev.dot(p);
        turned += step;
        prev = u;
        prev_theta = theta;
    }
    if turned < -PI {
        true
    } else if turned > PI {
        false
    } else {
        area > 0.0
    }
}

fn clip_line(horizon: &Horizon, points: &[LonLat]) -> Vec<Vec<Vec3>> {
    let mut runs = Vec::new();
    let mut run: Vec<Vec3> = Vec::new();
    let mut prev: Option<(Vec3, bool)> = None;
    for p in points {
        let u = p.to_unit();
        let vis = horizon.visible(u);
        match prev {
            Some((a, a_vis)) if a_vis != vis => {
                let x = horizon.crossing(a, u);
                if a_vis {
                    run.push(x);
                    runs.push(std::mem::take(&mut run));
                } else {
                    run.push(x);
                    run.push(u);
                }
            }
            _ if vis => run.push(u),
            _ => {}
        }
        prev = Some((u, vis));
    }
    if run.len() > 1 {
        runs.push(run);
    }
    runs.retain(|r| r.len() > 1);
    runs
}

enum RingClip {
    Hidden,
    Whole,
    /// Visible stretches, each entering and leaving through the horizon.
    Runs(Vec<Vec<Vec3>>),
}

fn clip_ring(horizon: &Horizon, ring: &[LonLat]) -> RingClip {
    let units: Vec<Vec3> = ring.iter().map(|p| p.to_unit()).collect();
    let vis: Vec<bool> = units.iter().map(|u| horizon.visible(*u)).collect();
    let Some(start) = vis.iter().position(|v| *v) else {
        return RingClip::Hidden;
    };
    if vis.iter().all(|v| *v) {
        return RingClip::Whole;
    }

    // Walk the ring from a visible vertex so the final stretch wraps onto the first.
    let n = units.len();
    let mut runs: Vec<Vec<Vec3>> = Vec::new();
    let mut run = vec![units[start]];
    for k in 0..n {
        let i = (start + k) % n;
        let j = (i + 1) % n;
        let (a, b) = (units[i], units[j]);
        match (vis[i], vis[j]) {
            (true, true) => run.push(b),
            (true, false) => {
                run.push(horizon.crossing(a, b));
                runs.push(std::mem::take(&mut run));
            }
            (false, true) => {
                run.push(horizon.crossing(a, b));
                run.push(b);
            }
            (false, false) => {}
        }
    }
    // `run` now ends at the starting vertex, which also opens the first stretch.
    if let Some(first) = runs.first_mut() {
        run.extend(first.drain(1..));
        *first = run;
    }
    RingClip::Runs(runs)
}
