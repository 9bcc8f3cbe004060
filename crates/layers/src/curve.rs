use std::fmt::Write as _;

use foundation::math::Vec2;
use scene::num;

/// Uniform cubic B-spline through `points`, as SVG path data.
///
/// The curve starts and ends on the first and last points and is pulled
/// toward the interior ones without passing through them. Two points give a
/// straight segment.
pub fn basis_path(points: &[Vec2]) -> String {
    let mut out = String::new();
    let Some(first) = points.first() else {
        return out;
    };
    let _ = write!(out, "M{},{}", num(first.x), num(first.y));
    if points.len() == 1 {
        return out;
    }
    if points.len() == 2 {
        let p = points[1];
        let _ = write!(out, "L{},{}", num(p.x), num(p.y));
        return out;
    }

    let (p0, p1) = (points[0], points[1]);
    let _ = write!(
        out,
        "L{},{}",
        num((5.0 * p0.x + p1.x) / 6.0),
        num((5.0 * p0.y + p1.y) / 6.0)
    );
    let (mut a, mut b) = (p0, p1);
    for &p in &points[2..] {
        bezier(&mut out, a, b, p);
        (a, b) = (b, p);
    }
    bezier(&mut out, a, b, b);
    let _ = write!(out, "L{},{}", num(b.x), num(b.y));
    out
}

fn bezier(out: &mut String, a: Vec2, b: Vec2, c: Vec2) {
    let _ = write!(
        out,
        "C{},{},{},{},{},{}",
        num((2.0 * a.x + b.x) / 3.0),
        num((2.0 * a.y + b.y) / 3.0),
        num((a.x + 2.0 * b.x) / 3.0),
        num((a.y + 2.0 * b.y) / 3.0),
        num((a.x + 4.0 * b.x + c.x) / 6.0),
        num((a.y + 4.0 * b.y + c.y) / 6.0),
    );
}
