//! Polygon approximation of closed contours.

use imageproc::point::Point;

/// Simplify a closed curve with the Douglas-Peucker algorithm.
///
/// The curve is split at its first point and the point farthest from it,
/// and each half is simplified independently. The result never repeats the
/// starting point at its end, so its length is the vertex count.
pub fn approximate_closed(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let points = dedup_consecutive(points);
    if points.len() < 3 {
        return points;
    }

    let first = points[0];
    let (split, _) = points
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, p)| (i, distance(first, *p)))
        .fold((1, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

    // first..=split, then split..=first wrapping around
    let forward = &points[..=split];
    let mut backward: Vec<Point<i32>> = points[split..].to_vec();
    backward.push(first);

    let mut result = simplify_open(forward, epsilon);
    let tail = simplify_open(&backward, epsilon);
    // tail starts at `split` (already present) and ends at `first`
    result.extend_from_slice(&tail[1..tail.len() - 1]);
    result
}

/// Douglas-Peucker on an open polyline; endpoints are always kept.
fn simplify_open(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (index, dist) = (start + 1..end)
            .map(|i| (i, segment_distance(points[i], points[start], points[end])))
            .fold((start, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });

        if dist > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn dedup_consecutive(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut out: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for p in points {
        if out.last() != Some(p) {
            out.push(*p);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `p` to the line through `a` and `b`.
fn segment_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let len = distance(a, b);
    if len == 0.0 {
        return distance(p, a);
    }
    let cross = (b.x - a.x) as f64 * (a.y - p.y) as f64 - (a.x - p.x) as f64 * (b.y - a.y) as f64;
    cross.abs() / len
}
