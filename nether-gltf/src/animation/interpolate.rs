//! Keyframe blending primitives

/// Component-wise linear blend of `a` and `b` into `out`
pub fn lerp(a: &[f32], b: &[f32], u: f32, out: &mut [f32]) {
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = x + (y - x) * u;
    }
}

/// Spherical linear interpolation along the shortest arc, normalized
pub fn slerp(q0: [f32; 4], q1: [f32; 4], t: f32) -> [f32; 4] {
    let mut dot = q0[0] * q1[0] + q0[1] * q1[1] + q0[2] * q1[2] + q0[3] * q1[3];

    // Ensure shortest path
    let mut q1 = q1;
    if dot < 0.0 {
        q1 = [-q1[0], -q1[1], -q1[2], -q1[3]];
        dot = -dot;
    }

    // Nearly parallel: sin(theta) vanishes, fall back to normalized lerp
    if dot > 0.9995 {
        let result = [
            q0[0] + t * (q1[0] - q0[0]),
            q0[1] + t * (q1[1] - q0[1]),
            q0[2] + t * (q1[2] - q0[2]),
            q0[3] + t * (q1[3] - q0[3]),
        ];
        return normalize_quat(result);
    }

    let theta_0 = dot.acos();
    let theta = theta_0 * t;
    let sin_theta_0 = theta_0.sin();

    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = theta.sin() / sin_theta_0;

    normalize_quat([
        s0 * q0[0] + s1 * q1[0],
        s0 * q0[1] + s1 * q1[1],
        s0 * q0[2] + s1 * q1[2],
        s0 * q0[3] + s1 * q1[3],
    ])
}

/// Unit-length quaternion; degenerate input becomes identity
pub fn normalize_quat(q: [f32; 4]) -> [f32; 4] {
    let len = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    if len > 0.0 {
        [q[0] / len, q[1] / len, q[2] / len, q[3] / len]
    } else {
        [0.0, 0.0, 0.0, 1.0]
    }
}

/// Cubic Hermite segment between `v0` and `v1`
///
/// `b0` is the out-tangent of the first key, `a1` the in-tangent of the
/// second; tangents are scaled by the segment duration `dt`.
#[allow(clippy::too_many_arguments)]
pub fn hermite(v0: &[f32], b0: &[f32], v1: &[f32], a1: &[f32], dt: f32, u: f32, out: &mut [f32]) {
    let u2 = u * u;
    let u3 = u2 * u;
    let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
    let h10 = u3 - 2.0 * u2 + u;
    let h01 = -2.0 * u3 + 3.0 * u2;
    let h11 = u3 - u2;

    for (k, o) in out.iter_mut().enumerate() {
        *o = h00 * v0[k] + h10 * dt * b0[k] + h01 * v1[k] + h11 * dt * a1[k];
    }
}
