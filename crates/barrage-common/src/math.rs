//! Deterministic integer math.
//!
//! Angles are 16-bit circular units: 65536 is one full turn, so wrapping
//! arithmetic on `u16` is angle arithmetic. Trigonometry is computed with
//! CORDIC in 64-bit integers and returns Q16 fixed point (65536 = 1.0).

/// Fixed-point one in Q16.
pub const Q16_ONE: i32 = 1 << 16;

/// One eighth of a turn.
pub const DEG_45: u16 = 8192;

/// A quarter turn.
pub const DEG_90: u16 = 16384;

/// Half a turn.
pub const DEG_180: u16 = 32768;

/// Internal angle precision: 2^24 units per turn.
const CORDIC_SHIFT: u32 = 8;

/// CORDIC iteration count.
const CORDIC_STEPS: usize = 24;

/// `atan(2^-i)` in 2^24-per-turn units.
const ATAN_TABLE: [i64; CORDIC_STEPS] = [
    2_097_152, 1_238_021, 654_136, 332_050, 166_669, 83_416, 41_718, 20_860, 10_430, 5_215,
    2_608, 1_304, 652, 326, 163, 81, 41, 20, 10, 5, 3, 1, 1, 0,
];

/// Reciprocal CORDIC gain in Q30.
const CORDIC_GAIN_Q30: i64 = 652_032_874;

/// Converts whole degrees to a circular angle.
#[must_use]
pub const fn deg(degrees: i32) -> u16 {
    (degrees as i64 * 65536 / 360).rem_euclid(65536) as u16
}

/// Integer square root, rounded down.
#[must_use]
pub const fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut rem = n;
    let mut root = 0u64;
    let mut bit = 1u64 << 62;
    while bit > n {
        bit >>= 2;
    }
    while bit != 0 {
        if rem >= root + bit {
            rem -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }
    root
}

/// Integer square root of a signed value; negative input yields 0.
#[must_use]
pub const fn isqrt_i64(n: i64) -> i64 {
    if n <= 0 {
        0
    } else {
        isqrt(n as u64) as i64
    }
}

/// Length of a 2D vector, rounded down.
#[must_use]
pub fn hypot2(x: i32, y: i32) -> i32 {
    let sq = (x as i64) * (x as i64) + (y as i64) * (y as i64);
    isqrt(sq as u64).min(i32::MAX as u64) as i32
}

/// Length of a 3D vector, rounded down.
#[must_use]
pub fn hypot3(x: i32, y: i32, z: i32) -> i32 {
    let sq = (x as i64) * (x as i64) + (y as i64) * (y as i64) + (z as i64) * (z as i64);
    isqrt(sq as u64).min(i32::MAX as u64) as i32
}

/// Sine and cosine of `angle` in Q16, computed together.
#[must_use]
pub fn sin_cos(angle: u16) -> (i32, i32) {
    let mut theta = i64::from(angle as i16);
    let mut flip = false;
    if theta > i64::from(DEG_90) {
        theta -= i64::from(DEG_180);
        flip = true;
    } else if theta < -i64::from(DEG_90) {
        theta += i64::from(DEG_180);
        flip = true;
    }

    let mut z = theta << CORDIC_SHIFT;
    let mut x = CORDIC_GAIN_Q30;
    let mut y = 0i64;
    for (i, step) in ATAN_TABLE.iter().enumerate() {
        let (dx, dy) = (y >> i, x >> i);
        if z >= 0 {
            x -= dx;
            y += dy;
            z -= step;
        } else {
            x += dx;
            y -= dy;
            z += step;
        }
    }

    // Q30 -> Q16 with rounding
    let sin = ((y + (1 << 13)) >> 14) as i32;
    let cos = ((x + (1 << 13)) >> 14) as i32;
    if flip {
        (-sin, -cos)
    } else {
        (sin, cos)
    }
}

/// Sine of `angle` in Q16.
#[must_use]
pub fn sin(angle: u16) -> i32 {
    sin_cos(angle).0
}

/// Cosine of `angle` in Q16.
#[must_use]
pub fn cos(angle: u16) -> i32 {
    sin_cos(angle).1
}

/// Angle of the vector `(x, y)` measured from +x, counter-clockwise.
///
/// `atan2(0, 0)` is 0.
#[must_use]
pub fn atan2(y: i32, x: i32) -> u16 {
    if x == 0 && y == 0 {
        return 0;
    }
    let mut x = i64::from(x) << 16;
    let mut y = i64::from(y) << 16;
    let mut base = 0i64;
    if x < 0 {
        x = -x;
        y = -y;
        base = i64::from(DEG_180) << CORDIC_SHIFT;
    }

    let mut z = 0i64;
    for (i, step) in ATAN_TABLE.iter().enumerate() {
        let (dx, dy) = (y >> i, x >> i);
        if y > 0 {
            x += dx;
            y -= dy;
            z += step;
        } else {
            x -= dx;
            y += dy;
            z -= step;
        }
    }

    ((z + base + (1 << (CORDIC_SHIFT - 1))) >> CORDIC_SHIFT).rem_euclid(65536) as u16
}

/// Multiplies `value` by a Q16 factor, truncating toward zero.
#[must_use]
pub const fn mul_q16(value: i64, factor: i32) -> i64 {
    value * factor as i64 / Q16_ONE as i64
}
