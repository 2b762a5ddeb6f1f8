use std::ops::RangeInclusive;

use rand::SeedableRng;

use self::vector::{vec2, vec2_base};

pub mod vector;

pub const PI: f32 = std::f32::consts::PI;

pub fn mix<T, TB>(a: &T, b: &T, amount: TB) -> T
where
    T: std::ops::Sub<T, Output = T>
        + std::ops::Add<T, Output = T>
        + std::ops::Mul<TB, Output = T>
        + Copy,
{
    *a + (*b - *a) * amount
}

pub fn dot<T>(a: &vec2_base<T>, b: &vec2_base<T>) -> T
where
    T: Copy + std::ops::Mul<T, Output = T> + std::ops::Add<T, Output = T>,
{
    a.x * b.x + a.y * b.y
}

pub fn length<T>(a: &vec2_base<T>) -> T
where
    T: Copy + std::ops::Mul<T, Output = T> + std::ops::Add<T, Output = T> + num_traits::Float,
{
    (dot(a, a)).sqrt()
}

/// Normalizes the vector, a zero vector stays zero.
pub fn normalize<T>(v: &vec2_base<T>) -> vec2_base<T>
where
    T: Default
        + Copy
        + std::ops::Mul<T, Output = T>
        + std::ops::Div<T, Output = T>
        + std::ops::Add<T, Output = T>
        + num_traits::Float,
{
    let divisor = length(v);
    if divisor == T::zero() {
        vec2_base::<T>::default()
    } else {
        let l = T::one() / divisor;
        vec2_base::<T>::new(v.x * l, v.y * l)
    }
}

pub fn distance(a: &vec2, b: &vec2) -> f32 {
    length(&(*a - *b))
}

pub fn distance_squared(a: &vec2, b: &vec2) -> f32 {
    let diff = *a - *b;
    dot(&diff, &diff)
}

/// Projects `target_point` onto the segment `a..b`.
///
/// A degenerated segment (`a == b`) projects onto `a`.
pub fn closest_point_on_line(line_point_a: &vec2, line_point_b: &vec2, target_point: &vec2) -> vec2 {
    let seg_ab = *line_point_b - *line_point_a;
    let squared_magnitude_ab = dot(&seg_ab, &seg_ab);
    if squared_magnitude_ab > 0.0 {
        let ap = *target_point - *line_point_a;
        let ap_dot_ab = dot(&ap, &seg_ab);
        let t = ap_dot_ab / squared_magnitude_ab;
        *line_point_a + seg_ab * t.clamp(0.0, 1.0)
    } else {
        *line_point_a
    }
}

/// Rounds half away from zero, like C's `round`.
#[inline]
pub fn round_to_int(f: f32) -> i32 {
    f.round() as i32
}

/// A rng generator that focuses on reproducibility rather
/// than security or anything else.
#[derive(Debug, Clone)]
pub struct Rng {
    rng: rand_xoshiro::Xoshiro256PlusPlus,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    pub fn random_int_in(&mut self, range: RangeInclusive<u64>) -> u64 {
        rand::Rng::gen_range(&mut self.rng, range)
    }

    pub fn random_int(&mut self) -> u64 {
        self.random_int_in(u64::MIN..=u64::MAX)
    }

    /// random float in `[0..1]`
    pub fn random_float(&mut self) -> f32 {
        rand::Rng::gen_range(&mut self.rng, 0.0..=1.0)
    }

    /// Random index in `[0..len)`, `0` for an empty range.
    pub fn random_or_0(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.random_int_in(0..=len as u64 - 1) as usize
    }
}

#[cfg(test)]
mod test {
    use super::{
        closest_point_on_line, distance, distance_squared, normalize, round_to_int, vector::vec2,
        Rng,
    };

    #[test]
    fn round_half_away_from_zero() {
        assert_eq!(round_to_int(100.5), 101);
        assert_eq!(round_to_int(-50.5), -51);
        assert_eq!(round_to_int(-50.1), -50);
    }

    #[test]
    fn normalize_zero_stays_zero() {
        let v = normalize(&vec2::new(0.0, 0.0));
        assert_eq!(v, vec2::new(0.0, 0.0));
        let v = normalize(&vec2::new(0.0, -3.0));
        assert_eq!(v, vec2::new(0.0, -1.0));
    }

    #[test]
    fn closest_point_is_clamped_to_segment() {
        let a = vec2::new(0.0, 0.0);
        let b = vec2::new(10.0, 0.0);
        assert_eq!(closest_point_on_line(&a, &b, &vec2::new(5.0, 3.0)), vec2::new(5.0, 0.0));
        assert_eq!(closest_point_on_line(&a, &b, &vec2::new(-5.0, 3.0)), a);
        assert_eq!(closest_point_on_line(&a, &a, &vec2::new(-5.0, 3.0)), a);
    }

    #[test]
    fn rng_is_reproducible() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for len in 1..64 {
            assert_eq!(a.random_or_0(len), b.random_or_0(len));
        }
        assert_eq!(a.random_or_0(0), 0);
        assert_eq!(a.random_int(), b.random_int());
        for _ in 0..64 {
            let f = a.random_float();
            assert!((0.0..=1.0).contains(&f));
            assert_eq!(f, b.random_float());
        }
    }

    #[test]
    fn squared_distance() {
        let a = vec2::new(1.0, 2.0);
        let b = vec2::new(4.0, 6.0);
        assert_eq!(distance_squared(&a, &b), 25.0);
        assert_eq!(distance(&a, &b), 5.0);
    }
}
