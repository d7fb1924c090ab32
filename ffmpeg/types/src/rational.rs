/*!
    Exact frame rates and time bases.
*/

use std::fmt;

/// Tolerance used when matching a decimal rate to an NTSC rate.
const NTSC_MATCH: f64 = 0.005;

/**
    A frame rate or time base as an exact fraction.

    Broadcast rates come in two families: whole rates (25, 50) and the
    NTSC family, where the whole rate is scaled by 1000/1001
    (29.97 is 30000/1001). Decoders and command lines usually report
    them as decimals, which [`Rational::from_fps`] maps back to the
    exact fraction.
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    /**
        Create a new rational number.

        # Panics

        Panics if `den` is zero.
    */
    #[inline]
    pub const fn new(num: i32, den: i32) -> Self {
        assert!(den != 0, "denominator cannot be zero");
        Self { num, den }
    }

    /**
        Recover the exact rate from a decimal frames-per-second value.

        Values within a few thousandths of an NTSC rate become
        `N * 1000 / 1001`; anything else is kept to three decimals and
        reduced. Returns `None` for zero, negative or non-finite input.
    */
    pub fn from_fps(fps: f64) -> Option<Self> {
        if !fps.is_finite() || fps <= 0.0 || fps > i32::MAX as f64 / 1000.0 {
            return None;
        }

        let whole = (fps * 1.001).round();
        if whole >= 1.0 {
            let ntsc = whole * 1000.0 / 1001.0;
            if (fps - ntsc).abs() < NTSC_MATCH && (fps - whole).abs() > NTSC_MATCH {
                return Some(Self::new(whole as i32 * 1000, 1001));
            }
        }

        let milli = (fps * 1000.0).round() as i32;
        if milli == 0 {
            return None;
        }
        let divisor = gcd(milli, 1000);
        Some(Self::new(milli / divisor, 1000 / divisor))
    }

    /**
        Convert to f64.
    */
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /**
        Returns the reciprocal, e.g. the time base matching a frame rate.

        # Panics

        Panics if numerator is zero.
    */
    #[inline]
    pub const fn invert(self) -> Self {
        assert!(self.num != 0, "cannot invert zero");
        Self {
            num: self.den,
            den: self.num,
        }
    }

    /// Returns true for the 1000/1001 family of rates.
    pub const fn is_ntsc(self) -> bool {
        self.den == 1001
    }
}

fn gcd(mut a: i32, mut b: i32) -> i32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs().max(1)
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "denominator cannot be zero")]
    fn zero_denominator_panics() {
        Rational::new(1, 0);
    }

    #[test]
    fn decimal_ntsc_rates_become_exact() {
        assert_eq!(Rational::from_fps(29.97), Some(Rational::new(30000, 1001)));
        assert_eq!(Rational::from_fps(59.94), Some(Rational::new(60000, 1001)));
        assert_eq!(Rational::from_fps(23.976), Some(Rational::new(24000, 1001)));
        assert_eq!(
            Rational::from_fps(30000.0 / 1001.0),
            Some(Rational::new(30000, 1001))
        );
        assert!(Rational::new(60000, 1001).is_ntsc());
    }

    #[test]
    fn whole_and_fractional_rates_are_reduced() {
        assert_eq!(Rational::from_fps(25.0), Some(Rational::new(25, 1)));
        assert_eq!(Rational::from_fps(50.0), Some(Rational::new(50, 1)));
        assert_eq!(Rational::from_fps(12.5), Some(Rational::new(25, 2)));
        assert!(!Rational::new(25, 1).is_ntsc());
    }

    #[test]
    fn unusable_rates_are_rejected() {
        assert_eq!(Rational::from_fps(0.0), None);
        assert_eq!(Rational::from_fps(-25.0), None);
        assert_eq!(Rational::from_fps(f64::NAN), None);
        assert_eq!(Rational::from_fps(0.0001), None);
    }

    #[test]
    fn frame_rate_inverts_to_time_base() {
        let tb = Rational::new(30000, 1001).invert();
        assert_eq!(tb, Rational::new(1001, 30000));
        assert!((tb.to_f64() - 1.0 / 29.97).abs() < 1e-5);
    }

    #[test]
    fn display() {
        assert_eq!(Rational::new(24000, 1001).to_string(), "24000/1001");
        assert_eq!(format!("{:?}", Rational::new(25, 1)), "25/1");
    }
}
