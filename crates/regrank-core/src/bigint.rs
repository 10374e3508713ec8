use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, SubAssign};
use std::str::FromStr;

use crate::error::Error;

// Decimal conversion works in chunks of 10^9, the largest power of ten
// that fits a limb.
const DEC_CHUNK: u32 = 1_000_000_000;

/// Non-negative arbitrary-precision integer.
///
/// Stored as little-endian `u32` limbs with no trailing zero limbs; the
/// empty limb vector is zero. The decimal string form produced by
/// `Display` and consumed by `FromStr` is the only representation that
/// crosses the crate boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BigInt {
    limbs: Vec<u32>,
}

impl BigInt {
    pub fn zero() -> BigInt {
        BigInt { limbs: Vec::new() }
    }

    pub fn one() -> BigInt {
        BigInt { limbs: vec![1] }
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    fn trim(&mut self) {
        while let Some(&0) = self.limbs.last() {
            self.limbs.pop();
        }
    }

    /// `self - rhs`, or `None` when the result would be negative.
    pub fn checked_sub(&self, rhs: &BigInt) -> Option<BigInt> {
        if self < rhs {
            return None;
        }
        let mut out = self.clone();
        out -= rhs;
        Some(out)
    }

    /// Multiply by a small unsigned factor.
    pub fn mul_u32(&self, rhs: u32) -> BigInt {
        if rhs == 0 || self.is_zero() {
            return BigInt::zero();
        }
        let mut limbs = Vec::with_capacity(self.limbs.len() + 1);
        let mut carry = 0u64;
        for &l in &self.limbs {
            let v = l as u64 * rhs as u64 + carry;
            limbs.push(v as u32);
            carry = v >> 32;
        }
        if carry != 0 {
            limbs.push(carry as u32);
        }
        BigInt { limbs }
    }

    /// The value as a `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        match self.limbs.len() {
            0 => Some(0),
            1 => Some(self.limbs[0] as u64),
            2 => Some(self.limbs[0] as u64 | ((self.limbs[1] as u64) << 32)),
            _ => None,
        }
    }

    fn divmod_u32(&self, d: u32) -> (BigInt, u32) {
        debug_assert!(d != 0);
        let mut limbs = vec![0u32; self.limbs.len()];
        let mut rem = 0u64;
        for i in (0..self.limbs.len()).rev() {
            let cur = (rem << 32) | self.limbs[i] as u64;
            limbs[i] = (cur / d as u64) as u32;
            rem = cur % d as u64;
        }
        let mut q = BigInt { limbs };
        q.trim();
        (q, rem as u32)
    }
}

impl From<u32> for BigInt {
    fn from(v: u32) -> BigInt {
        let mut b = BigInt { limbs: vec![v] };
        b.trim();
        b
    }
}

impl From<u64> for BigInt {
    fn from(v: u64) -> BigInt {
        let mut b = BigInt {
            limbs: vec![v as u32, (v >> 32) as u32],
        };
        b.trim();
        b
    }
}

impl AddAssign<&BigInt> for BigInt {
    fn add_assign(&mut self, rhs: &BigInt) {
        if self.limbs.len() < rhs.limbs.len() {
            self.limbs.resize(rhs.limbs.len(), 0);
        }
        let mut carry = 0u64;
        for i in 0..self.limbs.len() {
            let r = *rhs.limbs.get(i).unwrap_or(&0) as u64;
            let v = self.limbs[i] as u64 + r + carry;
            self.limbs[i] = v as u32;
            carry = v >> 32;
        }
        if carry != 0 {
            self.limbs.push(carry as u32);
        }
    }
}

impl AddAssign<u32> for BigInt {
    fn add_assign(&mut self, rhs: u32) {
        let mut carry = rhs as u64;
        let mut i = 0;
        while carry != 0 {
            if i == self.limbs.len() {
                self.limbs.push(0);
            }
            let v = self.limbs[i] as u64 + carry;
            self.limbs[i] = v as u32;
            carry = v >> 32;
            i += 1;
        }
    }
}

impl Add<&BigInt> for &BigInt {
    type Output = BigInt;

    fn add(self, rhs: &BigInt) -> BigInt {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl SubAssign<&BigInt> for BigInt {
    // Call sites must guarantee a non-negative result.
    fn sub_assign(&mut self, rhs: &BigInt) {
        assert!(*self >= *rhs, "bigint subtraction would go negative");
        let mut borrow = 0u64;
        for i in 0..self.limbs.len() {
            let r = *rhs.limbs.get(i).unwrap_or(&0) as u64 + borrow;
            let l = self.limbs[i] as u64;
            if l >= r {
                self.limbs[i] = (l - r) as u32;
                borrow = 0;
            } else {
                self.limbs[i] = ((1u64 << 32) + l - r) as u32;
                borrow = 1;
            }
        }
        debug_assert_eq!(borrow, 0);
        self.trim();
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &BigInt) -> Ordering {
        match self.limbs.len().cmp(&other.limbs.len()) {
            Ordering::Equal => {
                for i in (0..self.limbs.len()).rev() {
                    match self.limbs[i].cmp(&other.limbs[i]) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                Ordering::Equal
            }
            ord => ord,
        }
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &BigInt) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for BigInt {
    type Err = Error;

    fn from_str(s: &str) -> Result<BigInt, Error> {
        if s.is_empty() {
            return Err(Error::Arithmetic("empty integer literal".to_string()));
        }
        let mut out = BigInt::zero();
        for &b in s.as_bytes() {
            if !b.is_ascii_digit() {
                return Err(Error::Arithmetic(format!(
                    "invalid byte {:#04x} in integer literal",
                    b
                )));
            }
            out = out.mul_u32(10);
            out += (b - b'0') as u32;
        }
        Ok(out)
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let mut chunks = Vec::new();
        let mut cur = self.clone();
        while !cur.is_zero() {
            let (q, r) = cur.divmod_u32(DEC_CHUNK);
            chunks.push(r);
            cur = q;
        }
        write!(f, "{}", chunks[chunks.len() - 1])?;
        for &c in chunks[..chunks.len() - 1].iter().rev() {
            write!(f, "{:09}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    #[test]
    fn test_zero() {
        assert!(BigInt::zero().is_zero());
        assert_eq!(BigInt::zero().to_string(), "0");
        assert_eq!(BigInt::from(0u32), BigInt::zero());
        assert_eq!(big("0"), BigInt::zero());
        assert_eq!(big("000"), BigInt::zero());
    }

    #[test]
    fn test_add_with_carry() {
        // u32::MAX + 1 crosses the first limb boundary
        let mut a = BigInt::from(u32::MAX);
        a += 1u32;
        assert_eq!(a, BigInt::from(1u64 << 32));
        assert_eq!(a.to_string(), "4294967296");

        let mut b = BigInt::from(u64::MAX);
        b += &BigInt::one();
        assert_eq!(b.to_string(), "18446744073709551616");
    }

    #[test]
    fn test_sub_with_borrow() {
        let mut a = BigInt::from(1u64 << 32);
        a -= &BigInt::one();
        assert_eq!(a, BigInt::from(u32::MAX));

        let mut b = big("18446744073709551616");
        b -= &big("18446744073709551616");
        assert!(b.is_zero());
    }

    #[test]
    #[should_panic]
    fn test_sub_underflow_panics() {
        let mut a = BigInt::one();
        a -= &BigInt::from(2u32);
    }

    #[test]
    fn test_checked_sub() {
        assert_eq!(BigInt::one().checked_sub(&BigInt::from(2u32)), None);
        assert_eq!(
            BigInt::from(5u32).checked_sub(&BigInt::from(2u32)),
            Some(BigInt::from(3u32))
        );
    }

    #[test]
    fn test_mul_u32() {
        assert!(BigInt::from(7u32).mul_u32(0).is_zero());
        let p = big("4294967295").mul_u32(u32::MAX);
        assert_eq!(p.to_string(), "18446744065119617025");
    }

    #[test]
    fn test_ordering() {
        assert!(big("9") < big("10"));
        assert!(big("4294967296") > big("4294967295"));
        assert!(BigInt::zero() < BigInt::one());
        assert_eq!(big("123").cmp(&big("123")), Ordering::Equal);
    }

    #[test]
    fn test_decimal_round_trip() {
        // 2^128
        let s = "340282366920938463463374607431768211456";
        assert_eq!(big(s).to_string(), s);
        // Interior zero chunks must be padded to nine digits.
        let t = "1000000000000000000";
        assert_eq!(big(t).to_string(), t);
    }

    #[test]
    fn test_to_u64() {
        assert_eq!(BigInt::zero().to_u64(), Some(0));
        assert_eq!(big("18446744073709551615").to_u64(), Some(u64::MAX));
        assert_eq!(big("18446744073709551616").to_u64(), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<BigInt>().is_err());
        assert!("12a3".parse::<BigInt>().is_err());
        assert!("-5".parse::<BigInt>().is_err());
    }
}
