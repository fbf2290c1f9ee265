use std::cmp::Ordering;

/// Trait for types that support collation operations
pub trait Collatable {
    /// Type tag that ranks this value against values of other types
    fn type_tag(&self) -> u8;

    /// Order-preserving binary representation of the payload (without the type tag)
    fn to_bytes(&self) -> Vec<u8>;

    /// Compare two values in the collation order
    fn compare(&self, other: &Self) -> Ordering {
        self.type_tag().cmp(&other.type_tag()).then_with(|| self.to_bytes().cmp(&other.to_bytes()))
    }
}

impl Collatable for bool {
    fn type_tag(&self) -> u8 { tag::BOOL }

    fn to_bytes(&self) -> Vec<u8> { vec![*self as u8] }
}

impl Collatable for i64 {
    fn type_tag(&self) -> u8 { tag::INT }

    fn to_bytes(&self) -> Vec<u8> {
        // Flip the sign bit so that negative numbers sort before positive ones
        ((*self as u64) ^ (1 << 63)).to_be_bytes().to_vec()
    }
}

impl Collatable for f64 {
    fn type_tag(&self) -> u8 { tag::FLOAT }

    fn to_bytes(&self) -> Vec<u8> {
        let bits = if self.is_nan() {
            u64::MAX // NaN sorts last
        } else if self.is_sign_negative() {
            !self.to_bits()
        } else {
            self.to_bits() ^ (1 << 63)
        };
        bits.to_be_bytes().to_vec()
    }
}

impl Collatable for &str {
    fn type_tag(&self) -> u8 { tag::STRING }

    fn to_bytes(&self) -> Vec<u8> { self.as_bytes().to_vec() }
}

impl Collatable for &[u8] {
    fn type_tag(&self) -> u8 { tag::BINARY }

    fn to_bytes(&self) -> Vec<u8> { self.to_vec() }
}

/// Type tags, in collation order. NULL sorts before every other type.
pub mod tag {
    pub const NULL: u8 = 0x00;
    pub const BOOL: u8 = 0x10;
    pub const INT: u8 = 0x20;
    pub const FLOAT: u8 = 0x30;
    pub const STRING: u8 = 0x40;
    pub const BINARY: u8 = 0x50;
}
