//! Table version numbers.

use crate::raw::Scalar;

/// A `{major, minor}` version pair, as used by the GSUB/GPOS/GDEF headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct MajorMinor {
    pub major: u16,
    pub minor: u16,
}

impl MajorMinor {
    pub const VERSION_1_0: MajorMinor = MajorMinor { major: 1, minor: 0 };
    pub const VERSION_1_1: MajorMinor = MajorMinor { major: 1, minor: 1 };
    pub const VERSION_1_2: MajorMinor = MajorMinor { major: 1, minor: 2 };
    pub const VERSION_1_3: MajorMinor = MajorMinor { major: 1, minor: 3 };

    pub const fn new(major: u16, minor: u16) -> Self {
        MajorMinor { major, minor }
    }
}

impl Scalar for MajorMinor {
    type Raw = [u8; 4];

    fn from_raw(raw: Self::Raw) -> Self {
        MajorMinor {
            major: u16::from_be_bytes([raw[0], raw[1]]),
            minor: u16::from_be_bytes([raw[2], raw[3]]),
        }
    }

    fn to_raw(self) -> Self::Raw {
        let major = self.major.to_be_bytes();
        let minor = self.minor.to_be_bytes();
        [major[0], major[1], minor[0], minor[1]]
    }
}
