//! Mii character data.
//!
//! Appearance words are stored big-endian; the bit positions below refer to the decoded value.
//!
//! See: <https://www.3dbrew.org/wiki/Mii#Mii_format>

use modular_bitfield::prelude::*;
use static_assertions::const_assert_eq;
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout,
    big_endian::{U16 as U16BE, U32 as U32BE, U64 as U64BE},
    little_endian::U16,
};

use crate::checksum::crc16;

/// Sharing and region options.
#[bitfield]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MiiOptions {
    pub allow_copying: bool,
    pub is_private_name: bool,
    /// 0 = none, 1 = JPN, 2 = USA, 3 = EUR
    pub region_lock: B2,
    /// 0 = JPN+USA+EUR, 1 = CHN, 2 = KOR, 3 = TWN
    pub char_set: B2,
    #[skip]
    __padding: B2,
}

/// Location in the Mii Maker grid.
#[bitfield]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MiiPosition {
    pub page_index: B4,
    pub slot_index: B4,
}

/// Console the Mii was created on.
#[bitfield]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsoleIdentity {
    #[skip]
    __unknown: B4,
    /// 1 = Wii, 2 = DSi, 3 = 3DS
    pub origin_console: B3,
    #[skip]
    __padding: B1,
}

/// Sex, birthday and shirt colour.
#[bitfield]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MiiDetails {
    pub female: bool,
    pub birthday_month: B4,
    pub birthday_day: B5,
    pub shirt_color: B4,
    pub favorite: bool,
    #[skip]
    __padding: B1,
}

/// Raw Mii record (0x5C bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct MiiData {
    pub magic: u8,
    pub options: u8,
    pub position: u8,
    pub console_identity: u8,
    /// Identifies the console the Mii was created on
    pub system_id: U64BE,
    pub mii_id: U32BE,
    /// Creator console MAC address
    pub mac: [u8; 6],
    pub _pad: [u8; 2],
    pub details: U16BE,
    pub name: [U16; 10],
    pub height: u8,
    pub width: u8,
    pub face_style: u8,
    pub face_details: u8,
    pub hair_style: u8,
    pub hair_details: u8,
    pub eye_details: U32BE,
    pub eyebrow_details: U32BE,
    pub nose_details: U16BE,
    pub mouth_details: U16BE,
    pub mustache_details: U16BE,
    pub beard_details: U16BE,
    pub glasses_details: U16BE,
    pub mole_details: U16BE,
    pub author_name: [U16; 10],
}

// Verify struct size - https://www.3dbrew.org/wiki/Mii#Mii_format
const_assert_eq!(size_of::<MiiData>(), 0x5C);

impl MiiData {
    pub fn options(&self) -> MiiOptions {
        MiiOptions::from_bytes([self.options])
    }

    pub fn set_options(&mut self, options: MiiOptions) {
        self.options = options.into_bytes()[0];
    }

    pub fn position(&self) -> MiiPosition {
        MiiPosition::from_bytes([self.position])
    }

    pub fn console_identity(&self) -> ConsoleIdentity {
        ConsoleIdentity::from_bytes([self.console_identity])
    }

    pub fn details(&self) -> MiiDetails {
        MiiDetails::from_bytes(self.details.get().to_le_bytes())
    }

    pub fn set_details(&mut self, details: MiiDetails) {
        self.details = U16BE::new(u16::from_le_bytes(details.into_bytes()));
    }

    pub fn name(&self) -> String {
        crate::raw::utf16_to_string(&self.name)
    }

    pub fn author_name(&self) -> String {
        crate::raw::utf16_to_string(&self.author_name)
    }
}

/// Size of the region covered by the checksum.
const CHECKSUMMED_LEN: usize = 0x5E;

/// Mii record sealed with a CRC-16 (0x60 bytes).
///
/// Every constructor and mutator recomputes the checksum. Values read from bytes are taken as
/// they are, so [`ChecksummedMii::is_valid`] reports whether the source was intact.
#[derive(Debug, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ChecksummedMii {
    data: MiiData,
    padding: U16BE,
    crc16: U16BE,
}

// Verify struct size - https://www.3dbrew.org/wiki/Mii#Mii_format
const_assert_eq!(size_of::<ChecksummedMii>(), 0x60);

impl ChecksummedMii {
    pub fn new(data: MiiData) -> Self {
        let mut mii = Self {
            data,
            padding: U16BE::ZERO,
            crc16: U16BE::ZERO,
        };
        mii.fix_checksum();
        mii
    }

    #[inline]
    pub fn data(&self) -> &MiiData {
        &self.data
    }

    pub fn set_data(&mut self, data: MiiData) {
        self.data = data;
        self.fix_checksum();
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        self.crc16.get()
    }

    pub fn calc_checksum(&self) -> u16 {
        crc16(&self.as_bytes()[..CHECKSUMMED_LEN])
    }

    pub fn is_valid(&self) -> bool {
        self.checksum() == self.calc_checksum()
    }

    /// Copies the record without recomputing the checksum.
    pub fn copy_verbatim(&self) -> Self {
        Self {
            data: self.data,
            padding: self.padding,
            crc16: self.crc16,
        }
    }

    fn fix_checksum(&mut self) {
        self.crc16 = U16BE::new(self.calc_checksum());
    }
}

impl Default for ChecksummedMii {
    fn default() -> Self {
        Self::new(MiiData::default())
    }
}

impl Clone for ChecksummedMii {
    fn clone(&self) -> Self {
        let mut mii = self.copy_verbatim();
        mii.fix_checksum();
        mii
    }
}

impl From<MiiData> for ChecksummedMii {
    fn from(data: MiiData) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use zerocopy::FromBytes;

    use super::*;
    use crate::raw::utf16_from_str;

    fn sample() -> MiiData {
        MiiData {
            magic: 3,
            system_id: U64BE::new(0x1122_3344_5566_7788),
            mii_id: U32BE::new(0xDEAD_BEEF),
            mac: [0x00, 0x1F, 0x32, 0xAB, 0xCD, 0xEF],
            name: utf16_from_str("Nia"),
            author_name: utf16_from_str("Host"),
            ..MiiData::default()
        }
    }

    #[test]
    fn test_every_constructor_seals() {
        let new = ChecksummedMii::new(sample());
        assert!(new.is_valid());

        let from: ChecksummedMii = sample().into();
        assert!(from.is_valid());
        assert_eq!(from.checksum(), new.checksum());

        assert!(ChecksummedMii::default().is_valid());

        let mut assigned = ChecksummedMii::default();
        assigned.set_data(sample());
        assert!(assigned.is_valid());
        assert_eq!(assigned.checksum(), new.checksum());
    }

    #[test]
    fn test_checksum_covers_padding() {
        let mii = ChecksummedMii::new(sample());
        let expected = crc16(&mii.as_bytes()[..0x5E]);
        assert_eq!(mii.checksum(), expected);
        assert_eq!(&mii.as_bytes()[0x5E..], &expected.to_be_bytes());
    }

    #[test]
    fn test_read_path_keeps_stored_checksum() {
        let mut bytes = ChecksummedMii::new(sample()).as_bytes().to_vec();
        bytes[0x1A] ^= 0xFF;
        let tampered = ChecksummedMii::read_from_bytes(&bytes).unwrap();
        assert!(!tampered.is_valid());

        assert!(!tampered.copy_verbatim().is_valid());
        // Cloning reseals
        assert!(tampered.clone().is_valid());
    }

    #[test]
    fn test_big_endian_fields() {
        let mii = sample();
        let bytes = mii.as_bytes();
        assert_eq!(&bytes[0x04..0x0C], &[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88]);
        assert_eq!(&bytes[0x0C..0x10], &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(mii.name(), "Nia");
        assert_eq!(mii.author_name(), "Host");
    }

    #[test]
    fn test_details_bits() {
        let mut mii = MiiData::default();
        mii.set_details(
            MiiDetails::new()
                .with_female(true)
                .with_birthday_month(12)
                .with_birthday_day(31)
                .with_favorite(true),
        );
        assert_eq!(mii.details.get(), 1 | (12 << 1) | (31 << 5) | (1 << 14));
        assert_eq!(mii.details().birthday_month(), 12);
        assert_eq!(mii.details().birthday_day(), 31);

        mii.set_options(MiiOptions::new().with_allow_copying(true).with_char_set(2));
        assert_eq!(mii.options, 0b0010_0001);
    }
}
