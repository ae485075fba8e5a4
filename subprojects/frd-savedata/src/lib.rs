//! # frd-savedata
//! Byte-exact model of the friend services system save data.
//!
//! This crate provides three layers:
//! - `raw`: Fixed-layout record definitions using `zerocopy`
//! - `read`: Validated loaders, the friend directory and per-revision friend records
//! - `write`: Serialization of records back into save-file blobs
//!
//! Supporting modules:
//! - `checksum`: CRC-16 used by checksummed Mii records
//! - `friend_code`: principal id ↔ friend code derivation
//! - `timestamp`: packed calendar and millisecond timestamps
//!
//! Supported files (system save data archive `0x00010032`):
//! - **config** - selected local account
//! - **mydata** - own profile, Mii, comment and preferences
//! - **account** - principal id, NEX password and NASC environment
//! - **friendlist** - up to 100 friend entries, flexible length
//!
//! # References
//! - [3dbrew Friend Services](https://www.3dbrew.org/wiki/Friend_Services)
//! - [3dbrew Mii](https://www.3dbrew.org/wiki/Mii)

pub mod checksum;
pub mod friend_code;
pub mod raw;
pub mod read;
pub mod timestamp;
pub mod write;
