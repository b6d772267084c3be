/*
    This file is part of Donet.

    Copyright © 2024 Max Rodriguez

    Donet is free software; you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License,
    as published by the Free Software Foundation, either version 3
    of the License, or (at your option) any later version.

    Donet is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public
    License along with Donet. If not, see <https://www.gnu.org/licenses/>.
*/

//! Type aliases and file-wide constants shared by the parser, type model,
//! and binary codec.

use cfg_if::cfg_if;
use std::mem;

// ---------- Type Definitions --------- //

pub type MsgType = u16;
pub type Channel = u64;
pub type DoId = u32;
pub type Zone = u32;
pub type DgSizeTag = u16;
pub type DClassId = u16;
pub type FieldId = u16;
pub type DCFileHash = u32;

// ---------- Type Limits ---------- //

pub const DG_SIZE_MAX: DgSizeTag = u16::MAX;
pub const CHANNEL_MAX: Channel = u64::MAX;
pub const DOID_MAX: DoId = u32::MAX;
pub const ZONE_MAX: Zone = u32::MAX;
pub const ZONE_BITS: usize = 8 * mem::size_of::<Zone>();

// ---------- Constants ---------- //

pub const INVALID_DOID: DoId = 0;
pub const INVALID_CHANNEL: Channel = 0;
pub const CONTROL_CHANNEL: Channel = 1;
pub const BCHAN_CLIENTS: Channel = 10;
pub const BCHAN_STATESERVERS: Channel = 12;
pub const BCHAN_DBSERVERS: Channel = 13;

// ---------- DC File Feature ---------- //

cfg_if! {
    if #[cfg(feature = "dcfile")] {
        pub static HISTORICAL_DC_KEYWORDS: &[&str] = &[
            "ram", "required", "db", "airecv", "ownrecv",
            "clrecv", "broadcast", "ownsend", "clsend",
        ];

        /// Upper bound of the sieve of Eratosthenes used to build the
        /// first [`MAX_PRIME_NUMBERS`] primes for the schema hash generator.
        pub static HASH_GEN_SIEVE_UPPER_BOUND: usize = 104_744;
        pub static MAX_PRIME_NUMBERS: usize = 10_000;
    }
}

// ---------- Datagram Feature ---------- //

cfg_if! {
    if #[cfg(feature = "datagram")] {
        /// Message type tags used by the state-server/AI envelope builders.
        /// Only the subset referenced by [`crate::envelope`] is kept; this
        /// crate does not implement the rest of the Donet wire protocol.
        pub const STATESERVER_OBJECT_UPDATE_FIELD: u16 = 2020;
        pub const STATESERVER_OBJECT_GENERATE_WITH_REQUIRED: u16 = 2000;
        pub const STATESERVER_OBJECT_GENERATE_WITH_REQUIRED_OTHER: u16 = 2001;
        pub const STATESERVER_OBJECT_CREATE_WITH_REQUIRED_CONTEXT: u16 = 2003;
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;

    #[test]
    fn zone_bits_matches_zone_width() {
        assert_eq!(ZONE_BITS, 32);
    }
}
