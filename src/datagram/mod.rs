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

//! Construction and iteration of the little-endian byte buffers exchanged
//! between client, AI, state-server and database. Endianness is handled by
//! `to_le_bytes`/`from_le_bytes` directly rather than a manual byte-swap
//! helper, since those already guarantee little-endian output on any host.

pub mod datagram;

pub use datagram::{DgError, DgResult};
pub use datagram::{Datagram, DatagramIterator};
