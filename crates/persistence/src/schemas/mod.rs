//! Record schemas for the donor and ledger collections.
//!
//! | Record | Default collection | Lookup field | Delete | Blood search |
//! |--------|--------------------|--------------|--------|--------------|
//! | [`DonorRecord`] | `blaster_db` | `donorId` | yes | `bloodGroup` + `donationRequest.status == REQUESTED` |
//! | [`LedgerRecord`] | `blockchain_db` | `donorId` | no | `bloodGroup` |
//!
//! Text fields decode any stored JSON scalar, so a numeric `quantity` written
//! by another client reads back as `"5"`. Merge updates patch the stored
//! document directly and leave such values untouched.

mod donor;
mod ledger;
mod text;

pub use donor::{DONOR_STATUS_REQUESTED, DonationRequest, DonorClient, DonorPatch, DonorRecord};
pub use ledger::{LedgerClient, LedgerPatch, LedgerRecord};
