//! Hierarchical document paths.
//!
//! The store is organised as
//! `municipalCouncils/{council}/Districts/{district}/Wards/{ward}` with
//! `schedules`, `supervisors/{supervisor}/trucks`, and `tickets`
//! collections scoped under each ward.

use vatelanka_core::WardPlacement;

pub const MUNICIPAL_COUNCILS: &str = "municipalCouncils";
pub const USERS: &str = "users";

#[must_use]
pub fn user_doc(uid: &str) -> String {
    format!("{USERS}/{uid}")
}

#[must_use]
pub fn districts(council: &str) -> String {
    format!("{MUNICIPAL_COUNCILS}/{council}/Districts")
}

#[must_use]
pub fn wards(council: &str, district: &str) -> String {
    format!("{}/{district}/Wards", districts(council))
}

#[must_use]
pub fn ward_root(placement: &WardPlacement) -> String {
    format!(
        "{}/{}",
        wards(&placement.municipal_council, &placement.district),
        placement.ward
    )
}

#[must_use]
pub fn schedules(placement: &WardPlacement) -> String {
    format!("{}/schedules", ward_root(placement))
}

#[must_use]
pub fn supervisors(placement: &WardPlacement) -> String {
    format!("{}/supervisors", ward_root(placement))
}

#[must_use]
pub fn trucks(placement: &WardPlacement, supervisor_id: &str) -> String {
    format!("{}/{supervisor_id}/trucks", supervisors(placement))
}

#[must_use]
pub fn tickets(placement: &WardPlacement) -> String {
    format!("{}/tickets", ward_root(placement))
}
