use super::{
    settings::{CEILING_NORMAL_MAX_Y, FLOOR_NORMAL_MIN_Y},
    types::{Penetration, Vec3},
};

/// Coarse classification of a collision contact by the direction of its normal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactKind {
    /// The correction pushes upward: the capsule is standing on something.
    Floor,
    /// Mostly horizontal correction.
    Wall,
    /// The correction pushes downward.
    Ceiling,
}

/// Classify a contact normal (pointing out of the geometry).
#[inline]
pub fn classify_normal(normal: &Vec3) -> ContactKind {
    if normal.y > FLOOR_NORMAL_MIN_Y {
        ContactKind::Floor
    } else if normal.y <= CEILING_NORMAL_MAX_Y {
        ContactKind::Ceiling
    } else {
        ContactKind::Wall
    }
}

/// True when the penetration should count as standing on a floor for damping.
#[inline]
pub fn is_floor_contact(pen: &Penetration) -> bool {
    classify_normal(&pen.normal) == ContactKind::Floor
}
