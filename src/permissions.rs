use serde::Serialize;

/// A named capability checked by the host's authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permission {
    pub codename: &'static str,
    pub name: &'static str,
}

/// Allows marking a book copy as returned. Not enforced by this crate.
pub const CAN_MARK_RETURNED: Permission = Permission {
    codename: "can_mark_returned",
    name: "Set book as returned",
};
