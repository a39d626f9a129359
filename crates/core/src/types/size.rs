//! Size labels and the groups they belong to.

use serde::Serialize;

/// A named family of size labels, e.g. women's letter sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeGroup {
    pub name: &'static str,
    pub sizes: &'static [&'static str],
}

/// Every size the shop sells, grouped for the product forms.
pub const SIZE_GROUPS: [SizeGroup; 3] = [
    SizeGroup {
        name: "Femme",
        sizes: &["XS", "S", "M", "L", "XL", "XXL"],
    },
    SizeGroup {
        name: "Enfants",
        sizes: &["2ans", "4ans", "6ans", "8ans", "10ans", "12ans"],
    },
    SizeGroup {
        name: "Accessoires",
        sizes: &["Standard"],
    },
];

/// The group a size label belongs to, if any.
#[must_use]
pub fn group_of(size: &str) -> Option<&'static str> {
    SIZE_GROUPS
        .iter()
        .find(|group| group.sizes.contains(&size))
        .map(|group| group.name)
}

/// `(value, group)` pairs for seeding the size table.
pub fn all_sizes() -> impl Iterator<Item = (&'static str, &'static str)> {
    SIZE_GROUPS
        .iter()
        .flat_map(|group| group.sizes.iter().map(move |size| (*size, group.name)))
}
