//! Outbound links for sites, states and domains.

use std::str::FromStr;

const EXPLORE_DATA_PRODUCTS: &str = "https://data.neonscience.org/data-products/explore";
const FIELD_SITES: &str = "https://www.neonscience.org/field-sites";
const DOMAINS: &str = "https://www.neonscience.org/domains";

/// Href returned when a link cannot be built.
pub const FALLBACK_HREF: &str = "#";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKey {
    ExploreDataProductsBySite,
    ExploreDataProductsByState,
    ExploreDataProductsByDomain,
    SiteDetails,
    DomainDetails,
}

impl LinkKey {
    pub const ALL: [LinkKey; 5] = [
        LinkKey::ExploreDataProductsBySite,
        LinkKey::ExploreDataProductsByState,
        LinkKey::ExploreDataProductsByDomain,
        LinkKey::SiteDetails,
        LinkKey::DomainDetails,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKey::ExploreDataProductsBySite => "EXPLORE_DATA_PRODUCTS_BY_SITE",
            LinkKey::ExploreDataProductsByState => "EXPLORE_DATA_PRODUCTS_BY_STATE",
            LinkKey::ExploreDataProductsByDomain => "EXPLORE_DATA_PRODUCTS_BY_DOMAIN",
            LinkKey::SiteDetails => "SITE_DETAILS",
            LinkKey::DomainDetails => "DOMAIN_DETAILS",
        }
    }

    pub fn href(&self, arg: &str) -> String {
        if arg.is_empty() {
            return FALLBACK_HREF.to_string();
        }
        match self {
            LinkKey::ExploreDataProductsBySite => format!("{EXPLORE_DATA_PRODUCTS}?site={arg}"),
            LinkKey::ExploreDataProductsByState => format!("{EXPLORE_DATA_PRODUCTS}?state={arg}"),
            LinkKey::ExploreDataProductsByDomain => {
                format!("{EXPLORE_DATA_PRODUCTS}?domain={arg}")
            }
            LinkKey::SiteDetails => format!("{FIELD_SITES}/{arg}"),
            LinkKey::DomainDetails => format!("{DOMAINS}/{arg}"),
        }
    }
}

impl std::fmt::Display for LinkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown link key: {s}"))
    }
}

/// Builds the href for a raw key; unknown keys and missing args give `"#"`.
pub fn href(key: Option<&str>, arg: Option<&str>) -> String {
    match (key.and_then(|k| k.parse::<LinkKey>().ok()), arg) {
        (Some(key), Some(arg)) => key.href(arg),
        _ => FALLBACK_HREF.to_string(),
    }
}
