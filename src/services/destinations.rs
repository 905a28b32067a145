use std::collections::BTreeSet;

pub struct Destination {
    pub city: &'static str,
    pub aliases: &'static [&'static str],
    pub airports: &'static [&'static str],
}

pub const DESTINATIONS: &[Destination] = &[
    Destination {
        city: "New York",
        aliases: &["new york", "nyc", "ny", "new york city", "manhattan"],
        airports: &["JFK", "EWR", "LGA"],
    },
    Destination {
        city: "Los Angeles",
        aliases: &["los angeles", "la", "lax area"],
        airports: &["LAX", "BUR", "LGB"],
    },
    Destination {
        city: "San Francisco",
        aliases: &["san francisco", "sf", "san fran", "bay area"],
        airports: &["SFO", "OAK", "SJC"],
    },
    Destination {
        city: "Chicago",
        aliases: &["chicago", "chi", "chi-town"],
        airports: &["ORD", "MDW"],
    },
    Destination {
        city: "Washington",
        aliases: &["washington", "washington dc", "dc", "d c"],
        airports: &["IAD", "DCA", "BWI"],
    },
    Destination {
        city: "Boston",
        aliases: &["boston"],
        airports: &["BOS"],
    },
    Destination {
        city: "Miami",
        aliases: &["miami", "south florida"],
        airports: &["MIA", "FLL"],
    },
    Destination {
        city: "Orlando",
        aliases: &["orlando", "disney world"],
        airports: &["MCO"],
    },
    Destination {
        city: "Dallas",
        aliases: &["dallas", "dfw", "dallas fort worth"],
        airports: &["DFW", "DAL"],
    },
    Destination {
        city: "Houston",
        aliases: &["houston"],
        airports: &["IAH", "HOU"],
    },
    Destination {
        city: "Atlanta",
        aliases: &["atlanta", "atl"],
        airports: &["ATL"],
    },
    Destination {
        city: "Seattle",
        aliases: &["seattle"],
        airports: &["SEA"],
    },
    Destination {
        city: "San Diego",
        aliases: &["san diego"],
        airports: &["SAN"],
    },
    Destination {
        city: "Las Vegas",
        aliases: &["las vegas", "vegas"],
        airports: &["LAS"],
    },
    Destination {
        city: "Denver",
        aliases: &["denver"],
        airports: &["DEN"],
    },
    Destination {
        city: "London",
        aliases: &["london"],
        airports: &["LHR", "LGW", "STN", "LCY"],
    },
    Destination {
        city: "Paris",
        aliases: &["paris"],
        airports: &["CDG", "ORY"],
    },
    Destination {
        city: "Tokyo",
        aliases: &["tokyo"],
        airports: &["HND", "NRT"],
    },
];

fn normalize(place: &str) -> String {
    place
        .to_lowercase()
        .replace(['.', ','], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Candidate airport codes for a free-text place. Unknown places are taken to
/// be an airport code already and come back uppercased as the only candidate.
pub fn resolve(place: &str) -> BTreeSet<String> {
    let key = normalize(place);
    if key.is_empty() {
        return BTreeSet::new();
    }

    if let Some(dest) = DESTINATIONS.iter().find(|d| d.aliases.contains(&key.as_str())) {
        return dest.airports.iter().map(|code| code.to_string()).collect();
    }

    BTreeSet::from([key.to_uppercase()])
}

/// Cities we can suggest flights to, for "nothing found" replies.
pub fn served_cities() -> Vec<&'static str> {
    DESTINATIONS.iter().map(|d| d.city).collect()
}
