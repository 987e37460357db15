/// Listing sites the prediction backend knows how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    IqCars,
    Dubizzle,
    Syarah,
    OpenSooq,
    Olx,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::IqCars,
        Platform::Dubizzle,
        Platform::Syarah,
        Platform::OpenSooq,
        Platform::Olx,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Platform::IqCars => "IQCars",
            Platform::Dubizzle => "Dubizzle",
            Platform::Syarah => "Syarah",
            Platform::OpenSooq => "OpenSooq",
            Platform::Olx => "OLX",
        }
    }

    pub fn example_url(self) -> &'static str {
        match self {
            Platform::IqCars => "https://www.iqcars.net/en/car/...",
            Platform::Dubizzle => "https://www.dubizzle.com/cars/...",
            Platform::Syarah => "https://www.syarah.com/car/...",
            Platform::OpenSooq => "https://jo.opensooq.com/cars/...",
            Platform::Olx => "https://www.olx.com/cars/...",
        }
    }
}

/// Case-insensitive substring match, first hit wins.
pub fn detect_platform(url: &str) -> Option<Platform> {
    let lower = url.to_ascii_lowercase();
    const NEEDLES: &[(&str, Platform)] = &[
        ("iqcars", Platform::IqCars),
        ("dubizzle", Platform::Dubizzle),
        ("syarah", Platform::Syarah),
        ("opensooq", Platform::OpenSooq),
        ("olx.", Platform::Olx),
    ];
    NEEDLES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, platform)| *platform)
}
