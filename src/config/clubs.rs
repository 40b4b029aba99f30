/// Clubs a referee can declare a conflict of interest with.
///
/// The registration flow shows the list in two groups (the first
/// `GROUP_SIZE` clubs, then the rest) and lets a referee pick up to
/// `MAX_PICKS_PER_GROUP` from each.
#[derive(Debug, Clone)]
pub struct ClubRoster {
    clubs: Vec<&'static str>,
}

pub const GROUP_SIZE: usize = 20;
pub const MAX_PICKS_PER_GROUP: usize = 5;

impl ClubRoster {
    pub fn new(clubs: Vec<&'static str>) -> Self {
        Self { clubs }
    }

    /// Group index (0 or 1) of a club, `None` when it is not a league club
    pub fn group_of(&self, name: &str) -> Option<usize> {
        self.clubs
            .iter()
            .position(|c| *c == name)
            .map(|idx| if idx < GROUP_SIZE { 0 } else { 1 })
    }

    pub fn all(&self) -> &[&'static str] {
        &self.clubs
    }
}

impl Default for ClubRoster {
    fn default() -> Self {
        Self::new(get_clubs())
    }
}

/// Get the league's club list
pub fn get_clubs() -> Vec<&'static str> {
    vec![
        "Rentford FC", "Silverthorn", "Amsterdam FC", "Billericay FC", "Spen Valley",
        "Copenhagen FC", "Darvel FC", "Southend United", "Croydon FC", "Manchester FC",
        "Luqmania FC", "Seattle FC", "Sheffield United", "Birmingham FC", "Highfield FC",
        "Rangers FC", "Everton FC", "AFC Milan", "Oakford FC", "Tallaght Rovers",
        "IFK Goteborg", "AS Roma", "Juventus", "Brondby IF", "Crusaders FC",
        "Richmond FC", "Elgin City FC", "Seelo United FC", "Celtic FC", "AFC Wimbledon",
        "Torquay United", "Crystal Palace", "Wolverhampton", "Platinis Viikos", "Hashtag City",
        "RZD Zelitex", "Wesham County", "Husavik Huskies", "Leipzig FC", "KR Moscow",
    ]
}
