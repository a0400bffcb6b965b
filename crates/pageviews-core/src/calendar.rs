use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// Calendar order, January first.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Month from its 1-based calendar number.
    pub fn from_number(number: u32) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx as usize).copied())
    }

    pub fn number(&self) -> u32 {
        self.index() as u32 + 1
    }

    /// 0-based position in [`Month::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        &self.full_name()[..3]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

impl TryFrom<&str> for Month {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|month| {
                trimmed.eq_ignore_ascii_case(month.full_name())
                    || trimmed.eq_ignore_ascii_case(month.abbreviation())
            })
            .ok_or_else(|| format!("unknown month '{trimmed}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviations_follow_english_calendar() {
        let abbreviations: Vec<&str> = Month::ALL.iter().map(Month::abbreviation).collect();
        assert_eq!(
            abbreviations,
            [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov",
                "Dec"
            ]
        );
    }

    #[test]
    fn month_numbers_round_trip() {
        for month in Month::ALL {
            assert_eq!(Month::from_number(month.number()), Some(month));
        }
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
    }

    #[test]
    fn parses_full_and_abbreviated_names() {
        assert_eq!(Month::try_from("sep"), Ok(Month::September));
        assert_eq!(Month::try_from(" December "), Ok(Month::December));
        assert!(Month::try_from("Smarch").is_err());
    }
}
