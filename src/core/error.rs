//! Error types for the rahyab library
//!
//! Covers the three failure families the HTTP surface reports: not-found,
//! bad-request, and provider failures (timeout or otherwise).

use std::fmt;

/// Suggest a correction for a potentially misspelled city name using fuzzy matching
///
/// Returns the closest candidate within a small edit-distance budget, or `None`
/// when the name is already an exact match or nothing is plausibly close.
pub fn suggest_correction<'a, I>(name: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let name_lower = name.to_lowercase();

    // Maximum distance we consider a reasonable typo (about a third of the
    // word length, minimum 1, maximum 3)
    let max_distance = (name.len() / 3).clamp(1, 3);

    let mut best_match = None;
    let mut best_distance = usize::MAX;

    for candidate in candidates {
        let distance = strsim::levenshtein(&name_lower, &candidate.to_lowercase());

        // Exact match (ignoring case) needs no suggestion
        if distance == 0 {
            return None;
        }

        if distance <= max_distance && distance < best_distance {
            best_distance = distance;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}

/// Main error type for rahyab operations
#[derive(Debug)]
pub enum Error {
    /// City name not present in the dataset (and not resolvable by geocoding)
    CityNotFound {
        name: String,
        suggestion: Option<String>,
    },

    /// The routing provider returned no routes between the two points
    RouteNotFound,

    /// Missing or empty required fields on a mutation
    BadRequest(String),

    /// An outbound call to the routing or geocoding provider exceeded its deadline
    Timeout(String),

    /// The routing or geocoding provider was unreachable or returned garbage
    Provider(String),

    /// The city CSV file could not be parsed
    Dataset(String),

    /// File I/O error
    IoError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CityNotFound { name, suggestion } => match suggestion {
                Some(s) => write!(f, "City '{}' not found. Did you mean '{}'?", name, s),
                None => write!(f, "City '{}' not found", name),
            },
            Error::RouteNotFound => {
                write!(f, "Route not found")
            }
            Error::BadRequest(msg) => {
                write!(f, "Bad request: {}", msg)
            }
            Error::Timeout(msg) => {
                write!(f, "Request timed out: {}", msg)
            }
            Error::Provider(msg) => {
                write!(f, "Provider error: {}", msg)
            }
            Error::Dataset(msg) => {
                write!(f, "Dataset error: {}", msg)
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Dataset(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else {
            Error::Provider(err.to_string())
        }
    }
}

/// Convenience result type for rahyab operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    const CITIES: &[&str] = &["Tehran", "Shiraz", "Isfahan", "Tabriz", "Mashhad", "Qom"];

    #[test]
    fn test_suggest_correction_fuzzy_matching() {
        assert_eq!(
            suggest_correction("Tehrn", CITIES.iter().copied()),
            Some("Tehran".to_string())
        );
        assert_eq!(
            suggest_correction("Shirz", CITIES.iter().copied()),
            Some("Shiraz".to_string())
        );
        assert_eq!(
            suggest_correction("Isfahn", CITIES.iter().copied()),
            Some("Isfahan".to_string())
        );
    }

    #[test]
    fn test_suggest_correction_case_insensitive() {
        assert_eq!(
            suggest_correction("TEHRN", CITIES.iter().copied()),
            Some("Tehran".to_string())
        );
        // Correct spelling, just wrong case: no suggestion needed
        assert_eq!(suggest_correction("tehran", CITIES.iter().copied()), None);
    }

    #[test]
    fn test_suggest_correction_no_match() {
        assert_eq!(
            suggest_correction("totally-unknown-place", CITIES.iter().copied()),
            None
        );
        assert_eq!(suggest_correction("Tehran", CITIES.iter().copied()), None);
    }

    #[test]
    fn test_error_display_carries_suggestion() {
        let err = Error::CityNotFound {
            name: "Tehrn".to_string(),
            suggestion: Some("Tehran".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "City 'Tehrn' not found. Did you mean 'Tehran'?"
        );

        let err = Error::CityNotFound {
            name: "Atlantis".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "City 'Atlantis' not found");
    }
}
