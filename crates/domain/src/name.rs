use derive_more::{AsRef, Display};

pub const MAX_NAME_LEN: usize = 128;

#[derive(
    AsRef,
    Debug,
    Display,
    Clone,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Creates a name with surrounding whitespace removed and inner whitespace runs collapsed.
    pub fn new(name: &str) -> Result<Self, NameError> {
        let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");

        if collapsed.is_empty() {
            return Err(NameError::Empty);
        }

        let len = collapsed.chars().count();

        if len > MAX_NAME_LEN {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(collapsed))
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Name::new(&value)
    }
}

impl From<Name> for String {
    fn from(value: Name) -> Self {
        value.0
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 128 characters or fewer ({0} > 128)")]
    TooLong(usize),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Bench Press", Ok(Name("Bench Press".to_string())))]
    #[case("  Barbell   Row  ", Ok(Name("Barbell Row".to_string())))]
    #[case("", Err(NameError::Empty))]
    #[case(" \t ", Err(NameError::Empty))]
    #[case(&"A".repeat(129), Err(NameError::TooLong(129)))]
    fn test_name_new(#[case] name: &str, #[case] expected: Result<Name, NameError>) {
        assert_eq!(Name::new(name), expected);
    }

    #[test]
    fn test_name_serde() {
        let name = Name::new("Front Squat").unwrap();
        let json = serde_json::to_string(&name).unwrap();

        assert_eq!(json, "\"Front Squat\"");
        assert_eq!(serde_json::from_str::<Name>(&json).unwrap(), name);
        assert!(serde_json::from_str::<Name>("\"  \"").is_err());
    }
}
