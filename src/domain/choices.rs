//! Closed sets of values stored as text columns.
//!
//! Each enum round-trips through the exact string persisted in the database
//! and exchanged over the API, and carries a human readable label for forms.

use std::fmt;

/// Returned when a stored or submitted string is not a known choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid {}", self.value, self.kind)
    }
}

impl std::error::Error for UnknownChoice {}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $value:literal, $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(UnknownChoice {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

choice_enum! {
    /// User roles. New accounts default to `Author`.
    Role, "role" {
        Admin => "admin", "Admin",
        Moderator => "moderator", "Moderator",
        Author => "author", "Author",
        Reader => "reader", "Reader",
    }
}

choice_enum! {
    /// Catalog workflow status of a book.
    BookStatus, "book status" {
        Draft => "draft", "Draft",
        Moderation => "moderation", "Moderation",
        Live => "live", "Live",
        Rejected => "rejected", "Rejected",
        Canceled => "canceled", "Canceled",
    }
}

choice_enum! {
    /// How readers are expected to obtain the book.
    ReadingType, "reading type" {
        Standard => "standard", "Standard",
        KindleUnlimited => "kindle_unlimited", "Kindle Unlimited",
        VerifiedEbook => "verified_ebook", "Verified Purchase (eBook)",
        VerifiedPrint => "verified_print", "Verified Print Copy",
    }
}

choice_enum! {
    Language, "language" {
        English => "English", "English",
        Deutsch => "Deutsch", "Deutsch",
        French => "French", "French",
        Italian => "Italian", "Italian",
        Spanish => "Spanish", "Spanish",
        Portuguese => "Portuguese", "Portuguese",
        Russian => "Russian", "Russian",
        Ukrainian => "Ukrainian", "Ukrainian",
        Polish => "Polish", "Polish",
        Other => "Other", "Other",
    }
}

choice_enum! {
    /// Amazon marketplace where reviews should be posted.
    Marketplace, "marketplace" {
        Canada => "CA", "Amazon Canada",
        France => "FR", "France",
        Germany => "DE", "Germany",
        UnitedStates => "US", "USA",
        UnitedKingdom => "GB", "UK",
        Spain => "ES", "Spain",
        Italy => "IT", "Italy",
        Netherlands => "NL", "Netherlands",
        Japan => "JP", "Japan",
        Mexico => "MX", "Mexico",
        Brazil => "BR", "Brazil",
        Indonesia => "ID", "Indonesia",
        Poland => "PL", "Poland",
        Australia => "AU", "Australia",
    }
}

choice_enum! {
    Genre, "genre" {
        ColoringBooks => "coloring_books", "Coloring Books | Low Content",
        Journals => "journals", "Journals | Low Content",
        Planners => "planners", "Planners | Low Content",
        RecipeBooks => "recipe_books", "Recipe Books | Low Content",
        QuoteBooks => "quote_books", "Quote Books | Low Content",
        ActivityBooks => "activity_books", "Activity Books | Low Content",
        TriviaBooks => "trivia_books", "Trivia Books | Low Content",
        Sudoku => "sudoku", "Sudoku | Low Content",
        Crosswords => "crosswords", "Crosswords | Low Content",
        WordSearch => "word_search", "Word Search | Low Content",
        ChildrensBook => "childrens_book", "Children's Book | Low Content",
        OtherLowContent => "other_low_content", "Other Low Content / No Content",
        ReligionAndSpirituality => "religion_and_spirituality", "Religion and Spirituality | Non-fiction",
        HealthFitnessDieting => "health_fitness_dieting", "Health, Fitness and Dieting | Non-fiction",
        PoliticsSocialSciences => "politics_social_sciences", "Politics and Social Sciences | Non-fiction",
        CookBooksFoodWine => "cook_books_food_wine", "Cook Books, Food and Wine | Non-fiction",
        BusinessMoney => "business_money", "Business and Money | Non-fiction",
        ParentingRelationship => "parenting_relationship", "Parenting and Relationship | Non-fiction",
        SelfHelp => "self_help", "Self Help | Non-fiction",
        BiographyMemories => "biography_memories", "Biography and Memories | Non-fiction",
        EducationTeaching => "education_teaching", "Education and Teaching | Non-fiction",
        CraftsHobbiesHome => "crafts_hobbies_home", "Crafts, Hobbies and Home | Non-fiction",
        OtherNonFiction => "other_non_fiction", "Other Non-fiction",
        Fiction => "fiction", "Fiction",
        Romance => "romance", "Romance | Fiction",
        SciFi => "sci-fi", "Sci-Fi | Fiction",
        NonEnglish => "non_english", "Non-English",
    }
}

choice_enum! {
    /// Lifecycle of a reader's commitment to review a book.
    AssignmentStatus, "assignment status" {
        Assigned => "assigned", "Assigned",
        Reading => "reading", "Reading",
        ReviewSubmitted => "review_submitted", "Review Submitted",
        Completed => "completed", "Completed",
        Cancelled => "cancelled", "Cancelled",
        LinkPending => "link_pending", "Link Pending",
    }
}

choice_enum! {
    TransactionType, "transaction type" {
        Earned => "earned", "Earned",
        Spent => "spent", "Spent",
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Author
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl Default for Genre {
    fn default() -> Self {
        Genre::OtherLowContent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_strings_parse_back() {
        for status in AssignmentStatus::ALL {
            assert_eq!(status.as_str().parse::<AssignmentStatus>(), Ok(*status));
        }
        assert_eq!("sci-fi".parse::<Genre>(), Ok(Genre::SciFi));
        assert_eq!("GB".parse::<Marketplace>(), Ok(Marketplace::UnitedKingdom));
    }

    #[test]
    fn unknown_value_names_the_kind() {
        let err = "paperback".parse::<ReadingType>().unwrap_err();
        assert_eq!(err.to_string(), "'paperback' is not a valid reading type");
    }

    #[test]
    fn serde_uses_stored_strings() {
        let json = serde_json::to_string(&ReadingType::KindleUnlimited).unwrap();
        assert_eq!(json, "\"kindle_unlimited\"");
        let back: Marketplace = serde_json::from_str("\"JP\"").unwrap();
        assert_eq!(back, Marketplace::Japan);
        assert!(serde_json::from_str::<Language>("\"Klingon\"").is_err());
    }

    #[test]
    fn genre_table_is_complete() {
        assert_eq!(Genre::ALL.len(), 27);
        assert_eq!(Marketplace::ALL.len(), 14);
        assert_eq!(Genre::default(), Genre::OtherLowContent);
    }
}
