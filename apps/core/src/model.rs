pub const NAME_WEIGHT: u32 = 1000;
pub const KEYWORD_WEIGHT: u32 = 1;
pub const DESCRIPTION_WEIGHT: u32 = 1;

/// Separator used by the descriptor `Keywords=` field.
pub const KEYWORD_FIELD_SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub text: String,
    pub weight: u32,
}

impl Keyword {
    pub fn new(text: &str, weight: u32) -> Self {
        Self {
            text: text.to_lowercase(),
            weight,
        }
    }
}

/// Descriptor fields as handed over by the parsing collaborator. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawApplication {
    pub id: String,
    pub name: String,
    pub generic_name: String,
    pub comment: String,
    pub launch_command: String,
    pub raw_keywords: String,
}

impl RawApplication {
    pub fn new(id: &str, name: &str, comment: &str, launch_command: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            comment: comment.to_string(),
            launch_command: launch_command.to_string(),
            ..Default::default()
        }
    }

    pub fn with_generic_name(mut self, generic_name: &str) -> Self {
        self.generic_name = generic_name.to_string();
        self
    }

    pub fn with_keywords(mut self, raw_keywords: &str) -> Self {
        self.raw_keywords = raw_keywords.to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: String,
    pub name: String,
    pub generic_name: String,
    pub comment: String,
    pub launch_command: String,
    keywords: Vec<Keyword>,
}

impl Application {
    pub fn from_raw(raw: RawApplication) -> Self {
        let keywords = index_keywords(&raw);
        Self {
            id: raw.id,
            name: raw.name,
            generic_name: raw.generic_name,
            comment: raw.comment,
            launch_command: raw.launch_command,
            keywords,
        }
    }

    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }
}

/// Builds the ordered keyword sequence for one application.
///
/// Name tokens come first so they are tested first when scoring, followed by the explicit
/// keyword field and finally the generic name and comment. Tokens are not deduplicated.
pub fn index_keywords(raw: &RawApplication) -> Vec<Keyword> {
    let mut keywords = Vec::new();

    keywords.extend(
        raw.name
            .split_whitespace()
            .map(|token| Keyword::new(token, NAME_WEIGHT)),
    );

    keywords.extend(
        raw.raw_keywords
            .split(KEYWORD_FIELD_SEPARATOR)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Keyword::new(token, KEYWORD_WEIGHT)),
    );

    let description = format!("{} {}", raw.generic_name, raw.comment);
    keywords.extend(
        description
            .split_whitespace()
            .map(|token| Keyword::new(token, DESCRIPTION_WEIGHT)),
    );

    keywords
}
