pub mod ajuntament;
pub mod diari;

pub use ajuntament::AjuntamentVilaSecaScraper;
pub use diari::DiariDeTarragonaScraper;

/// Spellings of the municipality accepted in listing titles, lower case.
pub const MUNICIPALITY_SPELLINGS: &[&str] = &["vila-seca", "vilaseca"];

/// True when `title` names the municipality in any accepted spelling,
/// ignoring case.
pub fn mentions_municipality(title: &str) -> bool {
    let title = title.to_lowercase();
    MUNICIPALITY_SPELLINGS
        .iter()
        .any(|spelling| title.contains(spelling))
}
