use crate::core::errors::{Error, Result};

/*-------------------------------------------------------------------------------------------------
  Compound Names
-------------------------------------------------------------------------------------------------*/

/// Delimiter for Azure's two-level keys (`cloud/region`, `platform/service`).
pub const AZURE_DELIMITER: char = '/';

/// Delimiter for Oracle's tag lists; tags are peers, so a non-path character is used.
pub const ORACLE_TAG_DELIMITER: char = '|';

/// Join the non-empty `parts` with `delimiter`.
///
/// A single non-empty part is returned unchanged, so a lone identifier never picks up a leading
/// or trailing delimiter.
///
/// ```
/// use cloudipranges::compound_name::join;
///
/// assert_eq!(join('/', ["Public", "eastus"]), "Public/eastus");
/// assert_eq!(join('/', ["Public", ""]), "Public");
/// assert_eq!(join('/', ["", ""]), "");
/// ```
pub fn join<I, S>(delimiter: char, parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<S> = parts
        .into_iter()
        .filter(|part| !part.as_ref().is_empty())
        .collect();

    match parts.as_slice() {
        [] => String::new(),
        [single] => single.as_ref().to_string(),
        _ => parts
            .iter()
            .map(|part| part.as_ref())
            .collect::<Vec<&str>>()
            .join(delimiter.to_string().as_str()),
    }
}

/// Split a compound name at every `delimiter`; the literal inverse of [join] (no filtering).
pub fn split(delimiter: char, compound: &str) -> Vec<String> {
    compound.split(delimiter).map(str::to_string).collect()
}

/// Decompose a two-level compound name into its outer and inner components.
///
/// A name without a delimiter has an empty inner component. More than two components means
/// the name was not produced by [join] with two parts and is rejected.
pub fn split_pair(delimiter: char, compound: &str) -> Result<(String, String)> {
    let mut components = split(delimiter, compound).into_iter();
    match (components.next(), components.next(), components.next()) {
        (Some(outer), None, None) => Ok((outer, String::new())),
        (Some(outer), Some(inner), None) => Ok((outer, inner)),
        _ => Err(Error::InvalidCompoundName {
            name: compound.to_string(),
            delimiter,
        }),
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
