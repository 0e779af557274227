use std::future::Future;

use unidecode::unidecode;
use uuid::Uuid;

/// Maximum length of a generated slug before any collision suffix.
const MAX_SLUG_LEN: usize = 100;

/// Derives a URL-safe identifier from a display name: transliterates
/// diacritics to ASCII, lowercases, collapses every run of
/// non-alphanumeric characters into a single hyphen, trims hyphens at
/// both ends, and truncates to 100 characters.
pub fn slugify(name: &str) -> String {
    let ascii = unidecode(name);
    let mut slug = String::with_capacity(ascii.len());

    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }

    // A name with no alphanumeric content still needs a usable slug.
    if slug.is_empty() {
        let random = Uuid::new_v4().simple().to_string();
        slug = random[..8].to_string();
    }

    slug
}

/// Resolves a collision-free slug for `name`. While `exists` reports the
/// candidate as taken, appends `-1`, `-2`, ... and re-checks. The loop is
/// unbounded; in practice collision counts stay tiny. The predicate is
/// typically a uniqueness query against the events table, excluding the
/// event's own id on update.
pub async fn unique_slug<F, Fut, E>(name: &str, mut exists: F) -> Result<String, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let base = slugify(name);
    let mut candidate = base.clone();
    let mut n = 1u64;

    while exists(candidate.clone()).await? {
        candidate = format!("{}-{}", base, n);
        n += 1;
    }

    Ok(candidate)
}
