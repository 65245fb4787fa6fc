//! Lockfile key and descriptor helpers.
//!
//! A yarn berry lockfile key joins one or more descriptors that resolved to
//! the same package:
//!
//! ```text
//! "lodash@npm:^4.17.15, lodash@npm:^4.17.21"
//! "resolve@patch:resolve@npm%3A^1.20.0#~builtin<compat/resolve>"
//! ```

/// Separator between descriptors of a combined key.
pub const SEPARATOR: &str = ", ";

/// Split a combined key into its descriptors.
pub fn specifiers(key: &str) -> impl Iterator<Item = &str> {
    key.split(SEPARATOR)
}

/// Join sorted descriptors into a combined key.
#[must_use]
pub fn join<S: AsRef<str>>(specifiers: &[S]) -> String {
    let mut sorted: Vec<&str> = specifiers.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    sorted.join(SEPARATOR)
}

/// The package name of a descriptor: everything before the first `@` that is
/// not the leading scope marker.
#[must_use]
pub fn package_name(specifier: &str) -> Option<&str> {
    let at = specifier.get(1..)?.find('@')? + 1;
    Some(&specifier[..at])
}

/// Whether a (combined) key starts with a descriptor of `package`.
#[must_use]
pub fn belongs_to(key: &str, package: &str) -> bool {
    key.strip_prefix(package)
        .is_some_and(|rest| rest.starts_with('@'))
}

/// `name@range`, the form used for `resolutions` keys and suggestions.
#[must_use]
pub fn request_key(package: &str, requested: &str) -> String {
    format!("{package}@{requested}")
}

/// Recover the range expression a descriptor originally asked for.
///
/// Returns `None` for protocols that do not carry a registry range
/// (`workspace:`, `portal:`, `link:`, `file:`, git and tarball URLs...).
/// A `#fragment` is kept so it ends up in the version suffix.
#[must_use]
pub fn requested_range(specifier: &str) -> Option<String> {
    let name = package_name(specifier)?;
    let descriptor = &specifier[name.len() + 1..];
    let (head, fragment) = descriptor.split_at(descriptor.find('#').unwrap_or(descriptor.len()));

    let range = match head.split_once(':') {
        None => head,
        Some(("npm", rest)) => after_alias(rest),
        Some(("patch", rest)) => match rest.rfind("%3A") {
            Some(loc) => &rest[loc + 3..],
            None => after_alias(rest),
        },
        Some(_) => return None,
    };

    Some(format!("{range}{fragment}"))
}

/// The protocol of a descriptor or resolution (`npm`, `patch`, `workspace`...),
/// empty when none is written.
#[must_use]
pub fn protocol(specifier: &str) -> &str {
    let descriptor = package_name(specifier).map_or("", |name| &specifier[name.len() + 1..]);
    descriptor.split_once(':').map_or("", |(protocol, _)| protocol)
}

/// Strip an `alias@` (possibly scoped) in front of a range.
fn after_alias(text: &str) -> &str {
    match text.rfind('@') {
        Some(loc) if loc > 0 => &text[loc + 1..],
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("lodash@npm:^4.17.21"), Some("lodash"));
        assert_eq!(package_name("@babel/core@npm:7.22.0"), Some("@babel/core"));
        assert_eq!(package_name("__metadata"), None);
        assert_eq!(package_name("@scope"), None);
        assert_eq!(package_name(""), None);
    }

    #[test]
    fn test_belongs_to() {
        assert!(belongs_to("lodash@npm:^4.0.0, lodash@npm:^4.1.0", "lodash"));
        assert!(!belongs_to("lodash.merge@npm:^4.6.2", "lodash"));
        assert!(!belongs_to("lodash", "lodash"));
        assert!(belongs_to("@types/node@npm:*", "@types/node"));
    }

    #[test]
    fn test_specifiers_and_join() {
        let key = "ms@npm:2.1.2, ms@npm:^2.1.1";
        let parts: Vec<_> = specifiers(key).collect();
        assert_eq!(parts, vec!["ms@npm:2.1.2", "ms@npm:^2.1.1"]);
        assert_eq!(join(&["ms@npm:^2.1.1", "ms@npm:2.1.2"]), key);
    }

    #[test]
    fn test_protocol() {
        assert_eq!(protocol("resolve@npm:1.22.1"), "npm");
        assert_eq!(
            protocol("resolve@patch:resolve@npm%3A1.22.1#~builtin<compat/resolve>::version=1.22.1&hash=07638b"),
            "patch"
        );
        assert_eq!(protocol("@scope/app@workspace:."), "workspace");
        assert_eq!(protocol("left-pad@^1.3.0"), "");
        assert_eq!(protocol("__metadata"), "");
    }

    #[test]
    fn test_requested_range_npm() {
        assert_eq!(requested_range("lodash@npm:^4.17.21").as_deref(), Some("^4.17.21"));
        assert_eq!(
            requested_range("debug@npm:>= 2.1.2 < 3").as_deref(),
            Some(">= 2.1.2 < 3")
        );
        assert_eq!(
            requested_range("string-width-cjs@npm:string-width@^4.2.0").as_deref(),
            Some("^4.2.0")
        );
        assert_eq!(
            requested_range("@types/react@npm:@types/react@18.0.1").as_deref(),
            Some("18.0.1")
        );
    }

    #[test]
    fn test_requested_range_without_protocol() {
        assert_eq!(requested_range("lodash@^4.0.0").as_deref(), Some("^4.0.0"));
        assert_eq!(requested_range("@scope/pkg@1.x").as_deref(), Some("1.x"));
    }

    #[test]
    fn test_requested_range_patch() {
        assert_eq!(
            requested_range("resolve@patch:resolve@npm%3A^1.20.0#~builtin<compat/resolve>")
                .as_deref(),
            Some("^1.20.0#~builtin<compat/resolve>")
        );
        assert_eq!(
            requested_range("typescript@patch:typescript@^4.5.2#~builtin<compat/typescript>")
                .as_deref(),
            Some("^4.5.2#~builtin<compat/typescript>")
        );
    }

    #[test]
    fn test_requested_range_other_protocols() {
        assert_eq!(requested_range("app@workspace:."), None);
        assert_eq!(requested_range("lib@portal:../lib"), None);
        assert_eq!(requested_range("x@https://example.com/x.tgz"), None);
        assert_eq!(requested_range("__metadata"), None);
    }
}
